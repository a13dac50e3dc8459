use super::colors::Chrome;
use super::swatch::Swatch;
use crate::client::RelayClient;
use crate::clipboard::ClipboardSink;
use crate::preferences::{Appearance, PreferenceStore, APPEARANCE_KEY};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use palette_relay::PaletteResponse;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, Receiver, Sender};

pub const WELCOME_MESSAGE: &str = "Describe a theme and press Enter.";
pub const GENERATING_MESSAGE: &str = "Generating your palette... 🎨";
pub const EMPTY_THEME_MESSAGE: &str = "Please enter a theme.";
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy color.";

const KEY_HINTS: &str = "Enter generate · ←/→ select · click or Ctrl+Y copy · Ctrl+T theme · Esc quit";

#[derive(Debug)]
pub enum UIUpdate {
    PaletteGenerated(Result<PaletteResponse, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Error(text) => text,
        }
    }
}

pub struct App {
    input: String,
    status: Status,
    swatches: Vec<Swatch>,
    selected: usize,
    swatch_areas: Vec<Rect>,
    appearance: Appearance,
    preferences: Option<PreferenceStore>,
    clipboard: Box<dyn ClipboardSink>,
    client: RelayClient,
    ui_tx: Sender<UIUpdate>,
    ui_rx: Receiver<UIUpdate>,
    pending: bool,
    should_quit: bool,
}

impl App {
    pub fn new(
        client: RelayClient,
        clipboard: Box<dyn ClipboardSink>,
        preferences: Option<PreferenceStore>,
        system_appearance: Appearance,
    ) -> Self {
        let stored = preferences
            .as_ref()
            .and_then(|store| store.get(APPEARANCE_KEY));
        let appearance = Appearance::resolve(stored, system_appearance);
        let (ui_tx, ui_rx) = mpsc::channel(8);

        Self {
            input: String::new(),
            status: Status::Info(WELCOME_MESSAGE.to_string()),
            swatches: Vec::new(),
            selected: 0,
            swatch_areas: Vec::new(),
            appearance,
            preferences,
            clipboard,
            client,
            ui_tx,
            ui_rx,
            pending: false,
            should_quit: false,
        }
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // Cleanup
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        while !self.should_quit {
            // Handle results from the relay
            while let Ok(update) = self.ui_rx.try_recv() {
                self.apply_update(update);
            }

            let now = Instant::now();
            terminal.draw(|f| self.render(f, now))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key, Instant::now());
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Validate the input and mark a request as in flight.
    ///
    /// Returns the theme to send, or `None` when the input is blank or a request
    /// is already running.
    pub fn submit(&mut self) -> Option<String> {
        if self.pending {
            return None;
        }
        if self.input.trim().is_empty() {
            self.status = Status::Error(EMPTY_THEME_MESSAGE.to_string());
            return None;
        }

        self.pending = true;
        self.status = Status::Info(GENERATING_MESSAGE.to_string());
        self.swatches.clear();
        self.swatch_areas.clear();
        self.selected = 0;
        Some(self.input.clone())
    }

    /// Submit the current input and fetch the palette on a background task.
    pub fn start_generation(&mut self) {
        let Some(theme) = self.submit() else {
            return;
        };

        let client = self.client.clone();
        let ui_tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let result = client.generate(&theme).await.map_err(|e| {
                tracing::error!("Error generating palette: {}", e);
                e.to_string()
            });
            if ui_tx.send(UIUpdate::PaletteGenerated(result)).await.is_err() {
                tracing::debug!("UI closed before palette arrived");
            }
        });
    }

    pub fn apply_update(&mut self, update: UIUpdate) {
        match update {
            UIUpdate::PaletteGenerated(Ok(palette)) => {
                self.pending = false;
                self.status = Status::Info(palette.justification);
                self.swatches = palette.palette.into_iter().map(Swatch::new).collect();
                self.selected = 0;
            }
            UIUpdate::PaletteGenerated(Err(message)) => {
                self.pending = false;
                self.status = Status::Error(format!("Sorry, there was an error. ({})", message));
            }
        }
    }

    /// Copy the hex of swatch `index` and start its confirmation window.
    pub fn copy_swatch(&mut self, index: usize, now: Instant) {
        let Some(swatch) = self.swatches.get_mut(index) else {
            return;
        };
        self.selected = index;

        match self.clipboard.set_text(swatch.hex()) {
            Ok(()) => swatch.mark_copied(now),
            Err(e) => {
                tracing::error!("Error copying text: {:#}", e);
                self.status = Status::Error(COPY_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn toggle_appearance(&mut self) {
        self.appearance = self.appearance.toggled();
        if let Some(store) = self.preferences.as_mut() {
            if let Err(e) = store.set(APPEARANCE_KEY, self.appearance.as_str()) {
                tracing::warn!("Failed to save appearance preference: {:#}", e);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('d'), KeyModifiers::CONTROL)
            | (KeyCode::Esc, _) => {
                self.should_quit = true;
            }
            (KeyCode::Char('t'), KeyModifiers::CONTROL) => self.toggle_appearance(),
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => self.copy_swatch(self.selected, now),
            (KeyCode::Enter, _) => self.start_generation(),
            (KeyCode::Left, _) | (KeyCode::BackTab, _) => {
                self.selected = self.selected.saturating_sub(1);
            }
            (KeyCode::Right, _) | (KeyCode::Tab, _) => {
                if self.selected + 1 < self.swatches.len() {
                    self.selected += 1;
                }
            }
            (KeyCode::Backspace, _) => {
                self.input.pop();
            }
            (KeyCode::Char(c), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(index) = self.swatch_at(mouse.column, mouse.row) {
            self.copy_swatch(index, now);
        }
    }

    fn swatch_at(&self, column: u16, row: u16) -> Option<usize> {
        self.swatch_areas.iter().position(|area| {
            column >= area.x
                && column < area.x + area.width
                && row >= area.y
                && row < area.y + area.height
        })
    }

    pub fn render(&mut self, f: &mut Frame, now: Instant) {
        let chrome = Chrome::for_appearance(self.appearance);
        let area = f.area();

        f.render_widget(
            Block::default().style(Style::default().bg(chrome.background).fg(chrome.foreground)),
            area,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(4),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                " Palette Swatch ",
                Style::default()
                    .fg(chrome.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{} ", self.appearance.icon())),
            Span::raw(KEY_HINTS),
        ]));
        f.render_widget(header, chunks[0]);

        // Input
        let input = Paragraph::new(self.input.as_str())
            .block(Block::default().borders(Borders::ALL).title("Theme"));
        f.render_widget(input, chunks[1]);

        // Status / justification
        let status_style = match self.status {
            Status::Error(_) => Style::default().fg(chrome.error),
            Status::Info(_) => Style::default(),
        };
        let status = Paragraph::new(self.status.text())
            .style(status_style)
            .wrap(Wrap { trim: true });
        f.render_widget(status, chunks[2]);

        // Swatches
        if self.swatches.is_empty() {
            self.swatch_areas.clear();
            return;
        }

        let count = self.swatches.len() as u32;
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, count); self.swatches.len()])
            .split(chunks[3]);

        for (index, (swatch, swatch_area)) in self.swatches.iter().zip(areas.iter()).enumerate() {
            let mut style = Style::default().fg(swatch.foreground());
            if let Some(background) = swatch.background() {
                style = style.bg(background);
            }

            let border_type = if index == self.selected {
                BorderType::Thick
            } else {
                BorderType::Plain
            };

            let body = Paragraph::new(vec![
                Line::from(swatch.label()),
                Line::from(""),
                Line::from(Span::styled(
                    swatch.hex_label(now).to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_type(border_type));

            f.render_widget(body, *swatch_area);
        }

        self.swatch_areas = areas.to_vec();
    }
}
