use super::colors::{contrast_text, parse_hex};
use palette_relay::ColorEntry;
use ratatui::style::Color;
use std::time::{Duration, Instant};

/// How long the hex label shows the copy confirmation.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);
pub const COPIED_LABEL: &str = "Copied! ✅";

/// One rendered palette colour.
#[derive(Debug, Clone)]
pub struct Swatch {
    entry: ColorEntry,
    background: Option<Color>,
    copied_until: Option<Instant>,
}

impl Swatch {
    pub fn new(entry: ColorEntry) -> Self {
        let background = parse_hex(&entry.hex);
        Self {
            entry,
            background,
            copied_until: None,
        }
    }

    pub fn hex(&self) -> &str {
        &self.entry.hex
    }

    /// `name (role)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.entry.name, self.entry.role)
    }

    /// `None` when the model's hex is not a parseable `#rrggbb` colour.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn foreground(&self) -> Color {
        self.background.map(contrast_text).unwrap_or(Color::Reset)
    }

    /// Start (or restart) the copy confirmation window.
    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_until = Some(now + COPY_FEEDBACK);
    }

    pub fn is_showing_copied(&self, now: Instant) -> bool {
        self.copied_until.is_some_and(|until| now < until)
    }

    pub fn hex_label(&self, now: Instant) -> &str {
        if self.is_showing_copied(now) {
            COPIED_LABEL
        } else {
            &self.entry.hex
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swatch(hex: &str) -> Swatch {
        Swatch::new(ColorEntry {
            role: "Accent".to_string(),
            hex: hex.to_string(),
            name: "Sandy Peach".to_string(),
        })
    }

    #[test]
    fn test_label_and_colors() {
        let swatch = swatch("#ffcdab");
        assert_eq!(swatch.label(), "Sandy Peach (Accent)");
        assert_eq!(swatch.background(), Some(Color::Rgb(0xff, 0xcd, 0xab)));
        assert_eq!(swatch.foreground(), Color::Black);
    }

    #[test]
    fn test_unparseable_hex_has_no_background() {
        let swatch = swatch("peach");
        assert_eq!(swatch.background(), None);
        assert_eq!(swatch.foreground(), Color::Reset);
        assert_eq!(swatch.hex_label(Instant::now()), "peach");
    }

    #[test]
    fn test_copy_feedback_reverts_after_window() {
        let start = Instant::now();
        let mut swatch = swatch("#ffcdab");

        assert_eq!(swatch.hex_label(start), "#ffcdab");

        swatch.mark_copied(start);
        assert_eq!(swatch.hex_label(start), COPIED_LABEL);
        assert_eq!(swatch.hex_label(start + Duration::from_millis(1999)), COPIED_LABEL);
        assert_eq!(swatch.hex_label(start + COPY_FEEDBACK), "#ffcdab");
        assert_eq!(swatch.hex_label(start + Duration::from_secs(60)), "#ffcdab");
    }

    #[test]
    fn test_second_copy_extends_window_and_settles_on_hex() {
        let start = Instant::now();
        let mut swatch = swatch("#ffcdab");

        swatch.mark_copied(start);
        swatch.mark_copied(start + Duration::from_millis(500));

        assert_eq!(swatch.hex_label(start + Duration::from_millis(2100)), COPIED_LABEL);
        assert_eq!(swatch.hex_label(start + Duration::from_millis(2500)), "#ffcdab");
    }
}
