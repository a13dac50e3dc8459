use anyhow::{Context, Result};

/// Somewhere a copied hex value can be written.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().context("Failed to access clipboard")?,
        };

        let result = clipboard
            .set_text(text.to_string())
            .context("Failed to write to clipboard");
        self.inner = Some(clipboard);
        result
    }
}
