use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Number of colours the prompt asks the model for.
pub const PALETTE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub name: String,
}

/// Payload the model is asked to emit, shared by the relay and its clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteResponse {
    pub palette: Vec<ColorEntry>,
    #[serde(default)]
    pub justification: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaletteError {
    #[error("palette is empty")]
    Empty,

    #[error("entry {index} has invalid hex colour '{hex}'")]
    InvalidHex { index: usize, hex: String },
}

impl PaletteResponse {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that the palette is non-empty and every entry carries a `#rrggbb` colour.
    ///
    /// A palette whose length differs from [`PALETTE_SIZE`] is accepted; the model
    /// occasionally returns more or fewer swatches and that is only worth a warning.
    pub fn validate(&self) -> Result<(), PaletteError> {
        if self.palette.is_empty() {
            return Err(PaletteError::Empty);
        }

        for (index, entry) in self.palette.iter().enumerate() {
            if !is_hex_color(&entry.hex) {
                return Err(PaletteError::InvalidHex {
                    index,
                    hex: entry.hex.clone(),
                });
            }
        }

        if self.palette.len() != PALETTE_SIZE {
            tracing::warn!(
                "Palette has {} entries, expected {}",
                self.palette.len(),
                PALETTE_SIZE
            );
        }

        Ok(())
    }
}

pub fn is_hex_color(value: &str) -> bool {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex colour regex is valid"))
        .is_match(value)
}
