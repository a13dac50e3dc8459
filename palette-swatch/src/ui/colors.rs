//! Colour helpers for the terminal UI
use crate::preferences::Appearance;
use ratatui::style::Color;

/// Parse a `#rrggbb` string into a terminal colour.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb(
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ))
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color) -> Color {
    match background {
        Color::Rgb(r, g, b) => {
            // ITU-R BT.601 luma
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            if luma > 150.0 {
                Color::Black
            } else {
                Color::White
            }
        }
        _ => Color::Reset,
    }
}

/// Window chrome colours for one appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub error: Color,
}

impl Chrome {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self {
                background: Color::Rgb(30, 30, 36),
                foreground: Color::Rgb(230, 230, 250),
                // Light Sky Blue
                accent: Color::Rgb(135, 206, 250),
                // Light Pink
                error: Color::Rgb(255, 182, 193),
            },
            Appearance::Light => Self {
                background: Color::Rgb(250, 250, 247),
                foreground: Color::Rgb(40, 40, 48),
                accent: Color::Rgb(30, 90, 160),
                error: Color::Rgb(170, 30, 50),
            },
        }
    }
}
