//! Non-interactive output: the justification followed by one line per colour.

use super::colors::parse_hex;
use crossterm::{
    queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor},
};
use palette_relay::PaletteResponse;
use ratatui::style::Color;
use std::io::{self, Write};

const BLOCK: &str = "        ";

pub fn write_palette<W: Write>(out: &mut W, palette: &PaletteResponse, color: bool) -> io::Result<()> {
    writeln!(out, "{}", palette.justification)?;
    writeln!(out)?;

    for entry in &palette.palette {
        match parse_hex(&entry.hex) {
            Some(Color::Rgb(r, g, b)) if color => {
                queue!(
                    out,
                    SetBackgroundColor(TermColor::Rgb { r, g, b }),
                    Print(BLOCK),
                    ResetColor
                )?;
            }
            _ => write!(out, "{BLOCK}")?,
        }
        writeln!(out, " {}  {} ({})", entry.hex, entry.name, entry.role)?;
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette_relay::ColorEntry;

    fn palette() -> PaletteResponse {
        PaletteResponse {
            palette: vec![
                ColorEntry {
                    role: "Primary".to_string(),
                    hex: "#ff8800".to_string(),
                    name: "Ember".to_string(),
                },
                ColorEntry {
                    role: "Accent".to_string(),
                    hex: "ember".to_string(),
                    name: "Broken".to_string(),
                },
            ],
            justification: "Warm.".to_string(),
        }
    }

    #[test]
    fn test_plain_output_without_color() {
        let mut out = Vec::new();
        write_palette(&mut out, &palette(), false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!(
                "Warm.\n\n{BLOCK} #ff8800  Ember (Primary)\n{BLOCK} ember  Broken (Accent)\n"
            )
        );
    }

    #[test]
    fn test_truecolor_block_only_for_valid_hex() {
        let mut out = Vec::new();
        write_palette(&mut out, &palette(), true).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[48;2;255;136;0m").count(), 1);
        assert!(text.contains("ember  Broken (Accent)"));
    }
}
