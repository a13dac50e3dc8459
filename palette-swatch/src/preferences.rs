use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Key under which the light/dark choice is stored.
pub const APPEARANCE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Appearance::Light => Appearance::Dark,
            Appearance::Dark => Appearance::Light,
        }
    }

    /// Toggle button face: a sun to switch back to light, a moon to go dark.
    pub fn icon(&self) -> &'static str {
        match self {
            Appearance::Dark => "☀️",
            Appearance::Light => "🌙",
        }
    }

    /// Best guess at the terminal's own scheme.
    ///
    /// Reads `COLORFGBG` ("fg;bg", set by rxvt, Konsole and friends); background
    /// indices 0-6 and 8 are dark. Without the hint a dark terminal is assumed.
    pub fn detect_system() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or(Appearance::Dark)
    }

    fn from_colorfgbg(value: &str) -> Option<Self> {
        let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(match background {
            0..=6 | 8 => Appearance::Dark,
            _ => Appearance::Light,
        })
    }

    /// Stored "dark" wins; nothing stored defers to the system; anything else is light.
    pub fn resolve(stored: Option<&str>, system: Appearance) -> Self {
        match stored {
            Some("dark") => Appearance::Dark,
            None => system,
            Some(_) => Appearance::Light,
        }
    }
}

/// Tiny persistent string key-value store backed by a JSON file.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences from {:?}", path))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse preferences in {:?}", path))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// `<config_dir>/palette-swatch/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("palette-swatch").join("preferences.json"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set `key` and write the store back to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }

        let json =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize preferences")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences to {:?}", self.path))?;

        tracing::debug!("Preferences saved to {:?}", self.path);
        Ok(())
    }
}
