// palette-swatch/src/lib.rs
pub mod client;
pub mod clipboard;
pub mod preferences;
pub mod ui;

// Re-export key types
pub use client::{ClientError, RelayClient, DEFAULT_RELAY_URL};
pub use preferences::{Appearance, PreferenceStore};
