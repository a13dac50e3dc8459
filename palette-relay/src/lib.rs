// palette-relay/src/lib.rs
pub mod config;
pub mod error;
pub mod llm;
pub mod palette;
pub mod relay;
pub mod server;

// Re-export key types
pub use error::RelayError;
pub use palette::{ColorEntry, PaletteResponse};
pub use relay::{Relay, RelayResponse};
pub use server::RelayServer;
