pub mod app;
pub mod colors;
pub mod plain;
pub mod swatch;

pub use app::App;
