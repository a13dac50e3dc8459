pub mod extract;
pub mod gemini;
pub mod prompt;
pub mod provider;

pub use extract::{extract_json_object, ExtractStrategy};
pub use gemini::GeminiProvider;
pub use provider::{GenerateContentResponse, GenerationConfig, GenerationProvider, UpstreamError};
