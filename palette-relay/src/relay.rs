use crate::error::RelayError;
use crate::llm::prompt::build_prompt;
use crate::llm::{
    extract_json_object, ExtractStrategy, GenerationConfig, GenerationProvider, UpstreamError,
};
use crate::palette::PaletteResponse;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl RelayResponse {
    pub fn text(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: TEXT_CONTENT_TYPE,
            body,
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: JSON_CONTENT_TYPE,
            body: body.to_string(),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }
}

impl From<&RelayError> for RelayResponse {
    fn from(error: &RelayError) -> Self {
        RelayResponse::error(error.status_code(), &error.client_message())
    }
}

/// Stateless handler: theme in, extracted palette JSON out.
pub struct Relay {
    provider: Arc<dyn GenerationProvider>,
    generation: GenerationConfig,
    strategy: ExtractStrategy,
    validate: bool,
    timeout: Duration,
}

impl Relay {
    pub fn new(provider: Arc<dyn GenerationProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            generation: GenerationConfig::default(),
            strategy: ExtractStrategy::default(),
            validate: false,
            timeout,
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_strategy(mut self, strategy: ExtractStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Parse and check the extracted payload before forwarding it.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Handle a raw `POST /api/generate` body. Every outcome becomes a response.
    pub async fn handle(&self, body: &[u8]) -> RelayResponse {
        let theme = match parse_theme(body) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!("Rejected request: {}", e);
                return RelayResponse::from(&e);
            }
        };

        let outcome = AssertUnwindSafe(self.generate(&theme)).catch_unwind().await;

        match outcome {
            Ok(Ok(json)) => RelayResponse::text(200, json),
            Ok(Err(e)) => {
                match &e {
                    RelayError::NoContentReturned | RelayError::MalformedResponse => {
                        tracing::warn!("Generation for '{}' failed: {}", theme, e)
                    }
                    _ => tracing::error!("Generation for '{}' failed: {:#}", theme, e),
                }
                RelayResponse::from(&e)
            }
            Err(_) => {
                tracing::error!("Generation for '{}' panicked", theme);
                RelayResponse::from(&RelayError::Other(anyhow::anyhow!("handler panicked")))
            }
        }
    }

    /// Ask the upstream model for a palette and return the embedded JSON object.
    pub async fn generate(&self, theme: &str) -> Result<String, RelayError> {
        let prompt = build_prompt(theme);

        let response = tokio::time::timeout(
            self.timeout,
            self.provider.generate_content(&prompt, &self.generation),
        )
        .await
        .map_err(|_| UpstreamError::Timeout(self.timeout.as_secs()))??;

        if response.candidates.is_empty() {
            if let Some(reason) = response.block_reason() {
                tracing::warn!("Prompt blocked upstream: {}", reason);
            }
            return Err(RelayError::NoContentReturned);
        }

        let text = response.first_text().ok_or_else(|| {
            RelayError::UnexpectedShape("candidate has no content.parts[0].text".to_string())
        })?;

        let json = extract_json_object(text, self.strategy).ok_or_else(|| {
            tracing::debug!("No JSON object in model output: {}", text);
            RelayError::MalformedResponse
        })?;

        if self.validate {
            let palette = PaletteResponse::parse(json)
                .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;
            palette.validate()?;
        }

        Ok(json.to_string())
    }
}

fn parse_theme(body: &[u8]) -> Result<String, RelayError> {
    let request: GenerateRequest = serde_json::from_slice(body).map_err(|e| {
        RelayError::BadRequest(format!("Request body must be {{\"theme\": string}}: {}", e))
    })?;

    // Blank themes are the client's concern; the model still gets asked.
    Ok(request.theme)
}
