use super::provider::{GenerateContentResponse, GenerationConfig, GenerationProvider, UpstreamError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Generative Language `generateContent` client.
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("palette-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request_body(prompt: &str, config: &GenerationConfig) -> Value {
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        if !config.is_empty() {
            let mut generation = json!({});
            if let Some(temperature) = config.temperature {
                generation["temperature"] = json!(temperature);
            }
            if let Some(max_tokens) = config.max_output_tokens {
                generation["maxOutputTokens"] = json!(max_tokens);
            }
            if let Some(mime) = &config.response_mime_type {
                generation["responseMimeType"] = json!(mime);
            }
            body["generationConfig"] = generation;
        }

        body
    }

    /// URLs are stripped so transport errors never carry request details into logs.
    fn classify(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.timeout.as_secs())
        } else {
            UpstreamError::Transport(error.without_url())
        }
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate_content(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerateContentResponse, UpstreamError> {
        let body = Self::build_request_body(prompt, config);

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        tracing::debug!("Calling {} with model {}", self.api_base, self.model);

        let response = req.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
