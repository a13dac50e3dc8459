use palette_relay::PaletteResponse;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000/api/generate";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed with status {status}{}", format_detail(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid palette response: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the relay's generate endpoint.
#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("palette-swatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the theme and return the relay's body untouched.
    pub async fn fetch_raw(&self, theme: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "theme": theme }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(body)
    }

    pub async fn generate(&self, theme: &str) -> Result<PaletteResponse, ClientError> {
        let body = self.fetch_raw(theme).await?;
        tracing::debug!("Relay returned {} bytes", body.len());
        Ok(PaletteResponse::parse(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PAYLOAD: &str = r##"{"palette":[{"role":"Primary","hex":"#2e4057","name":"Slate"}],"justification":"Calm."}"##;

    fn client(server: &mockito::ServerGuard) -> RelayClient {
        RelayClient::new(format!("{}/api/generate", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_parses_palette() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({"theme": "slate"})))
            .with_status(200)
            .with_body(PAYLOAD)
            .create_async()
            .await;

        let palette = client(&server).generate("slate").await.unwrap();

        mock.assert_async().await;
        assert_eq!(palette.palette[0].name, "Slate");
        assert_eq!(palette.justification, "Calm.");
    }

    #[tokio::test]
    async fn test_non_success_includes_relay_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body(r#"{"error":"The AI did not return a valid JSON object."}"#)
            .create_async()
            .await;

        let error = client(&server).generate("x").await.unwrap_err();
        assert!(matches!(error, ClientError::Status { status: 500, .. }));
        assert_eq!(
            error.to_string(),
            "Request failed with status 500: The AI did not return a valid JSON object."
        );
    }

    #[tokio::test]
    async fn test_non_success_without_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(502)
            .with_body("Bad gateway")
            .create_async()
            .await;

        let error = client(&server).fetch_raw("x").await.unwrap_err();
        assert_eq!(error.to_string(), "Request failed with status 502");
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("{\"palette\": [")
            .create_async()
            .await;

        let error = client(&server).generate("x").await.unwrap_err();
        assert!(matches!(error, ClientError::Parse(_)));
    }
}
