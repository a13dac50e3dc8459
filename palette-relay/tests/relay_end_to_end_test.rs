use mockito::{Matcher, Server, ServerGuard};
use palette_relay::llm::GeminiProvider;
use palette_relay::{PaletteResponse, Relay, RelayServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

const GEMINI_PATH: &str = "/models/gemini-1.5-flash:generateContent";

const OCEAN_STORM: &str = r##"{"palette":[{"role":"Primary","hex":"#1b3b5a","name":"Storm Navy"},{"role":"Secondary","hex":"#4f6d7a","name":"Slate Swell"},{"role":"Accent","hex":"#c0d6df","name":"Sea Spray"},{"role":"Neutral","hex":"#eaeaea","name":"Fog"},{"role":"Dark","hex":"#0d1b2a","name":"Abyss"}],"justification":"Deep blues and greys evoke churning water under heavy cloud."}"##;

fn gemini_reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

struct Harness {
    addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl Harness {
    async fn start(upstream: &ServerGuard, timeout: Duration) -> Self {
        let provider = GeminiProvider::new(
            upstream.url(),
            Some("test-key".to_string()),
            "gemini-1.5-flash".to_string(),
            timeout,
        )
        .unwrap();
        let relay = Relay::new(Arc::new(provider), timeout);

        let listener = RelayServer::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(RelayServer::new(relay, 64 * 1024).serve_with_shutdown(listener, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            _shutdown: tx,
        }
    }

    async fn generate(&self, theme: &str) -> (u16, String) {
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/generate", self.addr))
            .json(&json!({ "theme": theme }))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }
}

#[tokio::test]
async fn test_ocean_storm_returns_inner_json_verbatim() {
    let mut upstream = Server::new_async().await;
    let mock = upstream
        .mock("POST", GEMINI_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Regex("The theme is: 'ocean storm'".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_reply(&format!(
            "Here you go:\n<json>\n{OCEAN_STORM}\n</json>"
        )))
        .create_async()
        .await;

    let harness = Harness::start(&upstream, Duration::from_secs(5)).await;
    let (status, body) = harness.generate("ocean storm").await;

    mock.assert_async().await;
    assert_eq!(status, 200);
    assert_eq!(body, OCEAN_STORM);

    let palette = PaletteResponse::parse(&body).unwrap();
    assert_eq!(palette.palette.len(), 5);
    assert!(palette.validate().is_ok());
}

#[tokio::test]
async fn test_empty_candidates_is_500_with_message() {
    let mut upstream = Server::new_async().await;
    let _mock = upstream
        .mock("POST", GEMINI_PATH)
                .with_status(200)
        .with_body(r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#)
        .create_async()
        .await;

    let harness = Harness::start(&upstream, Duration::from_secs(5)).await;
    let (status, body) = harness.generate("forbidden").await;

    assert_eq!(status, 500);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body["error"],
        "The AI model returned no content, possibly due to safety filters."
    );
}

#[tokio::test]
async fn test_prose_answer_is_500_malformed() {
    let mut upstream = Server::new_async().await;
    let _mock = upstream
        .mock("POST", GEMINI_PATH)
                .with_status(200)
        .with_body(gemini_reply("Sorry, I can only describe palettes in words."))
        .create_async()
        .await;

    let harness = Harness::start(&upstream, Duration::from_secs(5)).await;
    let (status, body) = harness.generate("words").await;

    assert_eq!(status, 500);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "The AI did not return a valid JSON object.");
}

#[tokio::test]
async fn test_upstream_http_error_is_generic_500() {
    let mut upstream = Server::new_async().await;
    let _mock = upstream
        .mock("POST", GEMINI_PATH)
                .with_status(400)
        .with_body(r#"{"error":{"code":400,"message":"API key not valid."}}"#)
        .create_async()
        .await;

    let harness = Harness::start(&upstream, Duration::from_secs(5)).await;
    let (status, body) = harness.generate("anything").await;

    assert_eq!(status, 500);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "An unexpected error occurred on the server.");
}

#[tokio::test]
async fn test_unreachable_upstream_is_generic_500() {
    let upstream = Server::new_async().await;
    let harness = Harness::start(&upstream, Duration::from_secs(2)).await;
    // With the mock server gone (or recycled without mocks) nothing answers the call
    drop(upstream);

    let (status, body) = harness.generate("anything").await;

    assert_eq!(status, 500);
    assert!(body.contains("An unexpected error occurred on the server."));
}
