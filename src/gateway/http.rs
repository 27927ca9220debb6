use crate::config::GatewayConfig;
use crate::gateway::{CompletionParams, CompletionProvider, GatewayError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for a local OpenAI-compatible completion server (llamafile, llama.cpp server)
pub struct InferenceGateway {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    probe_timeout: Duration,
    completion_timeout: Duration,
    online: AtomicBool, // Cached result of the last status probe
    checking: AtomicBool, // Single-flight guard around the probe
}

impl InferenceGateway {
    /// Create a new gateway
    /// Default endpoint: http://localhost:8080
    pub fn new(endpoint: Option<&str>, model: Option<&str>) -> Self {
        Self {
            endpoint: endpoint
                .unwrap_or("http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or("gpt-3.5-turbo").to_string(),
            client: reqwest::Client::new(),
            probe_timeout: Duration::from_secs(2),
            completion_timeout: Duration::from_secs(120),
            online: AtomicBool::new(false),
            checking: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(Some(&config.endpoint), Some(&config.model))
            .with_probe_timeout(Duration::from_millis(config.probe_timeout_ms))
            .with_completion_timeout(Duration::from_secs(config.completion_timeout_secs))
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Upper bound for a single completion round trip
    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET `path` and report whether it answered with a success status
    async fn probe(&self, path: &str) -> bool {
        let url = format!("{}{}", self.endpoint, path);
        match self.client.get(&url).timeout(self.probe_timeout).send().await {
            Ok(response) => {
                debug!("Probe {} answered {}", url, response.status());
                response.status().is_success()
            }
            Err(e) => {
                debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Clears the single-flight flag even if the probe future is dropped
struct CheckingGuard<'a>(&'a AtomicBool);

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[async_trait::async_trait]
impl CompletionProvider for InferenceGateway {
    async fn check_status(&self) -> bool {
        // A probe is already running: hand out the last known status
        if self.checking.swap(true, Ordering::AcqRel) {
            return self.online.load(Ordering::Acquire);
        }
        let _guard = CheckingGuard(&self.checking);

        let online = self.probe("/health").await || self.probe("/v1/models").await;
        let was_online = self.online.swap(online, Ordering::AcqRel);
        if online != was_online {
            info!(
                "Inference service at {} is now {}",
                self.endpoint,
                if online { "online" } else { "offline" }
            );
        }
        online
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String, GatewayError> {
        if !self.is_online() {
            return Err(GatewayError::Offline);
        }

        let url = format!("{}/v1/chat/completions", self.endpoint);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.completion_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.completion_timeout)
                } else {
                    GatewayError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion request to {} failed with {}", url, status);
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ResponseMalformed(format!("invalid completion payload: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::ResponseMalformed("completion has no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_body(content: &str) -> serde_json::Value {
        json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
    }

    #[test]
    fn test_gateway_defaults() {
        let gateway = InferenceGateway::new(None, None);
        assert_eq!(gateway.endpoint(), "http://localhost:8080");
        assert_eq!(gateway.model, "gpt-3.5-turbo");
        assert_eq!(gateway.probe_timeout, Duration::from_secs(2));
        assert!(!gateway.is_online());
    }

    #[test]
    fn test_gateway_trims_trailing_slash() {
        let gateway = InferenceGateway::new(Some("http://127.0.0.1:9000/"), Some("local"));
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_check_status_health_ok() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        assert!(gateway.check_status().await);
        assert!(gateway.is_online());
    }

    #[tokio::test]
    async fn test_check_status_falls_back_to_models() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        assert!(gateway.check_status().await);
    }

    #[tokio::test]
    async fn test_check_status_offline() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        assert!(!gateway.check_status().await);
        assert!(!gateway.is_online());
    }

    #[tokio::test]
    async fn test_check_status_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None)
            .with_probe_timeout(Duration::from_millis(50));
        assert!(!gateway.check_status().await);
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None)
            .with_completion_timeout(Duration::from_millis(50));
        assert!(gateway.check_status().await);

        let err = gateway
            .complete("Hello", CompletionParams::new(10, 0.3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::gateway::GatewayErrorKind::Timeout);
        assert!(matches!(err, GatewayError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_concurrent_check_returns_cached_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        let (first, second) = tokio::join!(gateway.check_status(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            gateway.check_status().await
        });

        assert!(first);
        // The second caller saw the probe in flight and got the cached (initial) flag
        assert!(!second);
        assert!(gateway.is_online());
    }

    #[tokio::test]
    async fn test_complete_offline_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("hi")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        let err = gateway
            .complete("Hello", CompletionParams::new(10, 0.3))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Offline));
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "local-model",
                "messages": [{"role": "user", "content": "Hello"}],
                "max_tokens": 200
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("{\"energy\": \"calm\"}")))
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), Some("local-model"));
        assert!(gateway.check_status().await);

        let text = gateway
            .complete("Hello", CompletionParams::new(200, 0.3))
            .await
            .unwrap();
        assert_eq!(text, "{\"energy\": \"calm\"}");
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        gateway.check_status().await;

        match gateway.complete("Hello", CompletionParams::new(10, 0.3)).await {
            Err(GatewayError::Http { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("Expected GatewayError::Http, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let gateway = InferenceGateway::new(Some(&mock_server.uri()), None);
        gateway.check_status().await;

        let err = gateway
            .complete("Hello", CompletionParams::new(10, 0.3))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ResponseMalformed(_)));
    }
}
