//! OpenAI-compatible chat completions client
//!
//! Works with any server that implements the OpenAI chat completions format
//! under `<base_url>/api/chat/completions` (Open WebUI style deployments such
//! as SoonerAI).
//!
//! Request body:
//!
//! ```json
//! {"model": "gemma3:4b", "messages": [{"role": "system", "content": "..."}], "temperature": 0.6}
//! ```
//!
//! Only the first choice's `message.content` is read from the response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::Message;

use super::{ChatBackend, CompletionError};

/// Path appended to the base URL
pub const COMPLETIONS_PATH: &str = "/api/chat/completions";

/// Wire form of a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize, Deserialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Connection settings for an OpenAI-compatible server
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// Base URL without the completions path (e.g., https://ai.sooners.us)
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Model to request
    pub model: String,
    /// Sampling temperature; omitted from the request when `None`
    pub temperature: Option<f32>,
    /// Request timeout; the HTTP client default applies when `None`
    pub timeout_secs: Option<u64>,
}

impl OpenAICompatConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            timeout_secs: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, COMPLETIONS_PATH)
    }
}

/// OpenAI-compatible API provider
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    fn build_request(&self, messages: &[Message]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            temperature: self.config.temperature,
        }
    }

    /// Send one chat completion request and return the trimmed reply
    pub async fn chat(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let url = self.config.endpoint();
        let request = self.build_request(messages);

        tracing::debug!(
            %url,
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error_resp) => error_resp.error.message,
                Err(_) => body,
            };
            tracing::warn!(status = status.as_u16(), "completion request rejected");
            return Err(CompletionError::from_status(status.as_u16(), detail));
        }

        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        CompletionError::MalformedResponse(format!("{} - Body: {}", e, body))
    })?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("No choices in response".to_string()))?;

    let content = choice.message.content.ok_or_else(|| {
        CompletionError::MalformedResponse("First choice has no message content".to_string())
    })?;

    Ok(content.trim().to_string())
}

#[async_trait]
impl ChatBackend for OpenAICompatProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        self.chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;

    use super::*;
    use crate::conversation::{Conversation, Role};
    use crate::providers::CompletionErrorKind;

    #[derive(Debug, Default, Clone)]
    struct Captured {
        authorization: Option<String>,
        content_type: Option<String>,
        body: String,
    }

    /// Serve a canned reply on the completions path; returns the base URL.
    async fn spawn_mock(
        status: StatusCode,
        reply: &'static str,
    ) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        let app = Router::new().route(
            COMPLETIONS_PATH,
            post(move |headers: HeaderMap, body: String| {
                let sink = sink.clone();
                async move {
                    let header = |name: &str| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(|s| s.to_string())
                    };
                    sink.lock().unwrap().push(Captured {
                        authorization: header("authorization"),
                        content_type: header("content-type"),
                        body,
                    });
                    (status, reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn provider(base_url: &str) -> OpenAICompatProvider {
        let config = OpenAICompatConfig::new(base_url, "test-key", "gemma3:4b");
        OpenAICompatProvider::new(config).unwrap()
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = OpenAICompatConfig::new("https://ai.sooners.us/", "k", "m");
        assert_eq!(config.endpoint(), "https://ai.sooners.us/api/chat/completions");
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message::new(Role::User, "Hello");
        let chat_msg = ChatMessage::from(&msg);
        assert_eq!(chat_msg.role, "user");
        assert_eq!(chat_msg.content, "Hello");
    }

    #[test]
    fn test_request_body_round_trip() {
        let provider = provider("http://localhost");
        let messages = vec![
            Message::new(Role::System, "S"),
            Message::new(Role::User, "A"),
            Message::new(Role::Assistant, "B"),
        ];

        let body = serde_json::to_string(&provider.build_request(&messages)).unwrap();
        assert!(!body.contains("temperature"));

        let parsed: ChatCompletionRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.model, "gemma3:4b");
        let pairs: Vec<(&str, &str)> = parsed
            .messages
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(pairs, vec![("system", "S"), ("user", "A"), ("assistant", "B")]);
    }

    #[test]
    fn test_temperature_serialized_when_set() {
        let config =
            OpenAICompatConfig::new("http://localhost", "k", "m").with_temperature(Some(0.5));
        let provider = OpenAICompatProvider::new(config).unwrap();
        let value = serde_json::to_value(provider.build_request(&[])).unwrap();
        assert_eq!(value["temperature"], serde_json::json!(0.5));
    }

    #[test]
    fn test_parse_reply_trims_whitespace() {
        let reply = parse_reply(r#"{"choices":[{"message":{"content":"  ahoy!\n"}}]}"#).unwrap();
        assert_eq!(reply, "ahoy!");
    }

    #[test]
    fn test_parse_reply_missing_fields() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"data":"nope"}"#,
            "not json",
        ] {
            let err = parse_reply(body).unwrap_err();
            assert_eq!(err.kind(), CompletionErrorKind::MalformedResponse, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_complete_success() {
        let (base_url, captured) =
            spawn_mock(StatusCode::OK, r#"{"choices":[{"message":{"content":"hello!"}}]}"#).await;

        let mut conv = Conversation::new("Be SpongeBob", 16);
        conv.add_user("hi");

        let reply = provider(&base_url).complete(&conv.snapshot()).await.unwrap();
        assert_eq!(reply, "hello!");

        let requests = captured.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-key"));
        assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gemma3:4b");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[tokio::test]
    async fn test_complete_unauthorized() {
        let (base_url, _) = spawn_mock(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API key"}}"#,
        )
        .await;

        let err = provider(&base_url)
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CompletionErrorKind::Auth);
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn test_complete_server_error() {
        let (base_url, _) = spawn_mock(StatusCode::BAD_GATEWAY, "upstream down").await;

        let err = provider(&base_url)
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CompletionErrorKind::Server);
        assert!(err.to_string().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let (base_url, _) = spawn_mock(StatusCode::OK, r#"{"choices":[]}"#).await;

        let err = provider(&base_url)
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CompletionErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_complete_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider(&format!("http://{}", addr))
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CompletionErrorKind::Network);
    }
}
