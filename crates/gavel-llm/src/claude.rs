use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_SECS: u64 = 1;

#[derive(Clone)]
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl fmt::Debug for ClaudeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ClaudeProvider {
    #[must_use]
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: API_URL.into(),
            model,
            max_tokens,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(&self, messages: &[Message]) -> Result<String, LlmError> {
        let (system, chat_messages) = split_messages(messages);

        for attempt in 0..=MAX_RETRIES {
            let body = RequestBody {
                model: &self.model,
                max_tokens: self.max_tokens,
                system: system.as_deref(),
                messages: &chat_messages,
            };

            let response = self
                .client
                .post(&self.base_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RETRIES {
                    return Err(LlmError::RateLimited);
                }
                let delay = retry_delay(&response, attempt);
                tracing::warn!(
                    "Claude rate limited, retrying in {}s (attempt {}/{})",
                    delay.as_secs(),
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let text = response.text().await.map_err(LlmError::Http)?;

            if !status.is_success() {
                tracing::error!("Claude API error {status}: {text}");
                return Err(LlmError::Other(format!(
                    "Claude API request failed (status {status})"
                )));
            }

            let resp: ApiResponse = serde_json::from_str(&text)?;

            return resp
                .content
                .first()
                .map(|c| c.text.clone())
                .ok_or(LlmError::EmptyResponse { provider: "claude" });
        }

        Err(LlmError::RateLimited)
    }
}

impl LlmProvider for ClaudeProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.send_request(messages).await
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        Err(LlmError::EmbedUnsupported { provider: "claude" })
    }

    fn supports_embeddings(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}

fn retry_delay(response: &reqwest::Response, attempt: u32) -> Duration {
    if let Some(val) = response.headers().get("retry-after")
        && let Ok(s) = val.to_str()
        && let Ok(secs) = s.parse::<u64>()
    {
        return Duration::from_secs(secs);
    }
    Duration::from_secs(BASE_BACKOFF_SECS << attempt)
}

fn split_messages(messages: &[Message]) -> (Option<String>, Vec<ApiMessage<'_>>) {
    let mut system_parts = Vec::new();
    let mut chat = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(msg.content.as_str()),
            Role::User => chat.push(ApiMessage {
                role: "user",
                content: &msg.content,
            }),
            Role::Assistant => chat.push(ApiMessage {
                role: "assistant",
                content: &msg.content,
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, chat)
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ApiMessage<'a>],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn split_messages_extracts_system() {
        let messages = vec![Message::system("You are helpful."), Message::user("Hi")];
        let (system, chat) = split_messages(&messages);
        assert_eq!(system.unwrap(), "You are helpful.");
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].role, "user");
    }

    #[test]
    fn split_messages_multiple_system() {
        let messages = vec![
            Message::system("Part 1"),
            Message::system("Part 2"),
            Message::user("Hi"),
        ];
        let (system, _) = split_messages(&messages);
        assert_eq!(system.unwrap(), "Part 1\n\nPart 2");
    }

    #[test]
    fn split_messages_no_system() {
        let messages = [Message::user("Hi")];
        let (system, chat) = split_messages(&messages);
        assert!(system.is_none());
        assert_eq!(chat.len(), 1);
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = ClaudeProvider::new("sk-secret-key".into(), "claude-sonnet-4-5".into(), 1024);
        let debug_output = format!("{provider:?}");
        assert!(!debug_output.contains("sk-secret-key"));
        assert!(debug_output.contains("<redacted>"));
    }

    #[test]
    fn request_body_omits_missing_system() {
        let body = RequestBody {
            model: "claude-sonnet-4-5",
            max_tokens: 1024,
            system: None,
            messages: &[ApiMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("system"));
        assert!(json.contains("\"max_tokens\":1024"));
    }

    #[test]
    fn api_response_deserializes() {
        let json = r#"{"content":[{"text":"Hello world"}]}"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.content[0].text, "Hello world");
    }

    #[tokio::test]
    async fn chat_returns_first_content_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Board Resolution"}]
            })))
            .mount(&server)
            .await;

        let provider =
            ClaudeProvider::new("key".into(), "claude-sonnet-4-5".into(), 256).with_base_url(server.uri());
        let reply = provider.chat(&[Message::user("classify")]).await.unwrap();
        assert_eq!(reply, "Board Resolution");
    }

    #[tokio::test]
    async fn chat_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})),
            )
            .mount(&server)
            .await;

        let provider =
            ClaudeProvider::new("key".into(), "claude-sonnet-4-5".into(), 256).with_base_url(server.uri());
        let err = provider.chat(&[Message::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }

    #[tokio::test]
    async fn chat_retries_on_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .mount(&server)
            .await;

        let provider =
            ClaudeProvider::new("key".into(), "claude-sonnet-4-5".into(), 256).with_base_url(server.uri());
        let reply = provider.chat(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn chat_with_unreachable_endpoint_errors() {
        let provider = ClaudeProvider::new("key".into(), "model".into(), 1024)
            .with_base_url("http://127.0.0.1:1");
        assert!(provider.chat(&[Message::user("test")]).await.is_err());
    }

    #[tokio::test]
    async fn embed_is_unsupported() {
        let provider = ClaudeProvider::new("key".into(), "model".into(), 1024);
        assert!(!provider.supports_embeddings());
        let err = provider.embed("text").await.unwrap_err();
        assert!(err.to_string().contains("embedding not supported"));
    }
}
