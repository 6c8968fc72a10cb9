//! Language-model client.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::GenerateError;

/// Something that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl ChatClient {
    /// Create a client from a model configuration.
    pub fn new(config: ModelConfig) -> Result<Self, GenerateError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Model identifier used for requests.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl TextGenerator for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.config.model, endpoint = %self.endpoint(), "Sending generation request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        extract_content(body)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's text out of a completion response.
fn extract_content(response: ChatResponse) -> Result<String, GenerateError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerateError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base_url: &str) -> ChatClient {
        let config = ModelConfig::builder()
            .api_key("key")
            .base_url(base_url)
            .build()
            .unwrap();
        ChatClient::new(config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            client("https://example.test/v1/").endpoint(),
            "https://example.test/v1/chat/completions"
        );
        assert_eq!(
            client("https://example.test/v1").endpoint(),
            "https://example.test/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "model": "m", "messages": [{ "role": "user", "content": "hi" }] })
        );
    }

    #[test]
    fn test_extract_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "# Doc" } }]
        }))
        .unwrap();
        assert_eq!(extract_content(response).unwrap(), "# Doc");
    }

    #[test]
    fn test_extract_content_empty() {
        let response: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(
            extract_content(response),
            Err(GenerateError::EmptyResponse)
        ));

        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": null } }]
        }))
        .unwrap();
        assert!(matches!(
            extract_content(response),
            Err(GenerateError::EmptyResponse)
        ));
    }
}
