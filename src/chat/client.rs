//! Chat completion client for an OpenAI-compatible API

use crate::conversation::models::ChatMessage;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Completion backend trait; the production implementation talks to an
/// OpenAI-compatible endpoint, tests substitute a stub.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produce a reply for the given conversation
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Configuration for the OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Upper bound on a single completion call, independent of any
    /// request's response deadline
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// OpenAI-compatible chat completion client
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BridgeError::Internal(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!("Requesting completion: model={}, {} messages", self.config.model, messages.len());

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            // Deterministic sampling
            temperature: 0.0,
        };

        let mut req = self.client.post(&self.config.endpoint).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Api(format!("HTTP {status}: {body}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Api(format!("failed to parse response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BridgeError::Api("no choices in response".to_string()))
    }
}

// OpenAI-compatible wire types
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig {
            endpoint: format!("{}/v1/chat/completions", server.url()),
            api_key: Some("test-key".to_string()),
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "안녕하세요!"}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let reply = client.complete(&[ChatMessage::user("안녕")]).await.unwrap();
        assert_eq!(reply, "안녕하세요!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, BridgeError::Api(_)));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, BridgeError::Api(_)));
    }
}
