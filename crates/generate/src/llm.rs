use serde::Serialize;

use crate::error::GenerationError;
use crate::response::ModelResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            temperature: 0.3,
        }
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    api_key: Option<String>,
    config: GenerationConfig,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
    temperature: f32,
    stream: bool,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// One non-streaming completion. No retry: failures go straight back.
    pub async fn complete(&self, messages: &[ChatMessage<'_>]) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            stream: false,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(GenerationError::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(GenerationError::Request)?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        ModelResponse::parse(&body)?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn sends_model_temperature_and_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4.1",
                "temperature": 0.3,
                "stream": false,
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "go"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"done"}}]}"#)
            .create_async()
            .await;

        let client = ChatClient::new(server.url(), GenerationConfig::default()).with_api_key("sk-test");
        let messages = [
            ChatMessage { role: "system", content: "sys" },
            ChatMessage { role: "user", content: "go" },
        ];

        assert_eq!(client.complete(&messages).await.unwrap(), "done");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .expect(1)
            .create_async()
            .await;

        let client = ChatClient::new(server.url(), GenerationConfig::default());
        let err = client
            .complete(&[ChatMessage { role: "user", content: "go" }])
            .await
            .unwrap_err();

        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }
}
