//! OpenAI-compatible backend implementation
//!
//! Works with any server that speaks `POST /v1/chat/completions`
//! (OpenAI, OpenRouter, LM Studio, llama.cpp server, ...). Images are sent
//! as `image_url` data URLs.

use async_trait::async_trait;

use super::{http_client, status_error, BackendCapabilities, BackendError, InferenceBackend};
use crate::config::BackendConfig;
use crate::constants::defaults;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, CompletionRequest, ContentPart, ImageUrlData,
};

/// Backend for OpenAI-compatible chat completion servers
pub struct OpenAiBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self {
            http_client: http_client(config)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| defaults::OPENAI_BASE_URL.to_string()),
            api_key: config.api_key().map(str::to_string),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| defaults::OPENAI_MODEL.to_string()),
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
        })
    }

    /// Get static capabilities (for registry info before instantiation)
    pub fn static_capabilities() -> BackendCapabilities {
        BackendCapabilities {
            vision: true,
            max_tokens: true,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Build a non-streaming chat request
    pub fn build_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut content = vec![ContentPart::Text {
            text: request.composed_text(),
        }];
        if let Some(image) = &request.image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrlData {
                    url: image.data_url(),
                },
            });
        }
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            stream: false,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    /// Text of the first choice
    pub fn response_text(response: ChatResponse) -> Result<String, BackendError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)
    }
}

#[async_trait]
impl InferenceBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn description(&self) -> &'static str {
        "OpenAI-compatible chat completions endpoint"
    }

    fn capabilities(&self) -> BackendCapabilities {
        Self::static_capabilities()
    }

    fn is_ready(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| BackendError::NotConfigured("missing OpenAI API key".to_string()))?;

        let body = self.build_request(request);
        log::debug!(
            "Chat completion request: model={} image={}",
            self.model,
            request.image.is_some()
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: ChatResponse = response.json().await?;
        Self::response_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageInput;

    #[test]
    fn test_request_carries_data_url() {
        let backend = OpenAiBackend::new(&BackendConfig::default()).unwrap();
        let request = CompletionRequest::text("Convert").with_image(ImageInput::new("image/png", "QUJD"));
        let json = serde_json::to_value(backend.build_request(&request)).unwrap();

        assert_eq!(json["model"], defaults::OPENAI_MODEL);
        assert_eq!(json["stream"], false);
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_endpoint() {
        let backend = OpenAiBackend::new(&BackendConfig {
            base_url: Some("http://127.0.0.1:1234/".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.endpoint(), "http://127.0.0.1:1234/v1/chat/completions");
    }

    #[test]
    fn test_response_text() {
        let ok: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{}"}}]
        }))
        .unwrap();
        assert_eq!(OpenAiBackend::response_text(ok).unwrap(), "{}");

        let empty: ChatResponse =
            serde_json::from_value(serde_json::json!({"choices": [{"message": {"content": null}}]}))
                .unwrap();
        assert!(matches!(
            OpenAiBackend::response_text(empty),
            Err(BackendError::EmptyResponse)
        ));
    }
}
