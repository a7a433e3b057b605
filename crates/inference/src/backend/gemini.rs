//! Gemini backend implementation
//!
//! Talks to Google's `generateContent` endpoint. The design image travels
//! as an `inlineData` part next to the prompt text.

use async_trait::async_trait;

use super::{http_client, status_error, BackendCapabilities, BackendError, InferenceBackend};
use crate::config::BackendConfig;
use crate::constants::defaults;
use crate::types::{
    CompletionRequest, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, Part,
};

/// Gemini backend using the Generative Language API
pub struct GeminiBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiBackend {
    /// Create a new Gemini backend from configuration
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| defaults::GEMINI_MODEL.to_string());
        Ok(Self {
            http_client: http_client(config)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| defaults::GEMINI_BASE_URL.to_string()),
            api_key: config.api_key().map(str::to_string),
            // Accept both "gemini-2.5-flash" and "models/gemini-2.5-flash"
            model: model.trim_start_matches("models/").to_string(),
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
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Build the request body for a completion
    pub fn build_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: request.composed_text(),
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data_base64.clone(),
                },
            });
        }
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            }),
        }
    }

    /// Concatenate the text parts of the first candidate
    pub fn response_text(response: GenerateContentResponse) -> Result<String, BackendError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text),
                        Part::InlineData { .. } | Part::Other(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(BackendError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn description(&self) -> &'static str {
        "Google Gemini via the generateContent API"
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
            .ok_or_else(|| BackendError::NotConfigured("missing Gemini API key".to_string()))?;

        let body = self.build_request(request);
        log::debug!(
            "Gemini request: model={} text={}B image={}",
            self.model,
            request.composed_text().len(),
            request.image.is_some()
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Self::response_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageInput;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(&BackendConfig {
            api_key: Some("k".into()),
            model: Some("models/gemini-2.5-flash".into()),
            base_url: Some("http://localhost:9999/".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        assert_eq!(
            backend().endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest::text("Convert").with_image(ImageInput::jpeg("AAAA"));
        let json = serde_json::to_value(backend().build_request(&request)).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Convert");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "AAAA");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"html\":"}, {"text": "\"x\"}"}]}}]
        }))
        .unwrap();
        assert_eq!(
            GeminiBackend::response_text(response).unwrap(),
            "{\"html\":\"x\"}"
        );
    }

    #[test]
    fn test_response_text_skips_non_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"executableCode": {"language": "PYTHON", "code": "print(1)"}},
                {"text": "{\"html\":\"x\"}"},
                {"functionCall": {"name": "lookup", "args": {}}}
            ]}}]
        }))
        .unwrap();
        assert_eq!(
            GeminiBackend::response_text(response).unwrap(),
            "{\"html\":\"x\"}"
        );
    }

    #[test]
    fn test_empty_candidates_is_error() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(matches!(
            GeminiBackend::response_text(response),
            Err(BackendError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let backend = GeminiBackend::new(&BackendConfig::default()).unwrap();
        assert!(!backend.is_ready());
        let err = backend
            .complete(&CompletionRequest::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }
}
