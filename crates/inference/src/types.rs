//! Common types for completion requests and provider wire formats

use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Inline image sent alongside the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    /// Base64 payload without any `data:` prefix
    pub data_base64: String,
}

impl ImageInput {
    pub fn new(mime_type: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data_base64: data_base64.into(),
        }
    }

    /// Image with the default MIME type
    pub fn jpeg(data_base64: impl Into<String>) -> Self {
        Self::new(defaults::IMAGE_MIME, data_base64)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

/// Current code handed to the model for a modification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeContext {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// A provider-neutral completion request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub image: Option<ImageInput>,
    pub context: Option<CodeContext>,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_context(mut self, context: CodeContext) -> Self {
        self.context = Some(context);
        self
    }

    /// The text part actually sent to the provider.
    ///
    /// With code context the prompt becomes the requested change, framed by
    /// the current code and a JSON-only answer instruction.
    pub fn composed_text(&self) -> String {
        let Some(context) = &self.context else {
            return self.prompt.clone();
        };
        format!(
            "Current HTML:\n{}\n\nCurrent CSS:\n{}\n\nCurrent JavaScript:\n{}\n\nRequested change:\n{}\n\nRespond with a single JSON object with string fields \"html\", \"css\" and \"js\" containing the complete updated code. Do not add explanations or Markdown.",
            context.html, context.css, context.js, self.prompt
        )
    }
}

// ─── OPENAI-COMPATIBLE WIRE FORMAT ──────────────────────────────────

/// Chat message with multimodal content support
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// Content part - text or image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrlData },
}

/// Image URL data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlData {
    pub url: String,
}

/// Chat completion request (OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Non-streaming chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

// ─── GEMINI WIRE FORMAT ─────────────────────────────────────────────

/// `generateContent` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a Gemini message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Part kinds this crate does not use (function calls, executable code)
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// `generateContent` response body
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_text_without_context_is_prompt() {
        let request = CompletionRequest::text("Build it").with_image(ImageInput::jpeg("AAAA"));
        assert_eq!(request.composed_text(), "Build it");
    }

    #[test]
    fn test_composed_text_frames_current_code() {
        let request = CompletionRequest::text("make the title blue").with_context(CodeContext {
            html: "<h1>T</h1>".into(),
            css: "h1 {}".into(),
            js: String::new(),
        });
        let text = request.composed_text();
        assert!(text.starts_with("Current HTML:\n<h1>T</h1>\n\nCurrent CSS:\nh1 {}"));
        assert!(text.contains("Requested change:\nmake the title blue"));
        assert!(text.contains("single JSON object"));
    }

    #[test]
    fn test_data_url() {
        assert_eq!(
            ImageInput::new("image/png", "QUJD").data_url(),
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn test_gemini_part_shapes() {
        let parts = vec![
            Part::Text { text: "hi".into() },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: "image/jpeg".into(),
                    data: "AAAA".into(),
                },
            },
        ];
        let json = serde_json::to_value(&parts).unwrap();
        assert_eq!(json[0]["text"], "hi");
        assert_eq!(json[1]["inlineData"]["mimeType"], "image/jpeg");

        let decoded: Vec<Part> = serde_json::from_value(json).unwrap();
        assert!(matches!(&decoded[0], Part::Text { text } if text == "hi"));
    }
}
