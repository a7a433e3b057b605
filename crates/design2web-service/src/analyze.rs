//! Stateless analyze contract
//!
//! Request `{prompt, imageBase64?, html?, css?, js?}`, response
//! `{choices:[{message:{content}}]}` where `content` is a JSON string of
//! `{html, css, js}`. Extraction failure yields empty fields rather than an
//! error, so existing clients always get parseable content.

use design2web_pipeline::{extract, ExtractionResult};
use inference::{CodeContext, CompletionRequest, InferenceGateway};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::validation::{parse_image, sanitize_input, sanitize_script, validate_prompt};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub css: Option<String>,
    #[serde(default)]
    pub js: Option<String>,
}

impl AnalyzeRequest {
    /// Whether this request analyzes a new design (and so consumes quota)
    pub fn is_design_analysis(&self) -> bool {
        self.image_base64
            .as_deref()
            .is_some_and(|image| !image.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub choices: Vec<AnalyzeChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeChoice {
    pub message: AnalyzeMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeMessage {
    pub content: String,
}

impl AnalyzeResponse {
    pub fn from_result(result: &ExtractionResult) -> Result<Self> {
        let content = serde_json::to_string(result).map_err(|e| {
            log::error!("Failed to encode analyze result: {}", e);
            ServiceError::Extraction
        })?;
        Ok(Self {
            choices: vec![AnalyzeChoice {
                message: AnalyzeMessage { content },
            }],
        })
    }

    /// The code carried in the first choice, if it parses
    pub fn code(&self) -> Option<ExtractionResult> {
        let content = &self.choices.first()?.message.content;
        serde_json::from_str(content).ok()
    }
}

/// Validate and sanitize an analyze request into a completion request.
///
/// With an image the request is a design analysis; the code fields are
/// ignored. Without one it is a modification of the supplied code.
pub fn build_completion_request(request: &AnalyzeRequest) -> Result<CompletionRequest> {
    validate_prompt(&request.prompt)?;
    let prompt = sanitize_input(&request.prompt);

    if request.is_design_analysis() {
        let image = parse_image(request.image_base64.as_deref().unwrap_or_default())?;
        return Ok(CompletionRequest::text(prompt).with_image(image));
    }

    let context = CodeContext {
        html: sanitize_input(request.html.as_deref().unwrap_or_default()),
        css: sanitize_input(request.css.as_deref().unwrap_or_default()),
        js: sanitize_script(request.js.as_deref().unwrap_or_default()),
    };
    Ok(CompletionRequest::text(prompt).with_context(context))
}

/// Send an already validated request and encode whatever code comes back.
pub async fn complete_and_extract(
    gateway: &InferenceGateway,
    completion: &CompletionRequest,
) -> Result<AnalyzeResponse> {
    let text = gateway.complete(completion).await.map_err(|e| {
        log::error!("Analyze completion failed: {}", e);
        ServiceError::Upstream(e)
    })?;

    let result = extract(&text).unwrap_or_else(|| {
        log::warn!("Analyze: returning empty code for a {} byte response", text.len());
        ExtractionResult::default()
    });
    AnalyzeResponse::from_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::testing::CannedBackend;

    fn gateway(answer: &str) -> InferenceGateway {
        InferenceGateway::with_backend(Box::new(CannedBackend::new(answer)), "canned")
    }

    #[test]
    fn test_request_shapes() {
        let design: AnalyzeRequest = serde_json::from_str(
            r#"{"prompt":"build it","imageBase64":"data:image/png;base64,QUJD"}"#,
        )
        .unwrap();
        assert!(design.is_design_analysis());
        let completion = build_completion_request(&design).unwrap();
        assert_eq!(completion.image.unwrap().mime_type, "image/png");
        assert!(completion.context.is_none());

        let modify: AnalyzeRequest = serde_json::from_str(
            r#"{"prompt":"bigger <script>x</script>","html":"<p onclick=\"x()\">a</p>","js":"b.onclick = f;"}"#,
        )
        .unwrap();
        let completion = build_completion_request(&modify).unwrap();
        assert_eq!(completion.prompt, "bigger");
        let context = completion.context.unwrap();
        assert_eq!(context.html, "<p \"x()\">a</p>");
        assert_eq!(context.css, "");
        assert_eq!(context.js, "b.onclick = f;");
    }

    #[test]
    fn test_invalid_requests_rejected() {
        let missing = AnalyzeRequest::default();
        assert!(matches!(
            build_completion_request(&missing),
            Err(ServiceError::Validation(ValidationError::MissingPrompt))
        ));

        let bad_image = AnalyzeRequest {
            prompt: "x".into(),
            image_base64: Some("%%%".into()),
            ..Default::default()
        };
        assert!(matches!(
            build_completion_request(&bad_image),
            Err(ServiceError::Validation(ValidationError::InvalidImageEncoding))
        ));
    }

    #[tokio::test]
    async fn test_analyze_returns_encoded_code() {
        let gateway = gateway("```html\n<main>Hi</main>\n```\n```css\nmain{}\n```");
        let request = AnalyzeRequest {
            prompt: "tweak".into(),
            html: Some("<main></main>".into()),
            ..Default::default()
        };
        let completion = build_completion_request(&request).unwrap();
        let response = complete_and_extract(&gateway, &completion).await.unwrap();
        let code = response.code().unwrap();
        assert_eq!(code.html, "<main>Hi</main>");
        assert_eq!(code.css, "main{}");
    }

    #[tokio::test]
    async fn test_analyze_unrecoverable_answer_is_empty() {
        let gateway = gateway("Sorry, I can't do that.");
        let request = AnalyzeRequest {
            prompt: "tweak".into(),
            ..Default::default()
        };
        let completion = build_completion_request(&request).unwrap();
        let response = complete_and_extract(&gateway, &completion).await.unwrap();
        assert_eq!(
            response.choices[0].message.content,
            r#"{"html":"","css":"","js":""}"#
        );
    }
}
