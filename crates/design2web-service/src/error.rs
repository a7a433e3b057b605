//! Error types for the design service
//!
//! Every error carries a user-facing message via
//! [`ServiceError::user_message`]. Upstream and internal failures collapse
//! to a generic message; their detail only goes to the log.

use design2web_pipeline::PipelineError;
use inference::GatewayError;
use thiserror::Error;

/// Result type alias using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;

const GENERIC_FAILURE: &str = "An error occurred while processing your request";

/// Rejected user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A prompt is required")]
    MissingPrompt,

    #[error("Prompt exceeds {max} characters")]
    PromptTooLong { max: usize },

    #[error("Image exceeds the {max_mb}MB limit")]
    ImageTooLarge { max_mb: usize },

    #[error("Image data is not valid base64")]
    InvalidImageEncoding,

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    #[error("A file name is required")]
    MissingFileName,
}

/// Errors that can occur in the design service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Daily limit of {limit} reached")]
    QuotaExceeded { limit: u32 },

    #[error("Upstream completion failed: {0}")]
    Upstream(#[from] GatewayError),

    #[error("No code could be recovered from the response")]
    Extraction,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Not allowed: {0}")]
    InvalidState(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl ServiceError {
    /// Create an invalid state error with a message
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Text safe to show to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::QuotaExceeded { limit } => format!(
                "You have used all {} generations for today. Try again tomorrow.",
                limit
            ),
            Self::Upstream(_) => GENERIC_FAILURE.to_string(),
            Self::Extraction => {
                "No valid code was produced. Try rephrasing your request.".to_string()
            }
            Self::SessionNotFound(_) => "Session not found".to_string(),
            Self::AssetNotFound(_) => "Asset not found".to_string(),
            Self::InvalidState(msg) => msg.clone(),
            Self::Pipeline(e) => match e {
                PipelineError::AlreadyFinal(_)
                | PipelineError::IndexOutOfRange { .. }
                | PipelineError::BoxNotFound(_)
                | PipelineError::InvalidGesture(_) => e.to_string(),
                PipelineError::AssetFetch(_) | PipelineError::Archive(_) | PipelineError::Io(_) => {
                    GENERIC_FAILURE.to_string()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference::BackendError;

    #[test]
    fn test_upstream_detail_is_hidden() {
        let err = ServiceError::Upstream(GatewayError::Backend(BackendError::Status {
            status: 403,
            body: "API key sk-live-123 revoked".into(),
        }));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_validation_message_is_specific() {
        let err = ServiceError::from(ValidationError::PromptTooLong { max: 10 });
        assert_eq!(err.user_message(), "Prompt exceeds 10 characters");
    }
}
