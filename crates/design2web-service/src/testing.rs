//! Test doubles

use async_trait::async_trait;
use inference::{BackendCapabilities, BackendError, CompletionRequest, InferenceBackend};

/// Backend that answers every request with the same text
pub(crate) struct CannedBackend {
    answer: String,
}

impl CannedBackend {
    pub(crate) fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
        }
    }
}

#[async_trait]
impl InferenceBackend for CannedBackend {
    fn name(&self) -> &'static str {
        "Canned"
    }

    fn description(&self) -> &'static str {
        "Returns a fixed answer"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, BackendError> {
        Ok(self.answer.clone())
    }
}

/// Backend whose completions never resolve
pub(crate) struct StalledBackend;

#[async_trait]
impl InferenceBackend for StalledBackend {
    fn name(&self) -> &'static str {
        "Stalled"
    }

    fn description(&self) -> &'static str {
        "Never answers"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, BackendError> {
        std::future::pending().await
    }
}
