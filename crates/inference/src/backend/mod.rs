//! Pluggable completion backend abstraction
//!
//! This module provides a trait-based abstraction over hosted model APIs.
//! All backends implement the same interface, allowing runtime switching
//! between providers.

pub mod gemini;
pub mod openai;
pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::CompletionRequest;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use registry::{BackendFactory, BackendRegistry};

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream returned no text")]
    EmptyResponse,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Capabilities that a backend may or may not support
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendCapabilities {
    /// Accepts an inline image with the prompt
    pub vision: bool,
    /// Honors a token cap
    pub max_tokens: bool,
}

/// Backend information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Registry key (e.g., "gemini", "openai")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Backend capabilities
    pub capabilities: BackendCapabilities,
    /// Whether this backend is currently active
    pub active: bool,
}

/// The core trait that all completion backends must implement.
///
/// Application code calls the gateway, which forwards to whichever backend
/// is active.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    // ─── IDENTITY ───────────────────────────────────────────────────

    /// Human-readable name for display
    fn name(&self) -> &'static str;

    /// Description of this backend
    fn description(&self) -> &'static str;

    /// What this backend supports
    fn capabilities(&self) -> BackendCapabilities;

    /// Has credentials and can accept requests
    fn is_ready(&self) -> bool;

    // ─── INFERENCE ──────────────────────────────────────────────────

    /// Submit a prompt (plus optional image/code context) and return the
    /// model's text answer
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}

/// Build the shared HTTP client for a backend
pub(crate) fn http_client(config: &crate::BackendConfig) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(BackendError::Http)
}

/// Read an error response body without failing the error path itself
pub(crate) async fn status_error(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::Status {
        status,
        body: body.chars().take(500).collect(),
    }
}
