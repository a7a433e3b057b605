//! Error types for the design pipeline

use thiserror::Error;

/// Result type alias using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur in the design pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A final version has already been chosen
    #[error("Final version already selected at index {0}")]
    AlreadyFinal(usize),

    /// Ledger index does not exist
    #[error("Version index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Box lookup failed
    #[error("Bounding box not found: {0}")]
    BoxNotFound(String),

    /// Canvas gesture rejected
    #[error("Invalid canvas gesture: {0}")]
    InvalidGesture(String),

    /// Asset could not be fetched for export
    #[error("Asset fetch failed: {0}")]
    AssetFetch(String),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Create an asset fetch error with a message
    pub fn asset_fetch(msg: impl Into<String>) -> Self {
        Self::AssetFetch(msg.into())
    }
}
