//! AI completion library
//!
//! This library provides a unified interface to hosted generative models:
//! - **Gemini**: Google `generateContent` API (default)
//! - **OpenAI**: any OpenAI-compatible `chat/completions` endpoint
//!
//! A request is a prompt plus an optional design image and optional current
//! code; the answer is the model's free text, unparsed.
//!
//! # Example
//!
//! ```rust,ignore
//! use inference::{BackendConfig, CompletionRequest, InferenceGateway};
//!
//! let config = BackendConfig {
//!     api_key: Some(std::env::var("GEMINI_API_KEY")?),
//!     ..Default::default()
//! };
//! let gateway = InferenceGateway::new("gemini", &config)?;
//!
//! let text = gateway
//!     .complete(&CompletionRequest::text("Describe this layout").with_image(image))
//!     .await?;
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod types;

// Re-exports for convenience
pub use backend::{
    BackendCapabilities, BackendError, BackendFactory, BackendInfo, BackendRegistry,
    GeminiBackend, InferenceBackend, OpenAiBackend,
};
pub use config::BackendConfig;
pub use gateway::{GatewayError, InferenceGateway, SharedGateway};
pub use types::{CodeContext, CompletionRequest, ImageInput};
