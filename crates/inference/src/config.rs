//! Configuration types for the inference library

use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Connection settings for a hosted backend
///
/// Fields left as `None` fall back to the backend's own defaults, so the
/// same config can be handed to either provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API base URL, without the versioned path
    pub base_url: Option<String>,
    /// API key; a backend without one reports not ready
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name (e.g., "gemini-2.5-flash", "gpt-4o-mini")
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(defaults::MAX_TOKENS)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(defaults::TEMPERATURE)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(defaults::TIMEOUT_SECS))
    }

    /// Non-empty API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}
