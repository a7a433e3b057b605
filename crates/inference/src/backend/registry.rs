//! Backend registry for runtime backend discovery and instantiation
//!
//! The registry manages available backends and provides factory methods
//! to create configured backend instances by name.

use std::collections::BTreeMap;

use super::{BackendError, BackendInfo, GeminiBackend, InferenceBackend, OpenAiBackend};
use crate::config::BackendConfig;
use crate::constants::backends;

/// Factory trait for creating backend instances
pub trait BackendFactory: Send + Sync {
    /// Create a new backend instance
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn InferenceBackend>, BackendError>;

    /// Get information about this backend
    fn info(&self) -> BackendInfo;
}

/// Factory for the Gemini backend
pub struct GeminiFactory;

impl BackendFactory for GeminiFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn InferenceBackend>, BackendError> {
        Ok(Box::new(GeminiBackend::new(config)?))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: backends::GEMINI.to_string(),
            description: "Google Gemini (generateContent)".to_string(),
            capabilities: GeminiBackend::static_capabilities(),
            active: false,
        }
    }
}

/// Factory for OpenAI-compatible servers
pub struct OpenAiFactory;

impl BackendFactory for OpenAiFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn InferenceBackend>, BackendError> {
        Ok(Box::new(OpenAiBackend::new(config)?))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: backends::OPENAI.to_string(),
            description: "OpenAI-compatible chat completions".to_string(),
            capabilities: OpenAiBackend::static_capabilities(),
            active: false,
        }
    }
}

/// Registry of available completion backends
pub struct BackendRegistry {
    factories: BTreeMap<String, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    /// Create a new registry with the built-in backends registered
    pub fn new() -> Self {
        let mut registry = Self {
            factories: BTreeMap::new(),
        };
        registry.register(backends::GEMINI, Box::new(GeminiFactory));
        registry.register(backends::OPENAI, Box::new(OpenAiFactory));
        registry
    }

    /// Register a backend factory
    pub fn register(&mut self, name: &str, factory: Box<dyn BackendFactory>) {
        self.factories.insert(name.to_string(), factory);
    }

    /// List all available backend names
    pub fn available_names(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Get information about all registered backends
    pub fn list(&self) -> Vec<BackendInfo> {
        self.factories.values().map(|f| f.info()).collect()
    }

    /// Create a backend instance by name
    pub fn create(
        &self,
        name: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn InferenceBackend>, BackendError> {
        self.factories
            .get(name)
            .ok_or_else(|| BackendError::Config(format!("Unknown backend: {}", name)))?
            .create(config)
    }

    /// Check if a backend is registered
    pub fn is_available(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
