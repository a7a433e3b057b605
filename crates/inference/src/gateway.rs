//! Inference Gateway - Single entry point for all completion requests
//!
//! The gateway abstracts over the hosted backends, providing a unified
//! interface for the rest of the application. It owns the active backend,
//! handles switching, and forwards requests.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::backend::{BackendCapabilities, BackendError, BackendInfo, BackendRegistry, InferenceBackend};
use crate::config::BackendConfig;
use crate::types::CompletionRequest;

/// Error types for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend switch failed: {0}")]
    SwitchFailed(String),
}

/// The single entry point for ALL completion requests.
///
/// Application code should only interact with InferenceGateway, never
/// with backends directly.
pub struct InferenceGateway {
    /// The currently active backend
    backend: Arc<RwLock<Box<dyn InferenceBackend>>>,
    /// Registry of available backends
    registry: BackendRegistry,
    /// Name of the current backend
    current_backend_name: Arc<RwLock<String>>,
}

impl InferenceGateway {
    /// Create a gateway with the named registry backend
    pub fn new(name: &str, config: &BackendConfig) -> Result<Self, GatewayError> {
        let registry = BackendRegistry::new();
        let backend = registry
            .create(name, config)
            .map_err(|e| GatewayError::SwitchFailed(e.to_string()))?;
        if !backend.is_ready() {
            log::warn!("Backend '{}' has no API key; completions will fail", name);
        }
        Ok(Self {
            backend: Arc::new(RwLock::new(backend)),
            registry,
            current_backend_name: Arc::new(RwLock::new(name.to_string())),
        })
    }

    /// Create a new gateway with a specific backend
    pub fn with_backend(backend: Box<dyn InferenceBackend>, name: &str) -> Self {
        Self {
            backend: Arc::new(RwLock::new(backend)),
            registry: BackendRegistry::new(),
            current_backend_name: Arc::new(RwLock::new(name.to_string())),
        }
    }

    /// Get the registry for backend information
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Get the name of the currently active backend
    pub async fn current_backend_name(&self) -> String {
        self.current_backend_name.read().await.clone()
    }

    /// Switch to a different backend
    ///
    /// The new backend is created from `config` before the old one is
    /// replaced, so an unknown name leaves the gateway unchanged.
    pub async fn switch_backend(&self, name: &str, config: &BackendConfig) -> Result<(), GatewayError> {
        let new_backend = self
            .registry
            .create(name, config)
            .map_err(|e| GatewayError::SwitchFailed(e.to_string()))?;

        {
            let mut guard = self.backend.write().await;
            *guard = new_backend;
        }
        {
            let mut name_guard = self.current_backend_name.write().await;
            *name_guard = name.to_string();
        }

        log::info!("Switched to backend: {}", name);
        Ok(())
    }

    /// List all available backends with their info
    pub async fn available_backends(&self) -> Vec<BackendInfo> {
        let current = self.current_backend_name().await;
        self.registry
            .list()
            .into_iter()
            .map(|mut info| {
                info.active = info.name == current;
                info
            })
            .collect()
    }

    /// Check if the current backend can accept requests
    pub async fn is_ready(&self) -> bool {
        let guard = self.backend.read().await;
        guard.is_ready()
    }

    /// Get capabilities of the current backend
    pub async fn capabilities(&self) -> BackendCapabilities {
        let guard = self.backend.read().await;
        guard.capabilities()
    }

    // ─── INFERENCE METHODS ──────────────────────────────────────────

    /// Run a completion on the active backend
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let guard = self.backend.read().await;
        if !guard.is_ready() {
            return Err(GatewayError::Backend(BackendError::NotConfigured(format!(
                "{} has no API key",
                guard.name()
            ))));
        }

        let started = Instant::now();
        let result = guard.complete(request).await;
        match &result {
            Ok(text) => log::debug!(
                "{} completion: {}B in {:?}",
                guard.name(),
                text.len(),
                started.elapsed()
            ),
            Err(e) => log::debug!("{} completion failed after {:?}: {}", guard.name(), started.elapsed(), e),
        }
        result.map_err(GatewayError::Backend)
    }
}

/// Shared gateway type for application state
pub type SharedGateway = Arc<InferenceGateway>;
