//! Design-to-web service layer
//!
//! Orchestrates the pipeline around user sessions:
//! - **validation**: prompt, image and upload checks plus input sanitization
//! - **prompt**: templates for design analysis and modification requests
//! - **quota**: per-user daily generation limit over a pluggable store
//! - **session**: one editing session (design, boxes, versions, lifecycle)
//! - **service**: the facade the HTTP layer calls
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use design2web_service::{DesignService, InMemoryUsageStore};
//!
//! let service = DesignService::new(gateway, Arc::new(InMemoryUsageStore::new()), 3);
//! let session = service.create_session("user-1").await;
//! service.set_design(&session.id, &image_base64).await?;
//! service.set_options(&session.id, true, "").await?;
//! let view = service.generate(&session.id).await?;
//! ```

pub mod analyze;
pub mod assets;
pub mod constants;
pub mod error;
pub mod prompt;
pub mod quota;
pub mod registry;
pub mod service;
pub mod session;
pub mod validation;

#[cfg(test)]
mod testing;

pub use analyze::{AnalyzeRequest, AnalyzeResponse};
pub use assets::{AssetStore, StoredAsset};
pub use error::{Result, ServiceError, ValidationError};
pub use quota::{DailyUsage, InMemoryUsageStore, QuotaGuard, QuotaStatus, UsageStore};
pub use registry::{SessionRegistry, SharedSession};
pub use service::DesignService;
pub use session::{CompletionKind, DesignSession, SessionPhase, SessionView};
