//! HTTP routes
//!
//! Thin glue over [`DesignService`]: extract, call, map the error.

mod analyze;
mod assets;
mod sessions;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use design2web_pipeline::PipelineError;
use design2web_service::{DesignService, ServiceError};
use tower_http::cors::{Any, CorsLayer};

use crate::constants::headers;

/// Shared state for Axum handlers
pub type AppState = Arc<DesignService>;

/// Request bodies carry base64 images of up to 10 MiB plus JSON framing
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn router(service: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/analyze", post(analyze::analyze_handler))
        .route("/api/quota", get(sessions::quota_handler))
        .route("/api/sessions", post(sessions::create_handler))
        .route(
            "/api/sessions/:id",
            get(sessions::show_handler).delete(sessions::close_handler),
        )
        .route("/api/sessions/:id/design", put(sessions::design_handler))
        .route("/api/sessions/:id/options", put(sessions::options_handler))
        .route("/api/sessions/:id/zoom", put(sessions::zoom_handler))
        .route("/api/sessions/:id/boxes", post(sessions::draw_box_handler))
        .route(
            "/api/sessions/:id/boxes/:box_id",
            axum::routing::patch(sessions::move_box_handler).delete(sessions::delete_box_handler),
        )
        .route(
            "/api/sessions/:id/boxes/:box_id/asset",
            put(sessions::attach_asset_handler),
        )
        .route("/api/sessions/:id/generate", post(sessions::generate_handler))
        .route("/api/sessions/:id/modify", post(sessions::modify_handler))
        .route("/api/sessions/:id/navigate", post(sessions::navigate_handler))
        .route("/api/sessions/:id/finalize", post(sessions::finalize_handler))
        .route("/api/sessions/:id/reset", post(sessions::reset_handler))
        .route("/api/sessions/:id/preview", get(sessions::preview_handler))
        .route("/api/sessions/:id/export", get(sessions::export_handler))
        .route("/api/assets/:id", get(assets::asset_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(service)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Caller identity from the user id header
fn user_id(request_headers: &HeaderMap) -> String {
    request_headers
        .get(headers::USER_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(headers::ANONYMOUS_USER)
        .to_string()
}

/// Service error rendered as `{"error": <user message>}`
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::SessionNotFound(_) | ServiceError::AssetNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Pipeline(e) => match e {
                PipelineError::BoxNotFound(_) => StatusCode::NOT_FOUND,
                PipelineError::AlreadyFinal(_)
                | PipelineError::IndexOutOfRange { .. }
                | PipelineError::InvalidGesture(_) => StatusCode::CONFLICT,
                PipelineError::AssetFetch(_) | PipelineError::Archive(_) | PipelineError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.user_message() });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
