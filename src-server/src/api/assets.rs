//! Uploaded asset download

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use design2web_service::ServiceError;

use super::{ApiResult, AppState};
use crate::constants::headers::ASSET_CSP;

pub async fn asset_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let asset = service
        .assets()
        .get(&id)
        .ok_or_else(|| ServiceError::AssetNotFound(id.clone()))?;
    Ok((
        [
            (header::CONTENT_TYPE, asset.mime_type.clone()),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (header::CONTENT_SECURITY_POLICY, ASSET_CSP.to_string()),
        ],
        asset.bytes.clone(),
    )
        .into_response())
}
