//! Editing session routes

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use design2web_pipeline::constants::bundle::ARCHIVE_NAME;
use design2web_pipeline::{BoundingBox, Direction, Point, PreviewDocument};
use design2web_service::{QuotaStatus, SessionView};
use serde::{Deserialize, Serialize};

use super::{user_id, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignBody {
    pub image_base64: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsBody {
    pub no_images: bool,
    #[serde(default)]
    pub custom_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ZoomBody {
    pub zoom: f64,
}

/// Pointer movement in screen space
#[derive(Debug, Deserialize)]
pub struct GestureBody {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    /// `None` when the drawn box was too small to keep
    #[serde(rename = "box")]
    pub bbox: Option<BoundingBox>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBody {
    pub filename: String,
    pub mime_type: String,
    /// Base64 file content, optionally as a data URL
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyBody {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateBody {
    pub direction: Direction,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// Return the iframe host page instead of the bare document
    #[serde(default)]
    pub host: bool,
}

// ─── SESSION ────────────────────────────────────────────────────────

pub async fn quota_handler(State(service): State<AppState>, headers: HeaderMap) -> Json<QuotaStatus> {
    Json(service.quota_status(&user_id(&headers)).await)
}

pub async fn create_handler(
    State(service): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<SessionView>) {
    let view = service.create_session(&user_id(&headers)).await;
    (StatusCode::CREATED, Json(view))
}

pub async fn show_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.session_view(&id).await?))
}

pub async fn close_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    service.close_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn design_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DesignBody>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.set_design(&id, &body.image_base64).await?))
}

pub async fn options_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<OptionsBody>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(
        service
            .set_options(&id, body.no_images, &body.custom_prompt)
            .await?,
    ))
}

pub async fn reset_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.start_again(&id).await?))
}

// ─── CANVAS ─────────────────────────────────────────────────────────

pub async fn zoom_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ZoomBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let zoom = service.set_zoom(&id, body.zoom).await?;
    Ok(Json(serde_json::json!({ "zoom": zoom })))
}

pub async fn draw_box_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<GestureBody>,
) -> ApiResult<Json<DrawResponse>> {
    let bbox = service.draw_box(&id, body.from, body.to).await?;
    Ok(Json(DrawResponse { bbox }))
}

pub async fn move_box_handler(
    State(service): State<AppState>,
    Path((id, box_id)): Path<(String, String)>,
    Json(body): Json<GestureBody>,
) -> ApiResult<Json<BoundingBox>> {
    Ok(Json(
        service.move_box(&id, &box_id, body.from, body.to).await?,
    ))
}

pub async fn delete_box_handler(
    State(service): State<AppState>,
    Path((id, box_id)): Path<(String, String)>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.delete_box(&id, &box_id).await?))
}

pub async fn attach_asset_handler(
    State(service): State<AppState>,
    Path((id, box_id)): Path<(String, String)>,
    Json(body): Json<AssetBody>,
) -> ApiResult<Json<BoundingBox>> {
    let bbox = service
        .attach_asset(&id, &box_id, &body.filename, &body.mime_type, &body.data)
        .await?;
    Ok(Json(bbox))
}

// ─── COMPLETIONS & HISTORY ──────────────────────────────────────────

pub async fn generate_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.generate(&id).await?))
}

pub async fn modify_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ModifyBody>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.modify(&id, &body.prompt).await?))
}

pub async fn navigate_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NavigateBody>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.navigate(&id, body.direction).await?))
}

pub async fn finalize_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(service.finalize(&id).await?))
}

// ─── OUTPUT ─────────────────────────────────────────────────────────

pub async fn preview_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Response> {
    let preview = service.preview(&id).await?;
    let page = if query.host {
        preview.iframe_host()
    } else {
        preview.document
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_SECURITY_POLICY,
                PreviewDocument::content_security_policy(),
            ),
        ],
        page,
    )
        .into_response())
}

pub async fn export_handler(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let bytes = service.export(&id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}
