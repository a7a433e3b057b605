//! Stateless analyze endpoint

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use design2web_service::{AnalyzeRequest, AnalyzeResponse};

use super::{user_id, ApiResult, AppState};

pub async fn analyze_handler(
    State(service): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let user = user_id(&headers);
    log::debug!(
        "Analyze request from {}: prompt {} chars, image {}",
        user,
        request.prompt.chars().count(),
        request.is_design_analysis()
    );
    Ok(Json(service.analyze(&user, &request).await?))
}
