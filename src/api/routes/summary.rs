//! Summary handler.

use crate::api::AppState;
use crate::types::UrlRequest;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /api/summary - Summarize a video
///
/// Without a configured API key the subtitles (or description) are returned
/// as `raw_content`.
#[utoipa::path(
    post,
    path = "/api/summary",
    tag = "summary",
    request_body = crate::types::UrlRequest,
    responses(
        (status = 200, description = "Summary or raw content", body = crate::types::SummaryResponse),
        (status = 400, description = "Missing URL, or no subtitles and no description"),
        (status = 502, description = "Summary API failed")
    )
)]
pub async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Response {
    match state.tools.summarize(&request.url).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "summary failed");
            e.into_response()
        }
    }
}
