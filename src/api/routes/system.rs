//! System handlers: health, OpenAPI, cleanup.

use super::HealthResponse;
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        ytdlp_available: state.tools.ytdlp_available().await,
    })
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// POST /api/cleanup - Delete downloads older than the configured age
#[utoipa::path(
    post,
    path = "/api/cleanup",
    tag = "system",
    responses(
        (status = 200, description = "Cleanup report", body = crate::types::CleanupReport),
        (status = 500, description = "Downloads directory unreadable")
    )
)]
pub async fn cleanup(State(state): State<AppState>) -> Response {
    match state.tools.cleanup().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "cleanup failed");
            e.into_response()
        }
    }
}
