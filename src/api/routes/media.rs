//! Metadata and single download handlers.

use crate::api::AppState;
use crate::types::{UrlRequest, VideoRequest};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /api/info - Video metadata
#[utoipa::path(
    post,
    path = "/api/info",
    tag = "media",
    request_body = crate::types::UrlRequest,
    responses(
        (status = 200, description = "Video metadata", body = crate::types::VideoInfo),
        (status = 400, description = "Missing or invalid URL"),
        (status = 502, description = "yt-dlp failed"),
        (status = 504, description = "yt-dlp timed out")
    )
)]
pub async fn video_info(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Response {
    match state.tools.info(&request.url).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "metadata lookup failed");
            e.into_response()
        }
    }
}

/// POST /api/download/audio - Download a video's audio track
#[utoipa::path(
    post,
    path = "/api/download/audio",
    tag = "media",
    request_body = crate::types::UrlRequest,
    responses(
        (status = 200, description = "Downloaded file", body = crate::types::DownloadedFile),
        (status = 400, description = "Missing or invalid URL"),
        (status = 502, description = "yt-dlp failed"),
        (status = 504, description = "yt-dlp timed out")
    )
)]
pub async fn download_audio(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Response {
    match state.tools.download_audio(&request.url).await {
        Ok(file) => (StatusCode::OK, Json(file)).into_response(),
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "audio download failed");
            e.into_response()
        }
    }
}

/// POST /api/download/video - Download a video as mp4
#[utoipa::path(
    post,
    path = "/api/download/video",
    tag = "media",
    request_body = crate::types::VideoRequest,
    responses(
        (status = 200, description = "Downloaded file", body = crate::types::DownloadedFile),
        (status = 400, description = "Missing URL or unsupported quality"),
        (status = 502, description = "yt-dlp failed"),
        (status = 504, description = "yt-dlp timed out")
    )
)]
pub async fn download_video(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> Response {
    match state
        .tools
        .download_video(&request.url, &request.quality)
        .await
    {
        Ok(file) => (StatusCode::OK, Json(file)).into_response(),
        Err(e) => {
            tracing::warn!(url = %request.url, quality = %request.quality, error = %e, "video download failed");
            e.into_response()
        }
    }
}
