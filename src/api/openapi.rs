//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the tubetools HTTP API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the tubetools HTTP API
///
/// Served as JSON at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tubetools HTTP API",
        description = "Local service wrapping yt-dlp and ffmpeg: metadata, audio/video downloads, live playlist progress and video summaries",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local server")
    ),
    paths(
        // Media
        crate::api::routes::video_info,
        crate::api::routes::download_audio,
        crate::api::routes::download_video,

        // Playlist
        crate::api::routes::stream_playlist,
        crate::api::routes::stream_playlist_query,

        // Summary
        crate::api::routes::summarize,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::cleanup,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::Event,
        crate::types::FileEntry,
        crate::types::JobPhase,
        crate::types::UrlRequest,
        crate::types::VideoRequest,
        crate::types::VideoInfo,
        crate::types::DownloadedFile,
        crate::types::SummaryResponse,
        crate::types::CleanupReport,

        // API response types from routes
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Metadata lookup and single audio/video downloads"),
        (name = "playlist", description = "Playlist audio download with live progress over server-sent events"),
        (name = "summary", description = "Video summaries from subtitles or description"),
        (name = "system", description = "Health check, OpenAPI spec, cleanup of old downloads"),
    ),
    modifiers(&VersionAddon)
)]
pub struct ApiDoc;

/// Stamps the crate version into the document info
struct VersionAddon;

impl utoipa::Modify for VersionAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}
