//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`media`] - Metadata lookup and single audio/video downloads
//! - [`playlist`] - Playlist download progress stream (SSE)
//! - [`summary`] - Video summaries
//! - [`system`] - Health, OpenAPI, cleanup

use serde::{Deserialize, Serialize};

mod media;
mod playlist;
mod summary;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use media::*;
pub use playlist::*;
pub use summary::*;
pub use system::*;

/// Response body for GET /health
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Whether `yt-dlp --version` succeeded
    pub ytdlp_available: bool,
}
