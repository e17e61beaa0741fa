//! HTTP API server module
//!
//! Thin dispatcher over [`TubeTools`]: JSON endpoints for the single-shot
//! operations, a server-sent events endpoint for playlist progress, static
//! serving of the downloads directory, and an OpenAPI document.

use crate::{Result, TubeTools};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Media
/// - `POST /api/info` - Video metadata
/// - `POST /api/download/audio` - Single audio download
/// - `POST /api/download/video` - Single video download
///
/// ## Playlist
/// - `POST /api/download/playlist` - Playlist download, progress as SSE
/// - `GET /api/download/playlist?url=` - Same, for `EventSource`
///
/// ## Summary
/// - `POST /api/summary` - Summary or raw content
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `POST /api/cleanup` - Delete old downloads
/// - `GET /downloads/*` - Downloaded files (if enabled)
pub fn create_router(tools: Arc<TubeTools>) -> Router {
    build_router(AppState::new(tools, CancellationToken::new()))
}

fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Media
        .route("/api/info", post(routes::video_info))
        .route("/api/download/audio", post(routes::download_audio))
        .route("/api/download/video", post(routes::download_video))
        // Playlist
        .route(
            "/api/download/playlist",
            post(routes::stream_playlist).get(routes::stream_playlist_query),
        )
        // Summary
        .route("/api/summary", post(routes::summarize))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/api/cleanup", post(routes::cleanup))
        .with_state(state);

    let router = if config.server.api.serve_downloads {
        router.nest_service("/downloads", ServeDir::new(config.downloads_dir()))
    } else {
        router
    };

    let router = router.layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Serves until `shutdown` resolves, then stops accepting connections and
/// waits for in-flight requests. Open progress streams are closed at that
/// point, which cancels their downloads and kills yt-dlp.
///
/// # Example
///
/// ```no_run
/// use tubetools::{Config, TubeTools};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tools = Arc::new(TubeTools::new(Config::default()).await?);
/// tubetools::api::start_api_server(tools, tubetools::shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(tools: Arc<TubeTools>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = tools.config().server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let stop_streams = CancellationToken::new();
    let app = build_router(AppState::new(tools, stop_streams.clone()));

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            stop_streams.cancel();
        })
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(all(test, unix))]
mod tests;
