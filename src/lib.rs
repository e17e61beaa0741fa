//! # tubetools
//!
//! Local HTTP service around `yt-dlp` and `ffmpeg`.
//!
//! The centerpiece is playlist download progress streaming: a playlist job
//! runs `yt-dlp` as a child process, turns its console output into typed
//! [`Event`]s and delivers them to the client while the download runs. When
//! the client goes away the job is cancelled and the child process killed.
//!
//! Around that it offers video metadata, single audio and video downloads,
//! summaries built from subtitles (optionally via an OpenAI-compatible API),
//! and cleanup of old downloads.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tubetools::{Config, Event, TubeTools};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tools = TubeTools::new(Config::default()).await?;
//!
//!     let mut events = tools
//!         .stream_playlist("https://www.youtube.com/playlist?list=PL123")
//!         .await?;
//!     while let Some(event) = events.recv().await {
//!         println!("{}: {:?}", event.kind(), event);
//!         if let Event::Complete { files, .. } = &event {
//!             println!("{} files", files.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Playlist progress streaming
pub mod progress;
/// Service facade over the tools
pub mod service;
/// Video summaries
pub mod summary;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;
/// yt-dlp invocation and output parsing
pub mod ytdlp;

#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use progress::{EventChannel, ProgressPublisher};
pub use service::TubeTools;
pub use summary::{OpenAiSummarizer, Summarizer};
pub use types::{
    CleanupReport, DownloadedFile, Event, FileEntry, JobId, SummaryResponse, VideoInfo,
};
pub use ytdlp::YtDlp;

/// Resolve when the process is asked to stop.
///
/// - **Unix:** SIGTERM or SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Meant as the shutdown future of [`api::start_api_server`].
pub async fn shutdown_signal() {
    wait_for_signal().await;
    tracing::info!("shutting down");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
