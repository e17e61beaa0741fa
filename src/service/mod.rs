//! The [`TubeTools`] service facade
//!
//! Owns the configuration, the yt-dlp runner, the playlist publisher and the
//! optional summarizer. Every HTTP handler delegates to one method here.
//! The implementation is split by concern:
//! - [`media`] - metadata lookup and single audio/video downloads
//! - [`summarize`] - subtitle/description retrieval and summaries

mod media;
mod summarize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::progress::{EventChannel, ProgressPublisher};
use crate::summary::{OpenAiSummarizer, Summarizer};
use crate::types::CleanupReport;
use crate::utils::remove_stale_entries;
use crate::ytdlp::YtDlp;
use std::sync::Arc;

/// Service facade over yt-dlp, the playlist progress pipeline and summaries
///
/// Cheap to share behind an `Arc`; jobs started through it are independent.
pub struct TubeTools {
    config: Arc<Config>,
    ytdlp: Arc<YtDlp>,
    publisher: ProgressPublisher,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl TubeTools {
    /// Validate `config`, create the downloads directory and resolve tools
    ///
    /// A summarizer is configured when `config.summary.api_key` is set.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.downloads_dir())
            .await
            .map_err(|e| Error::Config {
                message: format!(
                    "cannot create downloads directory {}: {e}",
                    config.downloads_dir().display()
                ),
                key: Some("downloads_dir".into()),
            })?;

        let ytdlp = Arc::new(YtDlp::from_config(&config.tools));
        let publisher = ProgressPublisher::new(ytdlp.clone(), &config.download);
        let summarizer = OpenAiSummarizer::from_config(&config.summary)?
            .map(|s| Arc::new(s) as Arc<dyn Summarizer>);

        tracing::info!(
            downloads_dir = ?config.downloads_dir(),
            ytdlp = ?ytdlp.binary_path(),
            ffmpeg = ?ytdlp.ffmpeg_path(),
            summarizer = summarizer.as_ref().map(|s| s.name()),
            "tubetools initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            ytdlp,
            publisher,
            summarizer,
        })
    }

    /// Replace the summarizer (or remove it with `None`)
    pub fn with_summarizer(mut self, summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared configuration handle
    pub fn config_arc(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// The yt-dlp runner
    pub fn ytdlp(&self) -> &YtDlp {
        &self.ytdlp
    }

    /// Whether `yt-dlp --version` succeeds
    pub async fn ytdlp_available(&self) -> bool {
        self.ytdlp.is_available().await
    }

    /// Start a playlist download and stream its progress
    ///
    /// See [`ProgressPublisher::start`]. Dropping the returned channel stops
    /// the download.
    pub async fn stream_playlist(&self, url: &str) -> Result<EventChannel> {
        self.publisher.start(url).await
    }

    /// Delete downloads directory entries older than the configured age
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        let deleted = remove_stale_entries(
            self.config.downloads_dir(),
            self.config.download.cleanup_max_age,
        )
        .await?;

        tracing::info!(deleted, "cleaned up stale downloads");

        Ok(CleanupReport {
            deleted,
            message: format!("{deleted} item(s) deleted"),
        })
    }
}
