//! Summary generation

use super::TubeTools;
use crate::error::{Error, Result};
use crate::summary::{clean_subtitles, find_subtitle_file};
use crate::types::{JobId, SummaryResponse};
use crate::utils::parse_media_url;
use std::path::Path;

/// Returned alongside raw content when no summarizer is configured
const NO_SUMMARIZER_MESSAGE: &str =
    "No summary API key configured; returning the raw video content instead";

impl TubeTools {
    /// Summarize a video from its subtitles, or its description when it has
    /// none
    ///
    /// Failures to fetch either source are logged and treated as empty
    /// content. Without a summarizer the content is returned unprocessed in
    /// `raw_content`.
    ///
    /// # Errors
    ///
    /// [`Error::NoContent`] when neither source yields any text, and any
    /// summarizer error.
    pub async fn summarize(&self, url: &str) -> Result<SummaryResponse> {
        let url = parse_media_url(url)?;

        let (subtitles, description) =
            tokio::join!(self.subtitle_text(url.as_str()), self.description(url.as_str()));

        let content = if subtitles.trim().is_empty() {
            description
        } else {
            subtitles
        };
        if content.trim().is_empty() {
            return Err(Error::NoContent(
                "the video has neither subtitles nor a description".into(),
            ));
        }

        let Some(summarizer) = &self.summarizer else {
            return Ok(SummaryResponse {
                summary: None,
                raw_content: Some(content),
                message: Some(NO_SUMMARIZER_MESSAGE.into()),
            });
        };

        let summary = summarizer.summarize(&content).await?;
        Ok(SummaryResponse {
            summary: Some(summary),
            raw_content: None,
            message: None,
        })
    }

    /// Cleaned automatic subtitles, or an empty string
    ///
    /// yt-dlp writes into a scratch directory under the downloads directory
    /// which is removed on every path.
    async fn subtitle_text(&self, url: &str) -> String {
        let scratch = self
            .config
            .downloads_dir()
            .join(format!("temp-{}", JobId::new()));

        let text = match self.read_subtitles(url, &scratch).await {
            Ok(text) => text,
            Err(e) => {
                tracing::info!(%url, error = %e, "no subtitles available");
                String::new()
            }
        };

        if let Err(e) = tokio::fs::remove_dir_all(&scratch).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = ?scratch, error = %e, "failed to remove subtitle scratch directory");
        }

        text
    }

    async fn read_subtitles(&self, url: &str, scratch: &Path) -> Result<String> {
        let download = &self.config.download;
        tokio::fs::create_dir_all(scratch).await?;

        self.ytdlp
            .fetch_subtitles(
                url,
                &download.subtitle_languages,
                &scratch.join("subs"),
                download.subtitle_timeout,
            )
            .await?;

        let Some(file) = find_subtitle_file(scratch, &download.subtitle_languages).await? else {
            return Ok(String::new());
        };
        let raw = tokio::fs::read(&file).await?;
        Ok(clean_subtitles(&String::from_utf8_lossy(&raw)))
    }

    /// Full video description, or an empty string
    async fn description(&self, url: &str) -> String {
        match self
            .ytdlp
            .info(url, self.config.download.info_timeout, usize::MAX)
            .await
        {
            Ok(info) => info.description.unwrap_or_default(),
            Err(e) => {
                tracing::info!(%url, error = %e, "description unavailable");
                String::new()
            }
        }
    }
}
