//! Metadata lookup and single-file downloads

use super::TubeTools;
use crate::error::{Error, Result};
use crate::types::{DownloadedFile, JobId, VideoInfo};
use crate::utils::{download_url, extract_video_id, parse_media_url};
use crate::ytdlp::args;
use std::path::{Path, PathBuf};

impl TubeTools {
    /// Look up title, duration, thumbnail, channel and description
    pub async fn info(&self, url: &str) -> Result<VideoInfo> {
        let url = parse_media_url(url)?;
        let download = &self.config.download;
        self.ytdlp
            .info(
                url.as_str(),
                download.info_timeout,
                download.description_max_chars,
            )
            .await
    }

    /// Download the audio track of one video in the configured format
    pub async fn download_audio(&self, url: &str) -> Result<DownloadedFile> {
        let url = parse_media_url(url)?;
        let download = &self.config.download;
        let (job_id, template) = self.job_template();
        tracing::info!(%job_id, video_id = ?extract_video_id(url.as_str()), "downloading audio");

        self.ytdlp
            .download_audio(
                url.as_str(),
                &download.audio_format,
                &template,
                download.audio_timeout,
            )
            .await?;

        self.produced_file(job_id, Some(&download.audio_format)).await
    }

    /// Download one video as mp4
    ///
    /// `quality` is `"best"` or a maximum height such as `"720"`.
    pub async fn download_video(&self, url: &str, quality: &str) -> Result<DownloadedFile> {
        let url = parse_media_url(url)?;
        let format = args::video_format(quality)?;
        let (job_id, template) = self.job_template();
        tracing::info!(%job_id, video_id = ?extract_video_id(url.as_str()), %format, "downloading video");

        self.ytdlp
            .download_video(
                url.as_str(),
                &format,
                &template,
                self.config.download.video_timeout,
            )
            .await?;

        self.produced_file(job_id, Some("mp4")).await
    }

    /// `<downloads>/<job>-%(title)s.%(ext)s`
    fn job_template(&self) -> (JobId, PathBuf) {
        let job_id = JobId::new();
        let template = self
            .config
            .downloads_dir()
            .join(format!("{job_id}-%(title)s.%(ext)s"));
        (job_id, template)
    }

    async fn produced_file(
        &self,
        job_id: JobId,
        preferred_ext: Option<&str>,
    ) -> Result<DownloadedFile> {
        let filename = find_job_file(self.config.downloads_dir(), job_id, preferred_ext)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no output file for job {job_id}")))?;

        tracing::info!(%job_id, %filename, "download finished");

        Ok(DownloadedFile {
            success: true,
            download_url: download_url(&[&filename]),
            filename,
        })
    }
}

/// File in `dir` produced by `job_id`
///
/// Names start with the job id. When several exist (left-over intermediate
/// streams) one with `preferred_ext` wins, then the first by name.
async fn find_job_file(
    dir: &Path,
    job_id: JobId,
    preferred_ext: Option<&str>,
) -> Result<Option<String>> {
    let prefix = format!("{job_id}-");
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) && entry.file_type().await?.is_file() {
            names.push(name);
        }
    }
    names.sort();

    let preferred = preferred_ext.and_then(|ext| {
        names.iter().position(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
    });

    Ok(match preferred {
        Some(idx) => Some(names.swap_remove(idx)),
        None => names.into_iter().next(),
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_find_job_file_prefers_extension() {
        let dir = TempDir::new().unwrap();
        let job_id = JobId::new();
        let other = JobId::new();
        for name in [
            format!("{job_id}-Song.webm"),
            format!("{job_id}-Song.mp3"),
            format!("{other}-Other.mp3"),
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let found = find_job_file(dir.path(), job_id, Some("mp3")).await.unwrap();
        assert_eq!(found, Some(format!("{job_id}-Song.mp3")));

        let found = find_job_file(dir.path(), job_id, Some("flac")).await.unwrap();
        assert_eq!(found, Some(format!("{job_id}-Song.mp3")));

        let found = find_job_file(dir.path(), JobId::new(), None).await.unwrap();
        assert_eq!(found, None);
    }
}
