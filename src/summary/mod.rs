//! Video summaries
//!
//! Content comes from automatic subtitles (cleaned of cue timings and markup)
//! or, failing that, from the video description. A [`Summarizer`] turns it
//! into a synopsis; [`OpenAiSummarizer`] is the chat-completions backed one.

mod openai;

pub use openai::OpenAiSummarizer;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Produces a synopsis from transcript or description text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `content`
    async fn summarize(&self, content: &str) -> Result<String>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

#[allow(clippy::expect_used)] // literal patterns
static VTT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*WEBVTT.*?\n\s*\n").expect("valid header pattern"));
#[allow(clippy::expect_used)]
static CUE_TIMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{2}:\d{2}:\d{2}[.,]\d{3} --> \d{2}:\d{2}:\d{2}[.,]\d{3}[^\n]*")
        .expect("valid timing pattern")
});
#[allow(clippy::expect_used)]
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));
#[allow(clippy::expect_used)]
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid blank pattern"));

/// Strip the WebVTT header, cue timings and inline tags from a subtitle file
///
/// ```
/// use tubetools::summary::clean_subtitles;
///
/// let vtt = "WEBVTT\nKind: captions\n\n00:00:01.000 --> 00:00:02.000 align:start\n<c>Hello</c> there\n";
/// assert_eq!(clean_subtitles(vtt), "Hello there");
/// ```
pub fn clean_subtitles(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let text = VTT_HEADER.replace(&text, "");
    let text = CUE_TIMING.replace_all(&text, "");
    let text = MARKUP.replace_all(&text, "");
    BLANK_RUNS.replace_all(&text, "\n\n").trim().to_string()
}

/// Subtitle file to read from a directory yt-dlp wrote into
///
/// Files for earlier entries of `languages` win (`subs.fr.vtt` before
/// `subs.en.vtt`); otherwise the first `.vtt`/`.srt` file by name.
pub async fn find_subtitle_file(dir: &Path, languages: &[String]) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_subtitle = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("vtt") || ext.eq_ignore_ascii_case("srt"));
        if is_subtitle {
            candidates.push(path);
        }
    }
    candidates.sort();

    let by_language = languages.iter().find_map(|lang| {
        candidates.iter().find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(&format!(".{lang}.")))
        })
    });

    Ok(by_language.or(candidates.first()).cloned())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_subtitles_full_file() {
        let vtt = "WEBVTT\r\nKind: captions\r\nLanguage: en\r\n\r\n\
00:00:00.000 --> 00:00:02.500 align:start position:0%\r\n\
Welcome<00:00:00.800><c> to</c><00:00:01.200><c> the</c> talk\r\n\r\n\r\n\r\n\
00:00:02.500 --> 00:00:05.000\r\n\
Second line\r\n";
        assert_eq!(clean_subtitles(vtt), "Welcome to the talk\n\nSecond line");
    }

    #[test]
    fn test_clean_subtitles_srt_timings() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nBonjour\n";
        assert_eq!(clean_subtitles(srt), "1\n\nBonjour");
    }

    #[test]
    fn test_clean_subtitles_empty() {
        assert_eq!(clean_subtitles("WEBVTT\n\n"), "");
        assert_eq!(clean_subtitles(""), "");
    }

    #[tokio::test]
    async fn test_find_subtitle_file_prefers_language_order() {
        let dir = TempDir::new().unwrap();
        for name in ["subs.en.vtt", "subs.fr.vtt", "subs.info.json"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let languages = vec!["fr".to_string(), "en".to_string()];

        let found = find_subtitle_file(dir.path(), &languages).await.unwrap();
        assert_eq!(found, Some(dir.path().join("subs.fr.vtt")));

        let found = find_subtitle_file(dir.path(), &["de".to_string()])
            .await
            .unwrap();
        assert_eq!(found, Some(dir.path().join("subs.en.vtt")));
    }

    #[tokio::test]
    async fn test_find_subtitle_file_none() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("subs.info.json"), "x").unwrap();
        assert_eq!(find_subtitle_file(dir.path(), &[]).await.unwrap(), None);
    }
}
