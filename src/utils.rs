//! Utility functions for URL inspection, access paths and download housekeeping

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Hosts accepted as YouTube when extracting a video id
const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

/// Parse a user supplied media URL
///
/// Only absolute `http`/`https` URLs are accepted; anything else is rejected
/// as [`Error::InvalidInput`] before a process is spawned.
pub fn parse_media_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid_input("URL is required"));
    }

    let url = Url::parse(raw)
        .map_err(|e| Error::invalid_input(format!("unparsable URL {raw:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::invalid_input(format!(
            "unsupported URL scheme {other:?}"
        ))),
    }
}

/// Extract the YouTube video id from a URL
///
/// Recognises `watch?v=`, `youtu.be/`, `/embed/` and `/shorts/` forms.
///
/// # Examples
///
/// ```
/// use tubetools::utils::extract_video_id;
///
/// assert_eq!(
///     extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
///     Some("dQw4w9WgXcQ".to_string())
/// );
/// assert_eq!(extract_video_id("https://example.com/video"), None);
/// ```
pub fn extract_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;

    let id = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else if YOUTUBE_HOSTS.contains(&host) {
        let mut segments = url.path_segments()?;
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") | Some("shorts") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

/// Extract the playlist identifier (`list=` query parameter) from a URL
///
/// # Examples
///
/// ```
/// use tubetools::utils::extract_playlist_id;
///
/// assert_eq!(
///     extract_playlist_id("https://www.youtube.com/playlist?list=PL123&si=x"),
///     Some("PL123".to_string())
/// );
/// assert_eq!(extract_playlist_id("https://www.youtube.com/watch?v=abc"), None);
/// ```
pub fn extract_playlist_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

/// Build the relative access path for a file under the downloads directory
///
/// Each path segment is percent-encoded.
///
/// ```
/// use tubetools::utils::download_url;
///
/// assert_eq!(
///     download_url(&["playlist-1", "01-My Song.mp3"]),
///     "/downloads/playlist-1/01-My%20Song.mp3"
/// );
/// ```
pub fn download_url(segments: &[&str]) -> String {
    let mut url = String::from("/downloads");
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

/// Truncate a string to at most `max_chars` characters (not bytes)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Remove files and directories in `dir` whose modification time is older
/// than `max_age`
///
/// Entries that cannot be inspected or removed are logged and skipped.
/// Returns the number of removed entries.
pub async fn remove_stale_entries(dir: &Path, max_age: Duration) -> Result<usize> {
    use tokio::fs;

    let max_age = chrono::Duration::from_std(max_age).map_err(|e| Error::Config {
        message: format!("cleanup age out of range: {e}"),
        key: Some("cleanup_max_age".into()),
    })?;
    let cutoff = Utc::now() - max_age;

    debug!(?dir, %cutoff, "removing stale download entries");

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut deleted = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(?path, error = %e, "failed to stat download entry");
                continue;
            }
        };

        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(time) => time.into(),
            Err(e) => {
                warn!(?path, error = %e, "modification time unavailable");
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        let removal = if metadata.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };

        match removal {
            Ok(()) => {
                debug!(?path, %modified, "removed stale entry");
                deleted += 1;
            }
            Err(e) => warn!(?path, error = %e, "failed to remove stale entry"),
        }
    }

    Ok(deleted)
}
