//! Parsers for yt-dlp command output

use crate::error::Result;
use crate::types::VideoInfo;
use crate::utils::truncate_chars;
use serde::Deserialize;

/// Subset of the `--dump-json` document we surface
#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    description: Option<String>,
}

/// Parse the JSON printed by `yt-dlp --dump-json`
///
/// The tool prints one document per line; only the first is used. The
/// channel falls back to the uploader name and the description is cut to
/// `description_max_chars` characters.
pub fn parse_info(stdout: &[u8], description_max_chars: usize) -> Result<VideoInfo> {
    let output = String::from_utf8_lossy(stdout);
    let document = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    let raw: RawInfo = serde_json::from_str(document)?;

    Ok(VideoInfo {
        title: raw.title,
        duration: raw.duration,
        thumbnail: raw.thumbnail,
        channel: raw.channel.or(raw.uploader),
        description: raw
            .description
            .map(|d| truncate_chars(&d, description_max_chars).to_string()),
    })
}

/// Pick the most useful line of stderr output for an error message
///
/// yt-dlp reports fatal problems on lines starting with `ERROR:`; the last
/// such line wins. Otherwise the last non-empty line is used.
pub fn failure_message<'a>(stderr_lines: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut last_error = None;
    let mut last_line = None;

    for line in stderr_lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("ERROR:") {
            last_error = Some(line);
        }
        last_line = Some(line);
    }

    last_error.or(last_line).map(str::to_string)
}
