//! Argument vectors for yt-dlp invocations

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::Path;

/// Format selector used when no height limit is requested
pub const BEST_MP4_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Output template for playlist entries inside a job directory
pub const PLAYLIST_TEMPLATE: &str = "%(playlist_index)s-%(title)s.%(ext)s";

/// Metadata field mappings applied to playlist downloads
///
/// The channel name becomes the artist tag and the playlist position becomes
/// the track number.
pub const PLAYLIST_METADATA_MAPPINGS: [&str; 2] = [
    "%(channel)s:%(artist)s",
    "%(playlist_index)s:%(track_number)s",
];

fn push_ffmpeg(args: &mut Vec<OsString>, ffmpeg: &Path) {
    args.push("--ffmpeg-location".into());
    args.push(ffmpeg.into());
}

fn push_audio_extraction(args: &mut Vec<OsString>, audio_format: &str) {
    args.extend(
        ["-x", "--audio-format", audio_format, "--audio-quality", "0"]
            .into_iter()
            .map(OsString::from),
    );
}

fn push_output_and_url(args: &mut Vec<OsString>, template: &Path, url: &str) {
    args.push("-o".into());
    args.push(template.into());
    args.push("--".into());
    args.push(url.into());
}

/// Streaming playlist download: audio only, best quality, thumbnail and
/// metadata embedded, one progress record per output line
pub fn playlist(ffmpeg: &Path, audio_format: &str, output_dir: &Path, url: &str) -> Vec<OsString> {
    let mut args = Vec::new();
    push_ffmpeg(&mut args, ffmpeg);
    push_audio_extraction(&mut args, audio_format);
    args.push("--embed-thumbnail".into());
    args.push("--embed-metadata".into());
    for mapping in PLAYLIST_METADATA_MAPPINGS {
        args.push("--parse-metadata".into());
        args.push(mapping.into());
    }
    args.push("--yes-playlist".into());
    args.push("--newline".into());
    push_output_and_url(&mut args, &output_dir.join(PLAYLIST_TEMPLATE), url);
    args
}

/// Single audio download
pub fn audio(ffmpeg: &Path, audio_format: &str, template: &Path, url: &str) -> Vec<OsString> {
    let mut args = Vec::new();
    push_ffmpeg(&mut args, ffmpeg);
    push_audio_extraction(&mut args, audio_format);
    args.push("--no-playlist".into());
    push_output_and_url(&mut args, template, url);
    args
}

/// Single video download merged into mp4
pub fn video(ffmpeg: &Path, format: &str, template: &Path, url: &str) -> Vec<OsString> {
    let mut args = Vec::new();
    push_ffmpeg(&mut args, ffmpeg);
    args.extend(
        ["-f", format, "--merge-output-format", "mp4", "--no-playlist"]
            .into_iter()
            .map(OsString::from),
    );
    push_output_and_url(&mut args, template, url);
    args
}

/// Metadata lookup without downloading
pub fn info(url: &str) -> Vec<OsString> {
    ["--dump-json", "--no-download", "--no-playlist", "--", url]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// Automatic subtitles only, written next to `template`
pub fn subtitles(languages: &[String], template: &Path, url: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--write-auto-sub".into(),
        "--sub-lang".into(),
        languages.join(",").into(),
        "--skip-download".into(),
        "--no-playlist".into(),
    ];
    push_output_and_url(&mut args, template, url);
    args
}

/// Translate a requested quality into a yt-dlp format selector
///
/// `"best"` (or empty) selects the best mp4/m4a pair; a height such as
/// `"720"` or `"720p"` caps the video stream.
pub fn video_format(quality: &str) -> Result<String> {
    let quality = quality.trim();
    if quality.is_empty() || quality.eq_ignore_ascii_case("best") {
        return Ok(BEST_MP4_FORMAT.to_string());
    }

    let digits = quality.strip_suffix(['p', 'P']).unwrap_or(quality);
    let height: u32 = digits
        .parse()
        .ok()
        .filter(|h| *h > 0)
        .ok_or_else(|| Error::invalid_input(format!("unsupported quality {quality:?}")))?;

    Ok(format!(
        "bestvideo[height<={height}][ext=mp4]+bestaudio[ext=m4a]/best[height<={height}][ext=mp4]/best[height<={height}]"
    ))
}
