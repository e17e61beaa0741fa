//! Configuration types for tubetools

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Download behavior configuration (directories, formats, timeouts)
///
/// Used as a flattened sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root directory for every download (default: "./downloads")
    ///
    /// Playlist jobs write into `playlist-<job id>` sub-directories; single
    /// downloads are prefixed with their job id.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    /// Audio container requested from yt-dlp (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Extensions recognised as finished audio files when a playlist completes
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,

    /// Subtitle languages requested for summaries, in preference order
    #[serde(default = "default_subtitle_languages")]
    pub subtitle_languages: Vec<String>,

    /// Metadata lookup timeout (default: 30 seconds)
    #[serde(default = "default_info_timeout", with = "duration_serde")]
    pub info_timeout: Duration,

    /// Single audio download timeout (default: 5 minutes)
    #[serde(default = "default_audio_timeout", with = "duration_serde")]
    pub audio_timeout: Duration,

    /// Single video download timeout (default: 10 minutes)
    #[serde(default = "default_video_timeout", with = "duration_serde")]
    pub video_timeout: Duration,

    /// Subtitle fetch timeout used by summaries (default: 60 seconds)
    #[serde(default = "default_subtitle_timeout", with = "duration_serde")]
    pub subtitle_timeout: Duration,

    /// Maximum description length returned by metadata lookups (default: 500)
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,

    /// Entries in the downloads directory older than this are removed by
    /// cleanup (default: 24 hours)
    #[serde(default = "default_cleanup_max_age", with = "duration_serde")]
    pub cleanup_max_age: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            downloads_dir: default_downloads_dir(),
            audio_format: default_audio_format(),
            audio_extensions: default_audio_extensions(),
            subtitle_languages: default_subtitle_languages(),
            info_timeout: default_info_timeout(),
            audio_timeout: default_audio_timeout(),
            video_timeout: default_video_timeout(),
            subtitle_timeout: default_subtitle_timeout(),
            description_max_chars: default_description_max_chars(),
            cleanup_max_age: default_cleanup_max_age(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg)
///
/// Used as a flattened sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Summary generation settings (OpenAI-compatible chat completions)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// API key; without one, summaries return the raw transcript instead
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the API (default: "https://api.openai.com/v1")
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Chat model (default: "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion token budget (default: 1000)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Content sent to the model is truncated to this many characters (default: 15000)
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Language the summary is written in (default: "French")
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout for the API call (default: 120 seconds)
    #[serde(default = "default_api_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_api_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_input_chars: default_max_input_chars(),
            language: default_language(),
            request_timeout: default_api_timeout(),
        }
    }
}

/// Main configuration for TubeTools
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - directories, formats, timeouts
/// - [`tools`](ToolsConfig) - external binary paths
/// - [`summary`](SummaryConfig) - summary API settings
/// - [`server`](ServerIntegrationConfig) - HTTP API settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Summary API settings
    #[serde(default)]
    pub summary: SummaryConfig,

    /// API server settings
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Downloads directory
    pub fn downloads_dir(&self) -> &PathBuf {
        &self.download.downloads_dir
    }

    /// Reject settings that would make every operation fail
    pub fn validate(&self) -> Result<()> {
        if self.download.audio_format.trim().is_empty() {
            return Err(Error::Config {
                message: "audio format must not be empty".into(),
                key: Some("audio_format".into()),
            });
        }

        let timeouts = [
            ("info_timeout", self.download.info_timeout),
            ("audio_timeout", self.download.audio_timeout),
            ("video_timeout", self.download.video_timeout),
            ("subtitle_timeout", self.download.subtitle_timeout),
        ];
        for (key, value) in timeouts {
            if value.is_zero() {
                return Err(Error::Config {
                    message: format!("{key} must be greater than zero"),
                    key: Some(key.into()),
                });
            }
        }

        if self.summary.max_input_chars == 0 {
            return Err(Error::Config {
                message: "summary input limit must be greater than zero".into(),
                key: Some("summary.max_input_chars".into()),
            });
        }

        Ok(())
    }
}

/// Server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve the downloads directory under /downloads (default: true)
    #[serde(default = "default_true")]
    pub serve_downloads: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            serve_downloads: true,
        }
    }
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_audio_format() -> String {
    "mp3".into()
}

fn default_audio_extensions() -> Vec<String> {
    ["mp3", "m4a", "opus", "ogg", "flac", "wav", "aac"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_subtitle_languages() -> Vec<String> {
    vec!["fr".into(), "en".into()]
}

fn default_info_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_audio_timeout() -> Duration {
    Duration::from_secs(300) // 5 minutes
}

fn default_video_timeout() -> Duration {
    Duration::from_secs(600) // 10 minutes
}

fn default_subtitle_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_description_max_chars() -> usize {
    500
}

fn default_cleanup_max_age() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_max_input_chars() -> usize {
    15_000
}

fn default_language() -> String {
    "French".into()
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
