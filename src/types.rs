//! Core types for tubetools

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Unique identifier for a download job
///
/// Embedded in output paths (`playlist-<id>`, `<id>-<title>.<ext>`) so that
/// concurrent jobs never write into the same location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Create a fresh random JobId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A produced file and the relative URL it can be fetched from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileEntry {
    /// File name on disk
    pub name: String,
    /// Relative access path under `/downloads`
    pub download_url: String,
}

/// Event published on a playlist job's stream
///
/// Serialized as a single JSON object with a `type` discriminator, e.g.
/// `{"type":"file_progress","percent":45.2,"current":3,"total":12}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job accepted; always the first event
    Start,

    /// Playlist position changed
    Progress {
        /// 1-based index of the track being processed
        current: u32,
        /// Number of tracks in the playlist
        total: u32,
    },

    /// A new output file is about to be written
    Downloading {
        /// Title parsed from the destination file name
        title: String,
        /// Current playlist position
        current: u32,
        /// Playlist size
        total: u32,
    },

    /// Per-file download percentage, passed through as reported by the tool
    FileProgress {
        /// Percentage (not clamped)
        percent: f64,
        /// Current playlist position
        current: u32,
        /// Playlist size
        total: u32,
    },

    /// Audio extraction / post-processing started for the current track
    Converting {
        /// Current playlist position
        current: u32,
        /// Playlist size
        total: u32,
    },

    /// Tool exited successfully; terminal
    Complete {
        /// Audio files found in the job directory
        files: Vec<FileEntry>,
    },

    /// Job failed; terminal
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl Event {
    /// The `type` discriminator, also used as the SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Progress { .. } => "progress",
            Event::Downloading { .. } => "downloading",
            Event::FileProgress { .. } => "file_progress",
            Event::Converting { .. } => "converting",
            Event::Complete { .. } => "complete",
            Event::Error { .. } => "error",
        }
    }

    /// Whether the stream closes after this event
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Complete { .. } | Event::Error { .. })
    }
}

/// Phase of a playlist job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Accepted, no tool output seen yet
    #[default]
    Idle,
    /// Fetching media
    Downloading,
    /// Extracting audio / embedding metadata
    Converting,
    /// Finished successfully
    Complete,
    /// Finished with an error
    Failed,
}

/// Mutable progress state of one playlist job
///
/// Owned by a single publisher; the extractor reads it to fill in the
/// playlist position of events and [`JobState::apply`] folds every emitted
/// event back into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobState {
    /// 1-based index of the current track (0 before the first marker)
    pub current_track: u32,
    /// Playlist size (0 before the first marker)
    pub total_tracks: u32,
    /// Title of the file currently being written
    pub current_title: String,
    /// Current phase
    pub phase: JobPhase,
}

impl JobState {
    /// Fold an emitted event into the state
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Start => self.phase = JobPhase::Idle,
            Event::Progress { current, total } => {
                self.current_track = *current;
                self.total_tracks = *total;
                self.phase = JobPhase::Downloading;
            }
            Event::Downloading { title, .. } => {
                self.current_title.clone_from(title);
                self.phase = JobPhase::Downloading;
            }
            Event::FileProgress { .. } => self.phase = JobPhase::Downloading,
            Event::Converting { .. } => self.phase = JobPhase::Converting,
            Event::Complete { .. } => self.phase = JobPhase::Complete,
            Event::Error { .. } => self.phase = JobPhase::Failed,
        }
    }
}

/// Request body (or query string) carrying a single URL
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UrlRequest {
    /// YouTube video or playlist URL
    #[serde(default)]
    pub url: String,
}

/// Request body for video downloads
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoRequest {
    /// YouTube video URL
    #[serde(default)]
    pub url: String,
    /// "best" (default) or a maximum height such as "720" / "720p"
    #[serde(default = "default_quality")]
    pub quality: String,
}

fn default_quality() -> String {
    "best".into()
}

/// Video metadata returned by a lookup
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoInfo {
    /// Video title
    pub title: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Channel name
    pub channel: Option<String>,
    /// Description, truncated
    pub description: Option<String>,
}

/// Result of a single audio or video download
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadedFile {
    /// Always true; failures are reported as errors
    pub success: bool,
    /// File name on disk
    pub filename: String,
    /// Relative access path under `/downloads`
    pub download_url: String,
}

/// Result of a summary request
///
/// Exactly one of `summary` and `raw_content` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    /// Generated synopsis
    pub summary: Option<String>,
    /// Transcript or description, returned when no API key is configured
    pub raw_content: Option<String>,
    /// Explanation accompanying `raw_content`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of a downloads directory cleanup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CleanupReport {
    /// Number of removed files and directories
    pub deleted: usize,
    /// Human-readable summary
    pub message: String,
}
