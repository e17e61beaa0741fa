//! Error types for tubetools
//!
//! This module provides the error handling used across the crate:
//! - A single domain error enum covering input validation, external tool
//!   execution, filesystem access and the summary API
//! - HTTP status code mapping for API integration
//! - Structured JSON error bodies with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for tubetools operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tubetools
///
/// Streaming jobs never surface these past the event channel: once a playlist
/// job has started, failures are converted into a terminal `error` event.
/// Single-shot operations return them directly and the API layer turns them
/// into a JSON error response.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unparsable URL / playlist identifier
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Neither subtitles nor a description could be obtained for a summary
    #[error("no content available: {0}")]
    NoContent(String),

    /// External executable missing or not invocable
    #[error("failed to start {tool}: {reason}")]
    ProcessSpawn {
        /// Name of the tool that could not be started (e.g. "yt-dlp")
        tool: String,
        /// Underlying reason reported by the OS
        reason: String,
    },

    /// External tool exited with a non-zero status
    #[error("{tool} failed{}: {message}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ProcessFailure {
        /// Name of the tool that failed
        tool: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Last meaningful stderr output, or a generic description
        message: String,
    },

    /// External tool did not finish within its wall-clock budget
    #[error("{tool} timed out after {seconds}s")]
    Timeout {
        /// Name of the tool that was killed
        tool: String,
        /// Budget that was exceeded, in seconds
        seconds: u64,
    },

    /// I/O error (output directory creation or scan, temp files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Summary API call failed or returned no usable content
    #[error("remote API error: {0}")]
    RemoteApi(String),

    /// Network error talking to a remote API
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error (tool JSON output, event encoding)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Produced file or resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "downloads_dir")
        key: Option<String>,
    },

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Whether this error maps to a 4xx status
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_input",
///     "message": "invalid input: URL is required"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "invalid_input", "timeout")
    ///
    /// Clients can use this for programmatic error handling.
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - rejected before any side effect
            Error::InvalidInput(_) => 400,
            Error::NoContent(_) => 400,
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - external tool or remote API misbehaved
            Error::ProcessFailure { .. } => 502,
            Error::RemoteApi(_) => 502,
            Error::Network(_) => 502,

            // 503 Service Unavailable - tool not installed
            Error::ProcessSpawn { .. } => 503,

            // 504 Gateway Timeout
            Error::Timeout { .. } => 504,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::NoContent(_) => "no_content",
            Error::ProcessSpawn { .. } => "process_spawn_error",
            Error::ProcessFailure { .. } => "process_failure",
            Error::Timeout { .. } => "timeout",
            Error::Io(_) => "io_error",
            Error::RemoteApi(_) => "remote_api_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotFound(_) => "not_found",
            Error::Config { .. } => "config_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::ProcessSpawn { tool, .. } => Some(serde_json::json!({
                "tool": tool,
            })),
            Error::ProcessFailure { tool, code, .. } => Some(serde_json::json!({
                "tool": tool,
                "exit_code": code,
            })),
            Error::Timeout { tool, seconds } => Some(serde_json::json!({
                "tool": tool,
                "timeout_seconds": seconds,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        let mut api_error = ApiError::new(code, message);
        api_error.error.details = details;
        api_error
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::InvalidInput("URL is required".into()),
                400,
                "invalid_input",
            ),
            (
                Error::NoContent("no subtitles or description".into()),
                400,
                "no_content",
            ),
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("downloads_dir".into()),
                },
                400,
                "config_error",
            ),
            (Error::NotFound("output file".into()), 404, "not_found"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (
                Error::ProcessFailure {
                    tool: "yt-dlp".into(),
                    code: Some(1),
                    message: "ERROR: Video unavailable".into(),
                },
                502,
                "process_failure",
            ),
            (
                Error::RemoteApi("empty completion".into()),
                502,
                "remote_api_error",
            ),
            (
                Error::ProcessSpawn {
                    tool: "yt-dlp".into(),
                    reason: "No such file or directory".into(),
                },
                503,
                "process_spawn_error",
            ),
            (
                Error::Timeout {
                    tool: "yt-dlp".into(),
                    seconds: 30,
                },
                504,
                "timeout",
            ),
        ]
    }

    #[test]
    fn status_and_error_codes_match_table() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {error:?}");
            assert_eq!(error.error_code(), code, "code for {error:?}");
        }
    }

    #[test]
    fn serialization_error_maps_to_500() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "serialization_error");
    }

    #[test]
    fn process_failure_message_includes_exit_code() {
        let err = Error::ProcessFailure {
            tool: "yt-dlp".into(),
            code: Some(2),
            message: "ERROR: bad playlist".into(),
        };
        assert_eq!(
            err.to_string(),
            "yt-dlp failed with exit code 2: ERROR: bad playlist"
        );

        let killed = Error::ProcessFailure {
            tool: "yt-dlp".into(),
            code: None,
            message: "terminated by signal".into(),
        };
        assert_eq!(killed.to_string(), "yt-dlp failed: terminated by signal");
    }

    #[test]
    fn api_error_carries_tool_details() {
        let api_error: ApiError = Error::Timeout {
            tool: "yt-dlp".into(),
            seconds: 300,
        }
        .into();

        assert_eq!(api_error.error.code, "timeout");
        assert!(api_error.error.message.contains("300s"));
        let details = api_error.error.details.unwrap();
        assert_eq!(details["tool"], "yt-dlp");
        assert_eq!(details["timeout_seconds"], 300);
    }

    #[test]
    fn api_error_without_details_omits_field() {
        let api_error: ApiError = Error::invalid_input("URL is required").into();
        let json = serde_json::to_value(&api_error).unwrap();
        assert!(json["error"].get("details").is_none());
        assert_eq!(json["error"]["code"], "invalid_input");
    }

    #[test]
    fn client_errors_are_flagged() {
        assert!(Error::invalid_input("x").is_client_error());
        assert!(
            !Error::Timeout {
                tool: "yt-dlp".into(),
                seconds: 1
            }
            .is_client_error()
        );
    }
}
