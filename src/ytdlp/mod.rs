//! yt-dlp invocation
//!
//! [`YtDlp`] locates the executable (and the ffmpeg it hands to yt-dlp),
//! builds argument vectors via [`args`], and runs single-shot commands under
//! a wall-clock timeout. Output of those commands is interpreted by
//! [`parser`]. The long-running playlist download is only spawned here; the
//! streaming side lives in [`crate::progress`].

pub mod args;
mod cli;
pub mod parser;

pub use cli::YtDlp;
pub(crate) use cli::terminate;
