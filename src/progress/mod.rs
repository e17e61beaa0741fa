//! Playlist progress streaming
//!
//! Raw stdout chunks from yt-dlp flow through three stages:
//!
//! 1. [`LineBuffer`] reassembles complete lines from arbitrary fragments.
//! 2. [`extract`] classifies each line into zero or one [`Event`].
//! 3. [`ProgressPublisher`] owns the child process and pushes every event to
//!    the job's [`EventChannel`] as soon as it is produced.
//!
//! Dropping the [`EventChannel`] terminates the job.
//!
//! [`Event`]: crate::types::Event

mod extractor;
mod line_buffer;
mod publisher;

pub use extractor::{extract, matching_rule, title_from_destination};
pub use line_buffer::LineBuffer;
pub use publisher::{EventChannel, ProgressPublisher};
