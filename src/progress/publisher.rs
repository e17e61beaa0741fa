//! Playlist job driver
//!
//! [`ProgressPublisher::start`] validates the request, creates the job
//! directory, queues `Start` and spawns yt-dlp. A driver task then owns the
//! child: it feeds stdout through [`LineBuffer`] and the extractor, publishes
//! each event as soon as it is produced, and ends the stream with exactly one
//! `Complete` or `Error` event.
//!
//! The returned [`EventChannel`] holds a drop guard of the job's
//! cancellation token. Dropping it (the HTTP client went away) cancels the
//! job: the driver kills the tool's process group, reaps it, and publishes
//! nothing further.

use super::{LineBuffer, extractor};
use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::types::{Event, FileEntry, JobId, JobState};
use crate::utils::{download_url, extract_playlist_id, parse_media_url};
use crate::ytdlp::{self, YtDlp, parser};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::ExitStatus;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, trace, warn};

/// Events buffered between the driver and a slow client
const EVENT_BUFFER: usize = 64;

/// Size of a single stdout read
const READ_CHUNK: usize = 8 * 1024;

/// Stderr lines kept for the failure message
const STDERR_TAIL_LINES: usize = 20;

/// How long to wait for stderr to reach EOF once the tool has exited
const STDERR_GRACE: Duration = Duration::from_secs(2);

/// Starts playlist jobs
///
/// Jobs share nothing mutable: each gets its own directory, child process,
/// state, and channel.
#[derive(Clone, Debug)]
pub struct ProgressPublisher {
    ytdlp: Arc<YtDlp>,
    downloads_dir: PathBuf,
    audio_format: String,
    audio_extensions: Vec<String>,
}

impl ProgressPublisher {
    /// Create a publisher writing jobs under `config.downloads_dir`
    pub fn new(ytdlp: Arc<YtDlp>, config: &DownloadConfig) -> Self {
        Self {
            ytdlp,
            downloads_dir: config.downloads_dir.clone(),
            audio_format: config.audio_format.clone(),
            audio_extensions: config.audio_extensions.clone(),
        }
    }

    /// Start a playlist download and return its event stream
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] when the URL is unusable or carries no
    ///   `list=` playlist identifier. Nothing is created or spawned.
    /// - [`Error::Io`] when the job directory cannot be created.
    ///
    /// Every later failure, including a tool that cannot be spawned, is
    /// reported in-band as a terminal `Error` event.
    pub async fn start(&self, url: &str) -> Result<EventChannel> {
        let url = parse_media_url(url)?;
        let playlist_id = extract_playlist_id(url.as_str()).ok_or_else(|| {
            Error::invalid_input("URL does not reference a playlist (missing list= parameter)")
        })?;

        let job_id = JobId::new();
        let dir_name = format!("playlist-{job_id}");
        let output_dir = self.downloads_dir.join(&dir_name);
        tokio::fs::create_dir_all(&output_dir).await?;

        let (sender, receiver) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();
        let channel = EventChannel {
            job_id,
            output_dir: output_dir.clone(),
            receiver,
            _cancel_on_drop: cancel.clone().drop_guard(),
        };

        // Fresh channel with spare capacity; cannot fail
        let _ = sender.try_send(Event::Start);

        info!(%job_id, %playlist_id, ?output_dir, "starting playlist job");

        let mut child = match self
            .ytdlp
            .spawn_playlist(url.as_str(), &self.audio_format, &output_dir)
        {
            Ok(child) => child,
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_dir(&output_dir).await {
                    debug!(%job_id, error = %rm, "could not remove unused job directory");
                }
                let _ = sender.try_send(Event::Error {
                    message: e.to_string(),
                });
                return Ok(channel);
            }
        };

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            ytdlp::terminate(&mut child).await;
            let _ = sender.try_send(Event::Error {
                message: "yt-dlp output was not captured".into(),
            });
            return Ok(channel);
        };

        let stderr_tail = tokio::spawn(drain_stderr(stderr, job_id));
        let driver = JobDriver {
            job_id,
            output_dir,
            dir_name,
            audio_extensions: self.audio_extensions.clone(),
            child,
            sender,
            cancel,
            state: JobState::default(),
        };
        tokio::spawn(driver.run(stdout, stderr_tail));

        Ok(channel)
    }
}

/// Receiving side of one playlist job
///
/// Yields events in production order and ends after the terminal event.
/// Dropping it cancels the job and terminates the tool.
#[derive(Debug)]
pub struct EventChannel {
    job_id: JobId,
    output_dir: PathBuf,
    receiver: mpsc::Receiver<Event>,
    _cancel_on_drop: DropGuard,
}

impl EventChannel {
    /// Identifier of the job feeding this channel
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Directory the job writes into
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Next event, or `None` once the job has finished
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

impl tokio_stream::Stream for EventChannel {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.receiver.poll_recv(cx)
    }
}

/// How the stdout phase of a job ended
enum Exit {
    Exited(ExitStatus),
    Cancelled,
    Failed(String),
}

/// Owns one job's child process, state, and sending half
struct JobDriver {
    job_id: JobId,
    output_dir: PathBuf,
    dir_name: String,
    audio_extensions: Vec<String>,
    child: Child,
    sender: mpsc::Sender<Event>,
    cancel: CancellationToken,
    state: JobState,
}

impl JobDriver {
    async fn run(mut self, stdout: ChildStdout, stderr_tail: JoinHandle<Vec<String>>) {
        let terminal = match self.follow(stdout).await {
            Exit::Cancelled => {
                ytdlp::terminate(&mut self.child).await;
                info!(job_id = %self.job_id, "playlist job cancelled, yt-dlp terminated");
                return;
            }
            Exit::Failed(message) => {
                ytdlp::terminate(&mut self.child).await;
                Event::Error { message }
            }
            Exit::Exited(status) if status.success() => self.completion().await,
            Exit::Exited(status) => {
                let tail = tokio::time::timeout(STDERR_GRACE, stderr_tail)
                    .await
                    .ok()
                    .and_then(|joined| joined.ok())
                    .unwrap_or_default();
                let message = parser::failure_message(tail.iter().map(String::as_str))
                    .unwrap_or_else(|| "no error output".into());
                Event::Error {
                    message: Error::ProcessFailure {
                        tool: "yt-dlp".into(),
                        code: status.code(),
                        message,
                    }
                    .to_string(),
                }
            }
        };

        match &terminal {
            Event::Complete { files } => {
                info!(job_id = %self.job_id, files = files.len(), "playlist job complete");
            }
            Event::Error { message } => {
                warn!(job_id = %self.job_id, %message, "playlist job failed");
            }
            _ => {}
        }

        self.publish(terminal).await;
    }

    /// Read stdout to EOF, then wait for the tool to exit
    async fn follow(&mut self, mut stdout: ChildStdout) -> Exit {
        let mut lines = LineBuffer::new();
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Exit::Cancelled,
                read = stdout.read(&mut chunk) => read,
            };

            let n = match read {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => return Exit::Failed(format!("failed to read yt-dlp output: {e}")),
            };

            for line in lines.push(&chunk[..n]) {
                trace!(job_id = %self.job_id, %line, "yt-dlp");
                if let Some(event) = extractor::extract(&line, &self.state)
                    && !self.publish(event).await
                {
                    return Exit::Cancelled;
                }
            }
        }
        lines.finish();

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Exit::Cancelled,
            status = self.child.wait() => match status {
                Ok(status) => Exit::Exited(status),
                Err(e) => Exit::Failed(format!("failed to wait for yt-dlp: {e}")),
            },
        }
    }

    /// Fold the event into the job state and send it
    ///
    /// Returns false when the client is gone.
    async fn publish(&mut self, event: Event) -> bool {
        self.state.apply(&event);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.sender.send(event) => sent.is_ok(),
        }
    }

    async fn completion(&self) -> Event {
        match collect_audio_files(&self.output_dir, &self.dir_name, &self.audio_extensions).await {
            Ok(files) => Event::Complete { files },
            Err(e) => Event::Error {
                message: format!("failed to list downloaded files: {e}"),
            },
        }
    }
}

/// Audio files directly inside `dir`, sorted by name, with access paths
/// under `/downloads/<dir_name>/`
async fn collect_audio_files(
    dir: &Path,
    dir_name: &str,
    extensions: &[String],
) -> Result<Vec<FileEntry>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_audio = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)));
        if is_audio {
            names.push(name);
        }
    }

    names.sort();
    Ok(names
        .into_iter()
        .map(|name| FileEntry {
            download_url: download_url(&[dir_name, &name]),
            name,
        })
        .collect())
}

/// Drain stderr so the tool never blocks on a full pipe; keep the tail
async fn drain_stderr(stderr: ChildStderr, job_id: JobId) -> Vec<String> {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    read_lines(stderr, |line| {
        debug!(%job_id, %line, "yt-dlp stderr");
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    })
    .await;
    tail.into()
}

async fn read_lines<R: AsyncRead + Unpin>(mut reader: R, mut on_line: impl FnMut(String)) {
    let mut lines = LineBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => lines.push(&chunk[..n]).into_iter().for_each(&mut on_line),
            Err(e) => {
                debug!(error = %e, "stderr read failed");
                break;
            }
        }
    }
    lines.finish();
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_collect_audio_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["02-B.mp3", "01-A.M4A", "cover.jpg", "03-C.webm.part", "04-D.opus"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp3")).unwrap();

        let extensions: Vec<String> = ["mp3", "m4a", "opus"].map(String::from).into();
        let files = collect_audio_files(dir.path(), "playlist-x", &extensions)
            .await
            .unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["01-A.M4A", "02-B.mp3", "04-D.opus"]);
        assert_eq!(files[1].download_url, "/downloads/playlist-x/02-B.mp3");
    }

    #[tokio::test]
    async fn test_read_lines_handles_invalid_utf8_and_tail() {
        let input: &[u8] = b"one\n\xff\xfetwo\nunterminated";
        let mut seen = Vec::new();
        read_lines(input, |line| seen.push(line)).await;
        assert_eq!(seen, vec!["one".to_string(), "\u{FFFD}\u{FFFD}two".to_string()]);
    }
}
