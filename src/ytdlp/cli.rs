//! Runner for the external yt-dlp binary

use super::{args, parser};
use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use crate::types::VideoInfo;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

const TOOL: &str = "yt-dlp";

/// Budget for `yt-dlp --version`
const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Fallback locations used when neither the configuration nor `PATH` names
/// an executable
#[cfg(target_os = "macos")]
const DEFAULT_YTDLP: &str = "/Library/Frameworks/Python.framework/Versions/3.12/bin/yt-dlp";
#[cfg(not(target_os = "macos"))]
const DEFAULT_YTDLP: &str = "/usr/local/bin/yt-dlp";
const DEFAULT_FFMPEG: &str = "/usr/bin/ffmpeg";

/// Handle to the yt-dlp executable and the ffmpeg it should use
///
/// Single-shot operations run under a wall-clock timeout; when it elapses the
/// child's process group is killed, ffmpeg included. The
/// streaming playlist invocation is only spawned here and driven by
/// [`crate::progress::ProgressPublisher`].
///
/// # Examples
///
/// ```no_run
/// use tubetools::ytdlp::YtDlp;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ytdlp = YtDlp::new("/usr/local/bin/yt-dlp", "/usr/bin/ffmpeg");
/// let info = ytdlp
///     .info("https://youtu.be/dQw4w9WgXcQ", Duration::from_secs(30), 500)
///     .await?;
/// println!("{:?}", info.title);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct YtDlp {
    binary_path: PathBuf,
    ffmpeg_path: PathBuf,
}

impl YtDlp {
    /// Create a runner with explicit executable paths
    pub fn new(binary_path: impl Into<PathBuf>, ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Resolve both executables from configuration
    ///
    /// Order: configured path, then `PATH` lookup via `which` (when
    /// `search_path` is enabled), then the platform default location.
    pub fn from_config(tools: &ToolsConfig) -> Self {
        let binary_path = resolve(tools.ytdlp_path.as_ref(), "yt-dlp", tools.search_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP));
        let ffmpeg_path = resolve(tools.ffmpeg_path.as_ref(), "ffmpeg", tools.search_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FFMPEG));

        debug!(?binary_path, ?ffmpeg_path, "resolved media tools");
        Self::new(binary_path, ffmpeg_path)
    }

    /// Path of the yt-dlp executable
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Path handed to yt-dlp as `--ffmpeg-location`
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Version string reported by `yt-dlp --version`
    pub async fn version(&self) -> Result<String> {
        let output = self
            .run(vec!["--version".into()], VERSION_TIMEOUT)
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Whether yt-dlp can be invoked at all
    pub async fn is_available(&self) -> bool {
        match self.version().await {
            Ok(version) => {
                debug!(%version, "yt-dlp available");
                true
            }
            Err(e) => {
                debug!(error = %e, "yt-dlp unavailable");
                false
            }
        }
    }

    /// Metadata lookup without downloading
    pub async fn info(
        &self,
        url: &str,
        timeout: Duration,
        description_max_chars: usize,
    ) -> Result<VideoInfo> {
        let output = self.run(args::info(url), timeout).await?;
        parser::parse_info(&output.stdout, description_max_chars)
    }

    /// Download the audio track of a single video to `template`
    pub async fn download_audio(
        &self,
        url: &str,
        audio_format: &str,
        template: &Path,
        timeout: Duration,
    ) -> Result<()> {
        self.run(
            args::audio(&self.ffmpeg_path, audio_format, template, url),
            timeout,
        )
        .await
        .map(drop)
    }

    /// Download a single video as mp4 using a yt-dlp format selector
    pub async fn download_video(
        &self,
        url: &str,
        format: &str,
        template: &Path,
        timeout: Duration,
    ) -> Result<()> {
        self.run(args::video(&self.ffmpeg_path, format, template, url), timeout)
            .await
            .map(drop)
    }

    /// Write automatic subtitles next to `template` without downloading media
    pub async fn fetch_subtitles(
        &self,
        url: &str,
        languages: &[String],
        template: &Path,
        timeout: Duration,
    ) -> Result<()> {
        self.run(args::subtitles(languages, template, url), timeout)
            .await
            .map(drop)
    }

    /// Spawn the streaming playlist download into `output_dir`
    ///
    /// stdout and stderr are piped and the child is killed when its handle is
    /// dropped. On unix the child leads its own process group so that
    /// [`terminate`] also reaches the ffmpeg processes it starts.
    pub fn spawn_playlist(&self, url: &str, audio_format: &str, output_dir: &Path) -> Result<Child> {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args::playlist(&self.ffmpeg_path, audio_format, output_dir, url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        command.spawn().map_err(|e| self.spawn_error(e))
    }

    async fn run(&self, args: Vec<OsString>, timeout: Duration) -> Result<Output> {
        debug!(binary = ?self.binary_path, ?args, "running yt-dlp");

        let mut command = Command::new(&self.binary_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take())
        else {
            terminate(&mut child).await;
            return Err(Error::ProcessSpawn {
                tool: TOOL.into(),
                reason: "output was not captured".into(),
            });
        };

        let finished = tokio::time::timeout(timeout, async {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let (read_out, read_err, status) = tokio::join!(
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err),
                child.wait()
            );
            read_out?;
            read_err?;
            Ok::<_, std::io::Error>(Output {
                status: status?,
                stdout: out,
                stderr: err,
            })
        })
        .await;

        let output = match finished {
            Ok(output) => output?,
            Err(_) => {
                terminate(&mut child).await;
                let seconds = whole_seconds(timeout);
                warn!(?args, seconds, "yt-dlp timed out");
                return Err(Error::Timeout {
                    tool: TOOL.into(),
                    seconds,
                });
            }
        };

        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::ProcessFailure {
            tool: TOOL.into(),
            code: output.status.code(),
            message: parser::failure_message(stderr.lines())
                .unwrap_or_else(|| "no error output".into()),
        })
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        warn!(binary = ?self.binary_path, error = %e, "failed to start yt-dlp");
        Error::ProcessSpawn {
            tool: TOOL.into(),
            reason: format!("{}: {e}", self.binary_path.display()),
        }
    }
}

/// Budget in whole seconds, rounded up so sub-second budgets never read as 0
fn whole_seconds(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

fn resolve(configured: Option<&PathBuf>, name: &str, search_path: bool) -> Option<PathBuf> {
    configured
        .cloned()
        .or_else(|| search_path.then(|| which::which(name).ok()).flatten())
}

/// Kill a spawned child (and on unix its whole process group) and reap it
pub(crate) async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) {
        // SAFETY: killpg only sends a signal; every child is spawned as the
        // leader of its own group and a stale id at worst yields ESRCH
        let rc = unsafe { libc::killpg(pid, libc::SIGKILL) };
        if rc != 0 {
            debug!(pid, error = %std::io::Error::last_os_error(), "killpg failed");
        }
    }

    if let Err(e) = child.kill().await {
        debug!(error = %e, "child already gone");
    }
}
