//! Shared test helpers: fake yt-dlp executables and test service instances.

use crate::TubeTools;
use crate::config::Config;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Argument that makes every fake tool exit immediately
const PROBE_ARG: &str = "--tubetools-probe";

/// Write an executable shell script standing in for yt-dlp.
///
/// The script is probed until it can be executed: another test thread
/// forking while the file is still open for writing makes `exec` fail with
/// ETXTBSY for a short while.
#[cfg(unix)]
pub(crate) fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    let script = format!("#!/bin/sh\n[ \"$1\" = \"{PROBE_ARG}\" ] && exit 0\n{body}");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..100 {
        match std::process::Command::new(&path).arg(PROBE_ARG).status() {
            Ok(_) => return path,
            Err(e) if e.raw_os_error() == Some(libc::ETXTBSY) => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("fake tool not executable: {e}"),
        }
    }
    panic!("fake tool stayed busy");
}

/// Config rooted in `root` that uses `ytdlp` and never searches `PATH`.
pub(crate) fn test_config(root: &Path, ytdlp: &Path) -> Config {
    let mut config = Config::default();
    config.download.downloads_dir = root.join("downloads");
    config.tools.ytdlp_path = Some(ytdlp.to_path_buf());
    config.tools.ffmpeg_path = Some(PathBuf::from("/usr/bin/ffmpeg"));
    config.tools.search_path = false;
    config.download.info_timeout = Duration::from_secs(5);
    config.download.audio_timeout = Duration::from_secs(5);
    config.download.video_timeout = Duration::from_secs(5);
    config.download.subtitle_timeout = Duration::from_secs(5);
    config
}

/// Service instance over [`test_config`] without a summarizer.
pub(crate) async fn create_test_tools(root: &Path, ytdlp: &Path) -> TubeTools {
    TubeTools::new(test_config(root, ytdlp)).await.unwrap()
}
