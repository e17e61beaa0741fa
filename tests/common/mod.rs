//! Common test utilities for tubetools integration tests

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;
use tubetools::{Config, Event, EventChannel, TubeTools};

pub const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLintegration";

/// Prelude that sets `$dir` to the directory of the `-o` template
pub const FIND_OUTPUT_DIR: &str = r#"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
dir=$(dirname "$out")
"#;

/// Write an executable `yt-dlp` stand-in into `dir`
///
/// Retries while the kernel still reports the fresh file as busy.
pub fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    let script = format!("#!/bin/sh\n[ \"$1\" = \"--probe\" ] && exit 0\n{FIND_OUTPUT_DIR}{body}");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..100 {
        match std::process::Command::new(&path).arg("--probe").status() {
            Ok(_) => return path,
            Err(e) if e.raw_os_error() == Some(libc::ETXTBSY) => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("fake yt-dlp not executable: {e}"),
        }
    }
    panic!("fake yt-dlp stayed busy");
}

/// Service rooted in `root` whose yt-dlp runs `body`
pub async fn tools_with_script(root: &Path, body: &str) -> TubeTools {
    let script = fake_ytdlp(root, body);
    let mut config = Config::default();
    config.download.downloads_dir = root.join("downloads");
    config.tools.ytdlp_path = Some(script);
    config.tools.ffmpeg_path = Some(PathBuf::from("/usr/bin/ffmpeg"));
    config.tools.search_path = false;
    TubeTools::new(config).await.unwrap()
}

/// Drain a job's events, failing if the stream does not close in time
pub async fn collect_events(mut channel: EventChannel) -> Vec<Event> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(15), async {
        while let Some(event) = channel.recv().await {
            events.push(event);
        }
    })
    .await
    .expect("job did not finish");
    events
}

/// Event names in order, for compact sequence assertions
pub fn kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind).collect()
}
