//! Classifies one line of yt-dlp output into at most one progress event
//!
//! The rules are an ordered table of independent matcher/constructor pairs.
//! The first rule whose pattern matches wins, so a line recognised by an
//! earlier rule is never reinterpreted by a later one, and adding a rule at
//! the end cannot change how existing lines are classified.

use crate::types::{Event, JobState};
use regex::{Captures, Regex};
use std::sync::LazyLock;

type Build = fn(&Captures<'_>, &JobState) -> Option<Event>;

/// One classification rule
struct Rule {
    name: &'static str,
    pattern: Regex,
    build: Build,
}

#[allow(clippy::expect_used)] // literal patterns
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let rule = |name: &'static str, pattern: &str, build: Build| Rule {
        name,
        pattern: Regex::new(pattern).expect("valid progress pattern"),
        build,
    };

    vec![
        // "[download] Downloading item 3 of 12" (older releases say "video")
        rule(
            "playlist_position",
            r"(?i)\bdownloading (?:item|video) (\d+) of (\d+)\b",
            build_position,
        ),
        // "[download] Destination: /dir/03-Title.webm"
        rule(
            "destination",
            r"^\[download\]\s+Destination:\s+(.+?)\s*$",
            build_destination,
        ),
        // "[download]  45.2% of ~3.10MiB at 1.00MiB/s ETA 00:02"
        rule(
            "percentage",
            r"^\[download\]\s+(\d+(?:\.\d+)?)%",
            build_percentage,
        ),
        // "[ExtractAudio] Destination: /dir/03-Title.mp3"
        rule(
            "post_processing",
            r"^\[ExtractAudio\]|(?i:post-?process)",
            build_converting,
        ),
    ]
});

/// Classify a single complete line of tool output
///
/// Positions (`current`/`total`) in the produced event come from `state`,
/// except for the playlist position rule which reports the numbers it read.
/// Returns `None` for lines no rule recognises.
///
/// # Examples
///
/// ```
/// use tubetools::progress::extract;
/// use tubetools::types::{Event, JobState};
///
/// let state = JobState::default();
/// assert_eq!(
///     extract("Downloading item 3 of 12", &state),
///     Some(Event::Progress { current: 3, total: 12 })
/// );
/// assert_eq!(extract("[youtube] abc: Downloading webpage", &state), None);
/// ```
pub fn extract(line: &str, state: &JobState) -> Option<Event> {
    classify(line).and_then(|(rule, caps)| (rule.build)(&caps, state))
}

/// Name of the rule that claims `line`, if any
pub fn matching_rule(line: &str) -> Option<&'static str> {
    classify(line).map(|(rule, _)| rule.name)
}

fn classify(line: &str) -> Option<(&'static Rule, Captures<'_>)> {
    RULES
        .iter()
        .find_map(|rule| rule.pattern.captures(line).map(|caps| (rule, caps)))
}

fn build_position(caps: &Captures<'_>, _state: &JobState) -> Option<Event> {
    let current = caps[1].parse().ok()?;
    let total = caps[2].parse().ok()?;
    Some(Event::Progress { current, total })
}

fn build_destination(caps: &Captures<'_>, state: &JobState) -> Option<Event> {
    Some(Event::Downloading {
        title: title_from_destination(&caps[1]),
        current: state.current_track,
        total: state.total_tracks,
    })
}

fn build_percentage(caps: &Captures<'_>, state: &JobState) -> Option<Event> {
    let percent = caps[1].parse().ok()?;
    Some(Event::FileProgress {
        percent,
        current: state.current_track,
        total: state.total_tracks,
    })
}

fn build_converting(_caps: &Captures<'_>, state: &JobState) -> Option<Event> {
    Some(Event::Converting {
        current: state.current_track,
        total: state.total_tracks,
    })
}

/// File name without its directory and without its last extension
///
/// Both `/` and `\` separate directories since the tool may run on either
/// platform. Only one extension is removed: `a.b.mp3` becomes `a.b`.
pub fn title_from_destination(path: &str) -> String {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(current: u32, total: u32) -> JobState {
        JobState {
            current_track: current,
            total_tracks: total,
            ..JobState::default()
        }
    }

    #[test]
    fn playlist_position_line() {
        let state = JobState::default();
        assert_eq!(
            extract("Downloading item 3 of 12", &state),
            Some(Event::Progress {
                current: 3,
                total: 12
            })
        );
        assert_eq!(
            extract("[download] Downloading item 1 of 40", &state),
            Some(Event::Progress {
                current: 1,
                total: 40
            })
        );
        assert_eq!(
            extract("[download] DOWNLOADING VIDEO 7 of 9", &state),
            Some(Event::Progress {
                current: 7,
                total: 9
            })
        );
    }

    #[test]
    fn destination_line_strips_directory_and_extension_once() {
        let state = positioned(3, 12);
        assert_eq!(
            extract("[download] Destination: /x/03-Some Title.mp3", &state),
            Some(Event::Downloading {
                title: "03-Some Title".into(),
                current: 3,
                total: 12
            })
        );
        assert_eq!(title_from_destination("/x/03-Live.at.Wembley.webm"), "03-Live.at.Wembley");
        assert_eq!(title_from_destination(r"C:\music\01-Song.m4a"), "01-Song");
        assert_eq!(title_from_destination("no_extension"), "no_extension");
        assert_eq!(title_from_destination("/x/.hidden"), ".hidden");
    }

    #[test]
    fn percentage_line_uses_current_position() {
        let state = positioned(2, 5);
        assert_eq!(
            extract(
                "[download]  45.2% of ~3.10MiB at  1.00MiB/s ETA 00:02",
                &state
            ),
            Some(Event::FileProgress {
                percent: 45.2,
                current: 2,
                total: 5
            })
        );
        assert_eq!(
            extract("[download] 100% of 3.10MiB in 00:00:03", &state),
            Some(Event::FileProgress {
                percent: 100.0,
                current: 2,
                total: 5
            })
        );
    }

    #[test]
    fn percentage_is_passed_through_unclamped() {
        let state = JobState::default();
        assert_eq!(
            extract("[download] 250.5%", &state),
            Some(Event::FileProgress {
                percent: 250.5,
                current: 0,
                total: 0
            })
        );
    }

    #[test]
    fn percentage_outside_progress_lines_is_ignored() {
        let state = JobState::default();
        assert_eq!(extract("[youtube] Video is 45.2% sponsored", &state), None);
        assert_eq!(extract("45.2%", &state), None);
    }

    #[test]
    fn post_processing_lines() {
        let state = positioned(4, 4);
        let expected = Some(Event::Converting {
            current: 4,
            total: 4,
        });
        assert_eq!(
            extract("[ExtractAudio] Destination: /x/04-Song.mp3", &state),
            expected
        );
        assert_eq!(extract("Post-processing the file", &state), expected);
        assert_eq!(extract("[ffmpeg] postprocessing started", &state), expected);
    }

    #[test]
    fn earlier_rule_wins_over_later_one() {
        let state = JobState::default();
        // Matches both the position rule and the post-processing rule
        let line = "Downloading item 2 of 3 before post-processing";
        assert_eq!(matching_rule(line), Some("playlist_position"));
        assert_eq!(
            extract(line, &state),
            Some(Event::Progress {
                current: 2,
                total: 3
            })
        );

        // Destination lines never count as percentage lines
        assert_eq!(
            matching_rule("[download] Destination: /x/50% Off.mp3"),
            Some("destination")
        );
    }

    #[test]
    fn unrelated_lines_produce_nothing() {
        let state = positioned(1, 2);
        let lines = [
            "",
            "[youtube:tab] Extracting URL: https://www.youtube.com/playlist?list=PL1",
            "[youtube] abc: Downloading webpage",
            "[info] abc: Downloading 1 format(s): 251",
            "[EmbedThumbnail] ffmpeg: Adding thumbnail to \"x.mp3\"",
            "[Metadata] Adding metadata to \"x.mp3\"",
            "[download] Finished downloading playlist: Mix",
            "WARNING: unable to extract uploader id",
        ];
        for line in lines {
            assert_eq!(extract(line, &state), None, "line {line:?}");
            assert_eq!(matching_rule(line), None, "line {line:?}");
        }
    }

    #[test]
    fn oversized_position_numbers_are_ignored() {
        let state = JobState::default();
        assert_eq!(
            extract("Downloading item 99999999999 of 99999999999", &state),
            None
        );
    }
}
