//! File naming contract for captured messages.
//!
//! A message on topic `sensors/room1/temp` captured at
//! `2024-03-01T10:15:30.042Z` is stored as
//! `<root>/sensors/room1/temp/2024-03-01T10:15:30.042Z_4821.json`.
//! Each topic level becomes a nested directory; the base name is the
//! ISO-8601 arrival time followed by a random disambiguator.

use std::ops::RangeInclusive;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use regex::Regex;

use crate::store::error::StoreError;

/// Range the random file name suffix is drawn from.
pub const DISAMBIGUATOR_RANGE: RangeInclusive<u16> = 1000..=9999;

const TOPIC_SEPARATOR: char = '/';
const FILE_EXTENSION: &str = "json";

fn file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.+)/([^/]+)_(\d+)\.json$").expect("store path pattern is valid")
    })
}

/// Encode a topic and arrival time into a storage path under `root`.
///
/// The disambiguator is drawn fresh for every call, so two messages on the
/// same topic within the same millisecond almost never share a file name.
/// A collision is not detected here; the later write wins.
pub fn encode(root: &Path, topic: &str, timestamp: DateTime<Utc>) -> Result<PathBuf, StoreError> {
    let disambiguator = rand::rng().random_range(DISAMBIGUATOR_RANGE);
    encode_with_disambiguator(root, topic, timestamp, disambiguator)
}

/// Same as [`encode`] with a caller-chosen disambiguator.
pub fn encode_with_disambiguator(
    root: &Path,
    topic: &str,
    timestamp: DateTime<Utc>,
    disambiguator: u16,
) -> Result<PathBuf, StoreError> {
    let segments = topic_segments(topic)?;
    if segments.len() != topic.split(TOPIC_SEPARATOR).count() {
        tracing::warn!(
            topic = %topic,
            stored_as = %segments.join("/"),
            "Topic has empty levels, storing it in normalised form"
        );
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path.push(format!(
        "{}_{}.{}",
        format_timestamp(timestamp),
        disambiguator,
        FILE_EXTENSION
    ));
    Ok(path)
}

/// Decode a storage path back into its topic and arrival time.
///
/// `path` must live under `root`. The part before the last separator is the
/// topic; the file name must read `<timestamp>_<digits>.json`.
pub fn decode(root: &Path, path: &Path) -> Result<(String, DateTime<Utc>), StoreError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| StoreError::malformed(path, "path is not under the store root"))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| StoreError::malformed(path, "path is not valid UTF-8"))?;
                parts.push(part);
            }
            _ => return Err(StoreError::malformed(path, "unexpected path component")),
        }
    }
    let relative = parts.join("/");

    let captures = file_pattern().captures(&relative).ok_or_else(|| {
        StoreError::malformed(path, "expected <topic>/<timestamp>_<digits>.json")
    })?;

    let topic = captures[1].to_string();
    let timestamp = DateTime::parse_from_rfc3339(&captures[2])
        .map_err(|e| StoreError::malformed(path, format!("bad timestamp {:?}: {e}", &captures[2])))?
        .with_timezone(&Utc);

    Ok((topic, timestamp))
}

/// Render a timestamp the way it appears in file names (`2024-01-01T00:00:00.000Z`).
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Split a topic into directory names. Empty levels (`/a`, `a//b`, `a/`)
/// are dropped, the same way joining them into a path would collapse them.
fn topic_segments(topic: &str) -> Result<Vec<&str>, StoreError> {
    let segments = topic
        .split(TOPIC_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment {
            "." | ".." => Err(StoreError::unsupported_topic(
                topic,
                "topic level would leave the store directory",
            )),
            s if s.contains(std::path::MAIN_SEPARATOR) => Err(StoreError::unsupported_topic(
                topic,
                "topic level contains a path separator",
            )),
            s => Ok(s),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if segments.is_empty() {
        return Err(StoreError::unsupported_topic(topic, "topic has no named level"));
    }
    Ok(segments)
}
