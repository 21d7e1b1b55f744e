use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::normalizer::{normalize, preview};
use super::record::RawRecord;
use crate::models::Message;
use crate::utils::safe_open_file;

/// Everything one session file contributes before file metadata is applied
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedSessionFile {
    /// Messages in line order
    pub messages: Vec<Message>,
    /// First `title_updated` record
    pub title: Option<String>,
    /// First `tags_updated` record
    pub tags: Option<BTreeSet<String>>,
    /// Id embedded in a `session_started` record
    pub session_id: Option<String>,
    /// Timestamp of the `session_started` record
    pub started_at: Option<DateTime<Utc>>,
    /// Lines that were not valid UTF-8 JSON
    pub skipped_lines: usize,
    /// Lines whose shape was not recognized, or messages without role or content
    pub dropped_records: usize,
}

/// Parse a session JSONL file
///
/// Each line is parsed on its own. Malformed lines are logged at debug level and
/// counted; only I/O failures on the file itself are returned as errors.
pub fn parse_session_file(path: &Path, max_file_size_bytes: u64) -> Result<ParsedSessionFile> {
    let file = safe_open_file(path, max_file_size_bytes)?;
    let reader = BufReader::new(file);
    let mut parsed = ParsedSessionFile::default();

    for (line_num, line) in reader.split(b'\n').enumerate() {
        let bytes = line.with_context(|| format!("Failed to read from {}", path.display()))?;

        let Ok(line) = std::str::from_utf8(&bytes) else {
            debug!(path = %path.display(), line = line_num + 1, "skipping line with invalid UTF-8");
            parsed.skipped_lines += 1;
            continue;
        };

        if line.trim().is_empty() {
            continue;
        }

        let value = match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => value,
            Err(e) => {
                debug!(path = %path.display(), line = line_num + 1, error = %e, "skipping malformed JSON line");
                parsed.skipped_lines += 1;
                continue;
            }
        };

        parsed.absorb(RawRecord::classify(value), path, line_num + 1);
    }

    if parsed.skipped_lines > 0 || parsed.dropped_records > 0 {
        debug!(
            path = %path.display(),
            messages = parsed.messages.len(),
            skipped = parsed.skipped_lines,
            dropped = parsed.dropped_records,
            "parsed session file"
        );
    }

    Ok(parsed)
}

impl ParsedSessionFile {
    fn absorb(&mut self, record: RawRecord, path: &Path, line: usize) {
        match record {
            RawRecord::Message(value) => match normalize(&value) {
                Some(message) => self.messages.push(message),
                None => self.dropped_records += 1,
            },
            RawRecord::TitleUpdate { title } => {
                if self.title.is_none() && !title.is_empty() {
                    self.title = Some(title);
                }
            }
            RawRecord::TagsUpdate { tags } => {
                if self.tags.is_none() {
                    self.tags = Some(tags);
                }
            }
            RawRecord::SessionStart { session_id, timestamp } => {
                if session_id.is_some() {
                    self.session_id = session_id;
                }
                if self.started_at.is_none() {
                    self.started_at = timestamp;
                }
            }
            RawRecord::Unrecognized(value) => {
                debug!(path = %path.display(), line, record = %preview(&value), "unrecognized record");
                self.dropped_records += 1;
            }
        }
    }
}
