//! Title, tag and delete mutations on session files
//!
//! Mutations rewrite the session's JSONL file in place: marker records of the kind
//! being changed are removed and one fresh record is appended, so the file holds a
//! single marker of each kind and the next load sees the change. All other lines,
//! blank ones included, are kept byte for byte; the only other change is a newline
//! added before the new record when the file did not end with one. Writes go to a
//! uniquely named temp file in the same directory which is then renamed over the
//! original.
//!
//! Sessions from an import bundle have no backing file and cannot be mutated.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Session;
use crate::parsers::record::{TAGS_UPDATED, TITLE_UPDATED};
use crate::utils::validate_path_not_symlink;

/// Find a session by exact id, falling back to a unique id prefix
pub fn find_session<'a>(sessions: &'a [Session], id: &str) -> Option<&'a Session> {
    if let Some(exact) = sessions.iter().find(|s| s.id == id) {
        return Some(exact);
    }
    if id.is_empty() {
        return None;
    }
    let mut candidates = sessions.iter().filter(|s| s.id.starts_with(id));
    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Replace the session's title marker
///
/// An empty title removes the marker, so the title is generated from the first user
/// message again on the next load.
pub fn set_title(session: &Session, title: &str) -> Result<()> {
    let title = title.trim();
    let record = (!title.is_empty())
        .then(|| json!({"type": TITLE_UPDATED, "title": title, "timestamp": Utc::now().to_rfc3339()}));
    rewrite_marker(session, TITLE_UPDATED, record)?;
    info!(id = %session.id, "updated session title");
    Ok(())
}

/// Replace the session's tag list
pub fn set_tags(session: &Session, tags: &BTreeSet<String>) -> Result<()> {
    let tags: Vec<&str> = tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    let record = json!({"type": TAGS_UPDATED, "tags": tags, "timestamp": Utc::now().to_rfc3339()});
    rewrite_marker(session, TAGS_UPDATED, Some(record))?;
    info!(id = %session.id, count = tags.len(), "updated session tags");
    Ok(())
}

/// Remove the session's file
pub fn delete_session(session: &Session) -> Result<()> {
    let path = backing_file(session)?;
    validate_path_not_symlink(path)?;
    fs::remove_file(path).with_context(|| format!("Failed to delete session file: {}", path.display()))?;
    info!(id = %session.id, path = %path.display(), "deleted session");
    Ok(())
}

fn backing_file(session: &Session) -> Result<&Path> {
    if session.is_imported() {
        bail!("Session {} was imported and has no backing file", session.id);
    }
    Ok(&session.filepath)
}

fn rewrite_marker(session: &Session, marker: &str, record: Option<Value>) -> Result<()> {
    let path = backing_file(session)?;
    validate_path_not_symlink(path)?;

    let original = fs::read(path).with_context(|| format!("Failed to read session file: {}", path.display()))?;

    let mut output: Vec<u8> = Vec::with_capacity(original.len() + 128);
    let mut removed = 0usize;
    for line in original.split_inclusive(|b| *b == b'\n') {
        if is_marker_line(line, marker) {
            removed += 1;
            continue;
        }
        output.extend_from_slice(line);
    }

    if let Some(record) = record {
        if output.last().is_some_and(|b| *b != b'\n') {
            output.push(b'\n');
        }
        let encoded = serde_json::to_vec(&record).context("Failed to encode marker record")?;
        output.extend_from_slice(&encoded);
        output.push(b'\n');
    }

    write_atomically(path, &output)?;
    debug!(path = %path.display(), marker, removed, "rewrote session file");
    Ok(())
}

fn is_marker_line(line: &[u8], marker: &str) -> bool {
    serde_json::from_slice::<Value>(line)
        .ok()
        .and_then(|v| v.get("type").and_then(Value::as_str).map(|t| t.eq_ignore_ascii_case(marker)))
        .unwrap_or(false)
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Session path has no file name: {}", path.display()))?;
    // Hidden and not `.jsonl`, so a concurrent load never picks it up
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(format!(".{}.tmp", Uuid::new_v4()));
    let temp: PathBuf = path.with_file_name(temp_name);

    fs::write(&temp, contents).with_context(|| format!("Failed to write temp file: {}", temp.display()))?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e).with_context(|| format!("Failed to replace session file: {}", path.display()));
    }
    Ok(())
}
