use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::loader::generate_title;
use crate::models::Session;
use crate::parsers::deserializers::timestamp_from_value;
use crate::parsers::normalize;

/// Sessions read from a bundle plus anything worth telling the user
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Valid sessions; none of them has a backing file
    pub sessions: Vec<Session>,
    /// Entries in the bundle's `sessions` array
    pub total: usize,
    pub warnings: Vec<String>,
    pub version: Option<String>,
    pub export_date: Option<String>,
    pub exported_from: Option<String>,
}

/// Parse a JSON export bundle
///
/// The document must hold a non-empty `sessions` array. Entries that are not objects or
/// lack a `messages` array are skipped with a warning, as are entries whose messages all
/// fail to normalize. Entries without an id get a fresh v4 UUID. Imported sessions are
/// never written to disk.
pub fn import_bundle(input: &str) -> Result<ImportOutcome> {
    let document: Value =
        serde_json::from_str(input).context("Invalid JSON format: not a session export file")?;

    let Some(entries) = document.get("sessions").and_then(Value::as_array) else {
        bail!("Invalid import data format: the file does not contain a sessions array");
    };
    if entries.is_empty() {
        bail!("No sessions to import: the export file contains no sessions");
    }

    let mut outcome = ImportOutcome {
        total: entries.len(),
        version: string_field(&document, "version"),
        export_date: string_field(&document, "exportDate"),
        exported_from: string_field(&document, "exportedFrom"),
        ..ImportOutcome::default()
    };

    let mut seen_ids = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        match import_entry(entry, index) {
            Ok(mut session) => {
                if !seen_ids.insert(session.id.clone()) {
                    let replacement = Uuid::new_v4().to_string();
                    outcome.warnings.push(format!(
                        "Session at index {} repeats id {}; imported as {}",
                        index, session.id, replacement
                    ));
                    session.id = replacement.clone();
                    seen_ids.insert(replacement);
                }
                outcome.sessions.push(session);
            }
            Err(reason) => {
                warn!(index, reason = %reason, "skipping invalid session in import");
                outcome.warnings.push(format!("Session at index {} {}", index, reason));
            }
        }
    }

    if outcome.sessions.is_empty() {
        bail!("No valid sessions found: all {} sessions in the file are invalid", outcome.total);
    }

    if let Some(platform) = &outcome.exported_from
        && platform != std::env::consts::OS
    {
        outcome.warnings.push(format!(
            "This export was created on {} and you are on {}; project paths may not exist here",
            platform,
            std::env::consts::OS
        ));
    }

    debug!(imported = outcome.sessions.len(), total = outcome.total, "parsed import bundle");
    Ok(outcome)
}

fn import_entry(entry: &Value, index: usize) -> std::result::Result<Session, String> {
    let Some(object) = entry.as_object() else {
        return Err("is not an object".to_string());
    };
    let Some(raw_messages) = object.get("messages").and_then(Value::as_array) else {
        return Err("is missing its messages array".to_string());
    };

    let messages: Vec<_> = raw_messages.iter().filter_map(normalize).collect();
    if messages.is_empty() {
        return Err("has no readable messages".to_string());
    }

    let id = object
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            debug!(index, "generating id for imported session");
            Uuid::new_v4().to_string()
        });

    let first_ts = messages.iter().filter_map(|m| m.timestamp).min();
    let last_ts = messages.iter().filter_map(|m| m.timestamp).max();
    let created_at = object_timestamp(object, "created_at").or(first_ts).unwrap_or_else(Utc::now);
    let updated_at = object_timestamp(object, "updated_at").or(last_ts).unwrap_or(created_at).max(created_at);

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| messages.iter().find(|m| m.is_user()).and_then(|m| generate_title(&m.content)));

    let tags: BTreeSet<String> = object
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter().filter_map(Value::as_str).map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()
        })
        .unwrap_or_default();

    Ok(Session {
        id,
        title,
        created_at,
        updated_at,
        messages,
        filepath: PathBuf::new(),
        project: object.get("project").and_then(Value::as_str).unwrap_or_default().to_string(),
        tags,
        path_suspect: false,
    })
}

fn object_timestamp(object: &Map<String, Value>, field: &str) -> Option<DateTime<Utc>> {
    object.get(field).and_then(timestamp_from_value)
}

fn string_field(document: &Value, field: &str) -> Option<String> {
    document.get(field).and_then(Value::as_str).map(str::to_string)
}
