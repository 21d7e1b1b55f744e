use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::deserializers::record_timestamp;

/// `type` of the record that opens a session and may carry its id
pub const SESSION_STARTED: &str = "session_started";
/// `type` of the record holding a user-assigned title
pub const TITLE_UPDATED: &str = "title_updated";
/// `type` of the record holding the session's tag list
pub const TAGS_UPDATED: &str = "tags_updated";

/// `type` values that always denote a conversation turn
pub const MESSAGE_TYPES: &[&str] =
    &["user", "human", "assistant", "completion", "ai", "summary", "system"];

/// Keys whose presence marks an untyped (or unknown-typed) record as a message candidate
const MESSAGE_HINT_KEYS: &[&str] = &["role", "query", "response", "summary"];

/// One JSONL line, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// A conversation turn in any of the historical message shapes
    Message(Value),
    TitleUpdate { title: String },
    TagsUpdate { tags: BTreeSet<String> },
    SessionStart { session_id: Option<String>, timestamp: Option<DateTime<Utc>> },
    /// Anything else (snapshots, tool bookkeeping, future shapes), kept for diagnostics
    Unrecognized(Value),
}

impl RawRecord {
    /// Classifies a parsed JSON value
    pub fn classify(value: Value) -> Self {
        let record_type = value.get("type").and_then(Value::as_str).map(str::to_ascii_lowercase);

        match record_type.as_deref() {
            Some(SESSION_STARTED) => RawRecord::SessionStart {
                session_id: string_field(&value, "session_id")
                    .or_else(|| string_field(&value, "sessionId")),
                timestamp: record_timestamp(&value),
            },
            Some(TITLE_UPDATED) => RawRecord::TitleUpdate {
                title: string_field(&value, "title").unwrap_or_default(),
            },
            Some(TAGS_UPDATED) => RawRecord::TagsUpdate { tags: tag_set(value.get("tags")) },
            Some(t) if MESSAGE_TYPES.contains(&t) => RawRecord::Message(value),
            _ if looks_like_message(&value) => RawRecord::Message(value),
            _ => RawRecord::Unrecognized(value),
        }
    }

    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            RawRecord::Message(_) => "message",
            RawRecord::TitleUpdate { .. } => TITLE_UPDATED,
            RawRecord::TagsUpdate { .. } => TAGS_UPDATED,
            RawRecord::SessionStart { .. } => SESSION_STARTED,
            RawRecord::Unrecognized(_) => "unrecognized",
        }
    }
}

fn looks_like_message(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    MESSAGE_HINT_KEYS.iter().any(|k| obj.contains_key(*k))
        || value.get("message").and_then(|m| m.get("role")).is_some()
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Tags are an array of strings; blanks are dropped and surrounding whitespace trimmed
fn tag_set(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
