//! Ordered role and content extractors for message records
//!
//! Each historical record shape is handled by one small function. The normalizer
//! walks [`ROLE_EXTRACTORS`] and [`CONTENT_EXTRACTORS`] in order and takes the first
//! hit, so supporting a new shape means adding a row.

use serde_json::Value;

use crate::models::Role;

pub type RoleExtractor = fn(&Value) -> Option<Role>;
pub type ContentExtractor = fn(&Value) -> Option<Extracted>;

/// How a content extractor constrains the role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHint {
    /// Role comes from the role extractors only
    Keep,
    /// Used when no role extractor resolved a role
    Default(Role),
    /// Overrides whatever the role extractors found
    Force(Role),
}

/// Content found on a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub content: String,
    pub role_hint: RoleHint,
}

impl Extracted {
    fn keep(content: String) -> Self {
        Self { content, role_hint: RoleHint::Keep }
    }
}

pub const ROLE_EXTRACTORS: &[RoleExtractor] = &[role_from_type, role_from_record, role_from_message];

pub const CONTENT_EXTRACTORS: &[ContentExtractor] = &[
    content_from_message,
    content_from_content,
    content_from_text,
    content_from_summary,
    content_from_query,
    content_from_response,
    content_from_loose_fields,
];

/// Last-resort string fields scanned in order
const LOOSE_TEXT_FIELDS: &[&str] = &["body", "message_text", "msg", "data"];

/// Maps the record's `type` field
pub fn role_from_type(record: &Value) -> Option<Role> {
    let record_type = record.get("type")?.as_str()?;
    match record_type.to_ascii_lowercase().as_str() {
        "human" | "user" => Some(Role::User),
        "assistant" | "completion" | "ai" | "summary" => Some(Role::Assistant),
        "system" => Some(Role::System),
        _ => None,
    }
}

/// `role` on the record itself
pub fn role_from_record(record: &Value) -> Option<Role> {
    record.get("role")?.as_str().and_then(Role::from_role_field)
}

/// `role` on a nested `message` object
pub fn role_from_message(record: &Value) -> Option<Role> {
    record.get("message")?.get("role")?.as_str().and_then(Role::from_role_field)
}

/// `message.content` as a string, an object with `text`, or an array of parts
pub fn content_from_message(record: &Value) -> Option<Extracted> {
    let content = record.get("message")?.get("content")?;
    flatten_content(content).map(Extracted::keep)
}

/// Top-level `content`, flattened the same way as `message.content`
pub fn content_from_content(record: &Value) -> Option<Extracted> {
    flatten_content(record.get("content")?).map(Extracted::keep)
}

pub fn content_from_text(record: &Value) -> Option<Extracted> {
    non_empty_str(record.get("text")?).map(Extracted::keep)
}

/// Summaries are written by the assistant unless the record says otherwise
pub fn content_from_summary(record: &Value) -> Option<Extracted> {
    non_empty_str(record.get("summary")?)
        .map(|content| Extracted { content, role_hint: RoleHint::Default(Role::Assistant) })
}

pub fn content_from_query(record: &Value) -> Option<Extracted> {
    non_empty_str(record.get("query")?)
        .map(|content| Extracted { content, role_hint: RoleHint::Force(Role::User) })
}

pub fn content_from_response(record: &Value) -> Option<Extracted> {
    non_empty_str(record.get("response")?)
        .map(|content| Extracted { content, role_hint: RoleHint::Force(Role::Assistant) })
}

pub fn content_from_loose_fields(record: &Value) -> Option<Extracted> {
    LOOSE_TEXT_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(non_empty_str))
        .map(Extracted::keep)
}

/// Flattens structured content into one string
///
/// Array parts contribute a bare string, their `text`, or their `content` (which may
/// itself be structured, as in tool results); parts are joined with `\n`.
pub fn flatten_content(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => non_empty(s),
        Value::Object(_) => content.get("text").and_then(non_empty_str),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_part).collect();
            if parts.is_empty() { None } else { Some(parts.join("\n")) }
        }
        _ => None,
    }
}

fn flatten_part(part: &Value) -> Option<String> {
    match part {
        Value::String(s) => non_empty(s),
        Value::Object(_) => part
            .get("text")
            .and_then(non_empty_str)
            .or_else(|| part.get("content").and_then(flatten_content)),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value.as_str().and_then(non_empty)
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s.to_string()) }
}
