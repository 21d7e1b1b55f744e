use serde_json::Value;
use tracing::debug;

use super::deserializers::record_timestamp;
use super::extractors::{CONTENT_EXTRACTORS, ROLE_EXTRACTORS, RoleHint};
use crate::models::Message;

/// Converts one message-shaped record into a canonical [`Message`]
///
/// Returns `None` when no role resolves or when the record carries no text. The
/// timestamp is the record's own (`timestamp`, `ts`, `created_at`); no fallback is
/// invented here.
pub fn normalize(record: &Value) -> Option<Message> {
    let resolved_role = ROLE_EXTRACTORS.iter().find_map(|extract| extract(record));
    let extracted = CONTENT_EXTRACTORS.iter().find_map(|extract| extract(record));

    let Some(extracted) = extracted else {
        debug!(record = %preview(record), "dropping record without text content");
        return None;
    };

    let role = match extracted.role_hint {
        RoleHint::Force(role) => Some(role),
        RoleHint::Default(role) => resolved_role.or(Some(role)),
        RoleHint::Keep => resolved_role,
    };

    let Some(role) = role else {
        debug!(record = %preview(record), "dropping record with unresolvable role");
        return None;
    };

    let mut message = Message::new(role, extracted.content);
    message.timestamp = record_timestamp(record);
    Some(message)
}

/// First 200 characters of the serialized record, for log fields
pub(crate) fn preview(record: &Value) -> String {
    record.to_string().chars().take(200).collect()
}
