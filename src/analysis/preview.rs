use crate::models::Session;

const SEPARATOR: &str = " | ";
const ELLIPSIS: &str = "...";

/// A cut message is only kept when more than this much budget remains
const MIN_REMAINING_FOR_CUT: usize = 20;

/// Bounds for [`build_preview`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    pub max_messages: usize,
    pub max_total_length: usize,
    pub max_per_message_length: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self { max_messages: 5, max_total_length: 300, max_per_message_length: 100 }
    }
}

/// One-line digest of a session's leading messages
///
/// Each message renders as `Role: content` with whitespace collapsed and content cut to
/// `max_per_message_length` characters. Entries are joined with ` | `; the running
/// length counts each entry plus the separator. The first entry that would overflow
/// `max_total_length` is cut to the remaining budget when more than 20 characters are
/// left, and nothing follows it. Lengths are in characters.
pub fn build_preview(session: &Session, options: &PreviewOptions) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current_length = 0usize;

    for message in session.messages.iter().take(options.max_messages) {
        let content = message.content.split_whitespace().collect::<Vec<_>>().join(" ");
        let content = truncate_chars(&content, options.max_per_message_length);
        let entry = format!("{}: {}", message.role.label(), content);
        let entry_length = entry.chars().count();

        if current_length + entry_length > options.max_total_length {
            let remaining = options.max_total_length.saturating_sub(current_length);
            if remaining > MIN_REMAINING_FOR_CUT {
                let cut: String = entry.chars().take(remaining).collect();
                parts.push(format!("{}{}", cut, ELLIPSIS));
            }
            break;
        }

        current_length += entry_length + SEPARATOR.len();
        parts.push(entry);
    }

    parts.join(SEPARATOR)
}

fn truncate_chars(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() { format!("{}{}", head, ELLIPSIS) } else { head }
}
