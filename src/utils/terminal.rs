//! Terminal output sanitization for transcript text
//!
//! # Security: Terminal Injection Prevention
//!
//! Message content comes straight from JSONL files written by another tool and may
//! contain ANSI escape sequences. Every command that prints message content, titles or
//! highlights passes them through [`strip_ansi_codes`] (or [`one_line`] for list rows)
//! so a transcript cannot clear the screen, move the cursor or recolor the terminal.

/// Strips ANSI CSI escape sequences and control characters other than tab and newlines
///
/// # Examples
///
/// ```
/// use ccsearch::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI ends at the first letter
            while let Some(next_ch) = chars.next() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Sanitizes text for a single list row: escapes stripped, whitespace collapsed,
/// and cut to `max_chars` characters with a trailing `...`
pub fn one_line(text: &str, max_chars: usize) -> String {
    let cleaned = strip_ansi_codes(text);
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
