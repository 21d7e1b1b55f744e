use std::fmt::Write;

use chrono::Utc;

use super::{ExportOptions, exported_project};
use crate::models::Session;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One document: a header, then a section per session with its messages in order
pub fn to_markdown(sessions: &[&Session], options: &ExportOptions) -> String {
    let mut out = String::new();
    out.push_str("# Claude Sessions Export\n\n");
    let _ = writeln!(out, "Export Date: {}\n", Utc::now().to_rfc3339());
    let _ = writeln!(out, "Total Sessions: {}\n", sessions.len());

    for session in sessions {
        write_session(&mut out, session, options);
    }
    out
}

fn write_session(out: &mut String, session: &Session, options: &ExportOptions) {
    let project = exported_project(session, options);
    let _ = writeln!(out, "## {}\n", session.display_title());
    let _ = writeln!(out, "- **ID**: {}", session.id);
    let _ = writeln!(out, "- **Project**: {}", if project.is_empty() { "N/A" } else { &project });
    let _ = writeln!(out, "- **Created**: {}", session.created_at.format(DATE_FORMAT));
    let _ = writeln!(out, "- **Updated**: {}", session.updated_at.format(DATE_FORMAT));
    let _ = writeln!(out, "- **Messages**: {}", session.message_count());
    if !session.tags.is_empty() {
        let tags: Vec<&str> = session.tags.iter().map(String::as_str).collect();
        let _ = writeln!(out, "- **Tags**: {}", tags.join(", "));
    }
    out.push_str("\n### Messages\n\n");

    let last = session.messages.len().saturating_sub(1);
    for (index, message) in session.messages.iter().enumerate() {
        let _ = writeln!(out, "#### {} ({})\n", message.role.label(), index + 1);
        let _ = writeln!(out, "{}\n", message.content);
        if index < last {
            out.push_str("---\n\n");
        }
    }
    out.push_str("\n\n");
}
