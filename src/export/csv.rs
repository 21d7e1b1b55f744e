use std::borrow::Cow;

use super::{ExportOptions, exported_project};
use crate::models::Session;

pub const CSV_HEADER: &[&str] = &["id", "title", "project", "created_at", "updated_at", "message_count", "tags"];

/// One header row plus one row per session, CRLF line endings
pub fn to_csv(sessions: &[&Session], options: &ExportOptions) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER.iter().map(|h| Cow::Borrowed(*h)));

    for session in sessions {
        let tags: Vec<&str> = session.tags.iter().map(String::as_str).collect();
        write_row(
            &mut out,
            [
                Cow::Borrowed(session.id.as_str()),
                Cow::Borrowed(session.display_title()),
                exported_project(session, options),
                Cow::Owned(session.created_at.to_rfc3339()),
                Cow::Owned(session.updated_at.to_rfc3339()),
                Cow::Owned(session.message_count().to_string()),
                Cow::Owned(tags.join(";")),
            ]
            .into_iter(),
        );
    }
    out
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote(&field));
    }
    out.push_str("\r\n");
}

/// RFC 4180: fields containing a comma, quote or line break are quoted, quotes doubled
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{Message, Role};

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_csv_rows() {
        let session = Session {
            id: "s1".to_string(),
            title: Some("Fix \"login\", then deploy".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap(),
            messages: vec![Message::new(Role::User, "x"); 3],
            filepath: PathBuf::new(),
            project: "/Users/alice/work/client/app".to_string(),
            tags: BTreeSet::from(["urgent".to_string(), "work".to_string()]),
            path_suspect: false,
        };

        let csv = to_csv(&[&session], &ExportOptions::default());
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "id,title,project,created_at,updated_at,message_count,tags");
        assert_eq!(
            lines[1],
            "s1,\"Fix \"\"login\"\", then deploy\",work/client/app,2024-01-02T03:04:05+00:00,2024-01-02T04:00:00+00:00,3,urgent;work"
        );
        assert_eq!(lines[2], "");
    }
}
