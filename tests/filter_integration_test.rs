//! Integration tests for filter functionality

use std::collections::BTreeSet;
use std::path::PathBuf;

use ccsearch::filters::{apply_filters, matches_filter, parse_filter};
use ccsearch::models::{Message, Role, Session};
use chrono::{TimeZone, Utc};

fn create_test_session(id: &str, project: &str, tags: &[&str], updated: (i32, u32, u32), messages: usize) -> Session {
    let updated_at = Utc.with_ymd_and_hms(updated.0, updated.1, updated.2, 12, 0, 0).unwrap();
    Session {
        id: id.to_string(),
        title: None,
        created_at: updated_at,
        updated_at,
        messages: (0..messages).map(|i| Message::new(Role::User, format!("message {}", i))).collect(),
        filepath: PathBuf::from(format!("/tmp/{}.jsonl", id)),
        project: project.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        path_suspect: false,
    }
}

fn corpus() -> Vec<Session> {
    vec![
        create_test_session("a", "/Users/test/github.com/acme/api", &["work"], (2024, 1, 10), 2),
        create_test_session("b", "/Users/test/github.com/acme/web", &["work", "frontend"], (2024, 2, 20), 12),
        create_test_session("c", "/Users/test/notes", &["personal"], (2024, 3, 5), 5),
        create_test_session("d", "/Users/test/scratch", &[], (2023, 12, 31), 1),
    ]
}

fn ids(sessions: &[Session]) -> Vec<&str> {
    sessions.iter().map(|s| s.id.as_str()).collect()
}

fn filtered(input: &str) -> Vec<String> {
    let filter = parse_filter(input).expect("Parse filter");
    apply_filters(corpus(), &filter).into_iter().map(|s| s.id).collect()
}

#[test]
fn test_filter_integration_project() {
    assert_eq!(filtered("project:acme"), vec!["a", "b"]);
    assert_eq!(filtered("project:ACME/WEB"), vec!["b"], "Project match is case-insensitive");
}

#[test]
fn test_filter_integration_tag() {
    assert_eq!(filtered("tag:work"), vec!["a", "b"]);
    assert_eq!(filtered("tag:Frontend"), vec!["b"]);
    assert!(filtered("tag:missing").is_empty());
}

#[test]
fn test_filter_integration_since_until_inclusive() {
    assert_eq!(filtered("since:2024-02-20"), vec!["b", "c"]);
    assert_eq!(filtered("until:2024-01-10"), vec!["a", "d"]);
    assert_eq!(filtered("since:2024-01-01 until:2024-02-28"), vec!["a", "b"]);
}

#[test]
fn test_filter_integration_messages_minimum() {
    assert_eq!(filtered("messages:5"), vec!["b", "c"]);
    assert_eq!(filtered("messages:0").len(), 4);
}

#[test]
fn test_filter_integration_same_field_or() {
    assert_eq!(filtered("tag:personal tag:frontend"), vec!["b", "c"]);
}

#[test]
fn test_filter_integration_cross_field_and() {
    assert_eq!(filtered("project:acme messages:10"), vec!["b"]);
}

#[test]
fn test_filter_integration_explicit_or() {
    assert_eq!(filtered("project:scratch OR messages:10"), vec!["b", "d"]);
    assert_eq!(filtered("project:scratch or messages:10"), vec!["b", "d"], "Operators are case-insensitive");
}

#[test]
fn test_filter_integration_explicit_and_overrides_same_field_or() {
    assert_eq!(filtered("tag:work AND tag:frontend"), vec!["b"]);
}

#[test]
fn test_filter_integration_quoted_value() {
    let mut sessions = corpus();
    sessions.push(create_test_session("e", "/Users/test/My Project", &[], (2024, 4, 1), 1));

    let filter = parse_filter(r#"project:"my project""#).expect("Parse filter");
    assert_eq!(ids(&apply_filters(sessions, &filter)), vec!["e"]);
}

#[test]
fn test_filter_integration_empty_filter_keeps_everything() {
    assert_eq!(filtered("").len(), 4);
    assert_eq!(filtered("   ").len(), 4);
}

#[test]
fn test_filter_integration_matches_single_session() {
    let sessions = corpus();
    let filter = parse_filter("tag:work since:2024-02-01").expect("Parse filter");

    assert!(!matches_filter(&sessions[0], &filter));
    assert!(matches_filter(&sessions[1], &filter));
}

#[test]
fn test_filter_integration_invalid_filters() {
    let cases = [
        ("type:user", "Unknown field"),
        ("since:2024-13-01", "Invalid date format"),
        ("since:24-01-01", "Invalid date format"),
        ("messages:many", "Invalid message count"),
        ("tag:work OR", "ended with operator"),
        ("AND tag:work", "Unexpected AND"),
        ("tag:work login", "Invalid token"),
        (r#"project:"unterminated"#, "Unterminated quoted string"),
    ];

    for (input, expected) in cases {
        let err = parse_filter(input).expect_err(input);
        let message = format!("{:#}", err);
        assert!(message.contains(expected), "{}: {}", input, message);
    }
}
