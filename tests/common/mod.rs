//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a sessions root: one directory per project, one JSONL file per session
pub struct ProjectsDirBuilder {
    temp_dir: TempDir,
}

impl ProjectsDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a project directory with the given encoded name and session files
    pub fn with_project(self, encoded_name: &str, files: &[SessionFileBuilder]) -> Self {
        let project_dir = self.temp_dir.path().join(encoded_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for file in files {
            file.create_in(&project_dir);
        }

        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ProjectsDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one session file
pub struct SessionFileBuilder {
    filename: String,
    lines: Vec<String>,
}

impl SessionFileBuilder {
    /// `id` becomes the file stem, and so the session id unless a record overrides it
    pub fn new(id: &str) -> Self {
        Self { filename: format!("{}.jsonl", id), lines: Vec::new() }
    }

    pub fn with_record(mut self, record: RecordBuilder) -> Self {
        self.lines.push(record.to_json());
        self
    }

    /// Add a line verbatim (malformed JSON, legacy shapes)
    pub fn with_raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn create_in(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.filename);
        fs::write(&path, self.lines.join("\n")).expect("Failed to write session file");
        path
    }
}

/// Builder for records in the current CLI shape
pub struct RecordBuilder {
    value: Value,
}

impl RecordBuilder {
    pub fn user(text: &str) -> Self {
        Self::message("user", text)
    }

    pub fn assistant(text: &str) -> Self {
        Self::message("assistant", text)
    }

    fn message(role: &str, text: &str) -> Self {
        Self {
            value: json!({
                "type": role,
                "message": {"role": role, "content": [{"type": "text", "text": text}]},
                "sessionId": "550e8400-e29b-41d4-a716-446655440000",
            }),
        }
    }

    pub fn title(title: &str) -> Self {
        Self { value: json!({"type": "title_updated", "title": title}) }
    }

    pub fn tags(tags: &[&str]) -> Self {
        Self { value: json!({"type": "tags_updated", "tags": tags}) }
    }

    pub fn session_started(session_id: &str) -> Self {
        Self { value: json!({"type": "session_started", "session_id": session_id}) }
    }

    /// RFC 3339 timestamp, e.g. "2024-01-15T10:30:00Z"
    pub fn at(mut self, timestamp: &str) -> Self {
        self.value["timestamp"] = json!(timestamp);
        self
    }

    pub fn to_json(&self) -> String {
        self.value.to_string()
    }
}

/// A small corpus: two projects, three sessions
///
/// - `login-bug` (api): user asks about a login failure, tagged `work`
/// - `deploy` (api): deployment chat mentioning login once
/// - `recipes` (notes): unrelated, explicit title
pub fn realistic_projects_dir() -> TempDir {
    ProjectsDirBuilder::new()
        .with_project(
            "-Users-alice-github-com-acme-api",
            &[
                SessionFileBuilder::new("login-bug")
                    .with_record(RecordBuilder::user("Why does the login page fail? It returns 500.").at("2024-01-10T09:00:00Z"))
                    .with_record(RecordBuilder::assistant("The login handler panics on an expired token.").at("2024-01-10T09:01:00Z"))
                    .with_record(RecordBuilder::tags(&["work"])),
                SessionFileBuilder::new("deploy")
                    .with_record(RecordBuilder::user("Help me deploy the service to staging").at("2024-02-01T12:00:00Z"))
                    .with_record(RecordBuilder::assistant("Run the deploy script, then check login.").at("2024-02-01T12:30:00Z")),
            ],
        )
        .with_project(
            "-Users-alice-notes",
            &[SessionFileBuilder::new("recipes")
                .with_record(RecordBuilder::title("Bread recipes"))
                .with_record(RecordBuilder::user("How long should dough rise?").at("2024-03-05T18:00:00Z"))
                .with_record(RecordBuilder::assistant("About two hours.").at("2024-03-05T18:02:00Z"))],
        )
        .build()
}
