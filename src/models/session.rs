use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Message, Role};
use crate::parsers::deserializers::deserialize_timestamp;
use crate::utils::project_name;

/// Title shown for sessions that have neither a title record nor a user message
pub const UNTITLED_SESSION: &str = "Untitled Session";

/// One conversation transcript, backed by one JSONL file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    /// Owning file; empty for sessions that came from an import bundle
    #[serde(skip)]
    pub filepath: PathBuf,
    /// Decoded project path
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Set when the decoded project path failed the sanity check
    #[serde(skip)]
    pub path_suspect: bool,
}

impl Session {
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(UNTITLED_SESSION)
    }

    /// Last segment of the project path
    pub fn project_name(&self) -> String {
        project_name(&self.project)
    }

    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::User)
    }

    /// Sessions loaded from an import bundle have no backing file
    pub fn is_imported(&self) -> bool {
        self.filepath.as_os_str().is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
