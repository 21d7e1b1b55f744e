//! Export writers and the bundle importer
//!
//! Three output formats share one selection of sessions:
//!
//! - [`ExportFormat::Json`] - a versioned bundle that [`import_bundle`] reads back
//! - [`ExportFormat::Markdown`] - one readable document, a section per session
//! - [`ExportFormat::Csv`] - one row of metadata per session
//!
//! Exports never contain the session's file path. With
//! [`ExportOptions::normalize_projects`] the project path is shortened to its
//! repository part so bundles can move between machines.

pub mod csv;
pub mod import;
pub mod json;
pub mod markdown;

use std::borrow::Cow;
use std::sync::LazyLock;

use anyhow::Result;
use clap::ValueEnum;
use regex::Regex;

pub use import::{ImportOutcome, import_bundle};
pub use json::{BUNDLE_VERSION, ExportBundle};

use crate::models::Session;

static REPOSITORY_PATH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"github\.com/[\w-]+/[\w-]+").ok());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub normalize_projects: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { normalize_projects: true }
    }
}

/// Render `sessions` in the requested format
pub fn export_sessions(sessions: &[&Session], format: ExportFormat, options: &ExportOptions) -> Result<String> {
    match format {
        ExportFormat::Json => json::to_json(sessions, options),
        ExportFormat::Markdown => Ok(markdown::to_markdown(sessions, options)),
        ExportFormat::Csv => Ok(csv::to_csv(sessions, options)),
    }
}

/// Shorten a project path to `github.com/<org>/<repo>`, else its last three segments
pub fn normalize_project(project: &str) -> Cow<'_, str> {
    if let Some(found) = REPOSITORY_PATH.as_ref().and_then(|re| re.find(project)) {
        return Cow::Borrowed(found.as_str());
    }
    let segments: Vec<&str> = project.split('/').collect();
    if segments.len() <= 3 {
        return Cow::Borrowed(project);
    }
    Cow::Owned(segments[segments.len() - 3..].join("/"))
}

/// Project path as it appears in an export
pub(crate) fn exported_project<'a>(session: &'a Session, options: &ExportOptions) -> Cow<'a, str> {
    if options.normalize_projects {
        normalize_project(&session.project)
    } else {
        Cow::Borrowed(session.project.as_str())
    }
}
