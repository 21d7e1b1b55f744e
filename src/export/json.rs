use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ExportOptions, exported_project};
use crate::models::Session;

/// Bundle format version written by [`to_json`]
pub const BUNDLE_VERSION: &str = "1.0";

/// Top-level JSON export document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: &'static str,
    pub export_date: DateTime<Utc>,
    pub session_count: usize,
    /// Operating system that produced the bundle
    pub exported_from: &'static str,
    pub sessions: Vec<Session>,
}

impl ExportBundle {
    pub fn new(sessions: &[&Session], options: &ExportOptions) -> Self {
        let sessions: Vec<Session> = sessions
            .iter()
            .map(|session| {
                let mut exported = (*session).clone();
                exported.project = exported_project(session, options).into_owned();
                exported
            })
            .collect();

        Self {
            version: BUNDLE_VERSION,
            export_date: Utc::now(),
            session_count: sessions.len(),
            exported_from: std::env::consts::OS,
            sessions,
        }
    }
}

pub fn to_json(sessions: &[&Session], options: &ExportOptions) -> Result<String> {
    let bundle = ExportBundle::new(sessions, options);
    serde_json::to_string_pretty(&bundle).context("Failed to serialize export bundle")
}
