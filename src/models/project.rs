use std::path::PathBuf;

use serde::Serialize;

/// A project directory under the sessions root
///
/// Derived from the directory listing on every load; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Display name: last segment of the decoded path
    pub name: String,
    /// Best-guess original filesystem path
    pub path: String,
    #[serde(skip)]
    pub encoded_name: String,
    #[serde(skip)]
    pub project_dir: PathBuf,
    #[serde(skip)]
    pub session_files: Vec<PathBuf>,
}

impl Project {
    pub fn session_count(&self) -> usize {
        self.session_files.len()
    }
}
