//! Session loading from the projects directory
//!
//! # Error Handling Strategy
//!
//! The loader never fails as a whole:
//!
//! - **Directory-level failures**: A missing root yields no sessions. Unreadable entries and
//!   symlinks are logged with `tracing::warn!` and skipped.
//!
//! - **File-level failures**: Files that cannot be opened, exceed the size limit, or cannot
//!   be read are logged and skipped; sibling files still load.
//!
//! - **Line-level failures**: Delegated to [`crate::parsers`], which skips bad lines.
//!
//! - **Summary reporting**: [`LoadStats`] carries the counts, and one `info!` event
//!   summarizes each load.

pub mod builder;
pub mod project_discovery;
pub mod title;

pub use builder::{LoadOutcome, LoadStats, load_all, load_corpus, load_session_file};
pub use project_discovery::{discover_projects, list_projects};
pub use title::generate_title;

use crate::utils::DEFAULT_MAX_FILE_SIZE_BYTES;

/// Maximum number of project directories to scan (security: prevent resource exhaustion)
const DEFAULT_MAX_PROJECTS: usize = 10_000;

/// Maximum number of session files per project (security: prevent resource exhaustion)
const DEFAULT_MAX_FILES_PER_PROJECT: usize = 10_000;

/// Limits applied while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Larger session files are skipped
    pub max_file_size_bytes: u64,
    pub max_projects: usize,
    pub max_files_per_project: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            max_projects: DEFAULT_MAX_PROJECTS,
            max_files_per_project: DEFAULT_MAX_FILES_PER_PROJECT,
        }
    }
}
