//! ccsearch - Browse, search, tag and export locally stored chat sessions
//!
//! The recording CLI writes one JSON-Lines file per conversation under
//! `~/.claude/projects/<encoded-project-path>/`. This library:
//!
//! - Decodes project directory names back to filesystem paths
//! - Normalizes heterogeneous transcript records into [`Session`]s and [`Message`]s
//! - Runs free-text search with context highlights and term-frequency ranking
//! - Builds previews and heuristic summaries, filters and sorts sessions
//! - Edits titles and tags in place, exports to JSON/Markdown/CSV and imports bundles
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ccsearch::{load_all, search};
//!
//! let sessions = load_all(Path::new("/Users/alice/.claude/projects"));
//! for result in search(&sessions, "login bug") {
//!     println!("{} ({})", result.session.display_title(), result.score);
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod clipboard;
pub mod export;
pub mod filters;
pub mod loader;
pub mod models;
pub mod parsers;
pub mod search;
pub mod store;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use analysis::{SessionSummary, analyze, build_preview};
pub use loader::{LoaderConfig, list_projects, load_all, load_corpus};
pub use models::{Message, Project, Role, SearchResult, Session};
pub use parsers::normalize;
pub use search::search;
pub use utils::paths::{decode_path, encode_path, format_path_with_tilde};
