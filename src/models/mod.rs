//! Data models for locally stored chat sessions.
//!
//! - [`Message`] / [`Role`] - One normalized conversation turn
//! - [`Session`] - One transcript file, normalized and annotated with derived metadata
//! - [`Project`] - A project directory and the session files it holds
//! - [`SearchResult`] / [`SearchMatch`] - Ranked search output borrowing from the corpus
//!
//! Timestamps are `chrono::DateTime<Utc>` and serialize as RFC 3339 strings.

pub mod message;
pub mod project;
pub mod search;
pub mod session;

pub use message::{Message, Role};
pub use project::Project;
pub use search::{SearchMatch, SearchResult};
pub use session::{Session, UNTITLED_SESSION};
