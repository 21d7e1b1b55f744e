//! Listing previews and display summaries derived from session messages

pub mod analyzer;
pub mod preview;

pub use analyzer::{ConversationType, Sentiment, SessionSummary, analyze, analyze_sessions};
pub use preview::{PreviewOptions, build_preview};
