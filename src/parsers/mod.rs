//! JSONL parsers for session transcripts
//!
//! # Error Handling Strategy
//!
//! Transcripts were written by several generations of the recording tool, so this
//! module follows a **graceful degradation** approach:
//!
//! - **Individual line failures**: Malformed JSON, invalid UTF-8 and unrecognized record
//!   shapes are logged at `debug` level and skipped. A single bad line never hides the
//!   rest of the session.
//!
//! - **No rejection thresholds**: A file where most lines fail still yields whatever
//!   messages it contains; the counts are reported in [`ParsedSessionFile`].
//!
//! - **Error propagation**: Only failures to open or read the file itself are returned,
//!   as `anyhow::Result` with context. The loader logs them and moves on.
//!
//! Record handling is split in three: [`record`] classifies a line into a [`RawRecord`],
//! [`extractors`] holds the ordered role and content rules, and [`normalizer`] turns a
//! message record into a [`Message`](crate::models::Message).

pub mod deserializers;
pub mod extractors;
pub mod normalizer;
pub mod record;
pub mod session_file;

pub use normalizer::normalize;
pub use record::RawRecord;
pub use session_file::{ParsedSessionFile, parse_session_file};
