//! Free-text search over loaded sessions
//!
//! Search runs on demand over the in-memory corpus; nothing is indexed or cached between
//! calls.

pub mod engine;
pub mod highlight;

pub use engine::{TITLE_BONUS, parse_terms, score_session, search};
