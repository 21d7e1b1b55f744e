use serde::Serialize;

use super::Session;

/// One matching message inside a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub message_index: usize,
    pub highlights: Vec<String>,
}

/// A ranked session with its matching messages
///
/// Built fresh for every search call and borrows the session from the loaded corpus.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    pub session: &'a Session,
    pub matches: Vec<SearchMatch>,
    pub score: u64,
}

impl SearchResult<'_> {
    /// First highlight of the best-ranked match, for one-line listings
    pub fn first_highlight(&self) -> Option<&str> {
        self.matches.first().and_then(|m| m.highlights.first()).map(String::as_str)
    }
}
