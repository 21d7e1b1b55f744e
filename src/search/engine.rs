use rayon::prelude::*;

use super::highlight::{fallback_excerpt, find_occurrences, fold_chars, highlights_for};
use crate::models::{SearchMatch, SearchResult, Session};

/// Added to a session's score when its title contains any term
pub const TITLE_BONUS: u64 = 5;

/// Splits a query into folded, de-duplicated terms
///
/// Terms are literal text; nothing in them is special. A word repeated in the query is
/// kept once, so `"bug bug"` scores exactly like `"bug"` rather than counting each
/// occurrence once per repetition.
pub fn parse_terms(query: &str) -> Vec<Vec<char>> {
    let mut terms: Vec<Vec<char>> = Vec::new();
    for word in query.split_whitespace() {
        let term = fold_chars(word);
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Rank sessions against a free-text query
///
/// Every non-overlapping, case-insensitive occurrence of every term counts one point;
/// a title containing any term adds [`TITLE_BONUS`]. Sessions without a matching
/// message are left out. Results are ordered by descending score, ties keeping corpus
/// order.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use ccsearch::{load_all, search};
///
/// let sessions = load_all(Path::new("/Users/alice/.claude/projects"));
/// for result in search(&sessions, "login bug") {
///     println!("{} {}", result.score, result.session.display_title());
/// }
/// ```
pub fn search<'a>(sessions: &'a [Session], query: &str) -> Vec<SearchResult<'a>> {
    let terms = parse_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }

    // Indexed parallel iterators collect in input order
    let mut results: Vec<SearchResult<'a>> =
        sessions.par_iter().filter_map(|session| score_session(session, &terms)).collect();

    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// Scores one session; `None` when no message matches
pub fn score_session<'a>(session: &'a Session, terms: &[Vec<char>]) -> Option<SearchResult<'a>> {
    let mut matches = Vec::new();
    let mut score = 0u64;

    for (message_index, message) in session.messages.iter().enumerate() {
        let original: Vec<char> = message.content.chars().collect();
        let folded = fold_chars(&message.content);

        let message_score: u64 =
            terms.iter().map(|term| find_occurrences(&folded, term).len() as u64).sum();
        if message_score == 0 {
            continue;
        }

        let mut highlights = highlights_for(&original, &folded, terms);
        if highlights.is_empty() {
            highlights.push(fallback_excerpt(&message.content));
        }

        score += message_score;
        matches.push(SearchMatch { message_index, highlights });
    }

    if matches.is_empty() {
        return None;
    }

    if let Some(title) = &session.title {
        let folded_title = fold_chars(title);
        if terms.iter().any(|term| !find_occurrences(&folded_title, term).is_empty()) {
            score += TITLE_BONUS;
        }
    }

    Some(SearchResult { session, matches, score })
}
