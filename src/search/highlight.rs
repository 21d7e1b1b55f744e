//! Occurrence counting and excerpt extraction on `char` slices
//!
//! Text and terms are compared after folding every character to its first lowercase
//! character, which keeps positions one-to-one with the original text so excerpts never
//! split a code point.

/// Characters of context kept on each side of an occurrence
pub const CONTEXT_CHARS: usize = 80;

/// Length of the excerpt used when no occurrence could be located
pub const FALLBACK_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// Case fold used for matching
pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

pub fn fold_chars(text: &str) -> Vec<char> {
    text.chars().map(fold).collect()
}

/// Start positions of every non-overlapping occurrence of `needle` in `haystack`
pub fn find_occurrences(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut positions = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return positions;
    }

    let mut pos = 0;
    while pos + needle.len() <= haystack.len() {
        if haystack[pos..pos + needle.len()] == *needle {
            positions.push(pos);
            pos += needle.len();
        } else {
            pos += 1;
        }
    }
    positions
}

/// A `[start, end)` range of characters selected for an excerpt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// Context window around an occurrence at `pos` of length `len`
    pub fn around(pos: usize, len: usize, total: usize) -> Self {
        Self { start: pos.saturating_sub(CONTEXT_CHARS), end: (pos + len + CONTEXT_CHARS).min(total) }
    }
}

/// Characters an excerpt actually shows, after partial-word trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    cut_left: bool,
    cut_right: bool,
}

/// A side that was cut loses its partial word. The trimmed span never shrinks past the
/// occurrence itself.
fn span(chars: &[char], pos: usize, len: usize) -> Span {
    let window = Window::around(pos, len, chars.len());
    let match_end = pos + len;

    let mut start = window.start;
    let cut_left = start > 0;
    if cut_left && !chars[start - 1].is_whitespace() {
        while start < pos && !chars[start].is_whitespace() {
            start += 1;
        }
    }
    while start < pos && chars[start].is_whitespace() {
        start += 1;
    }

    let mut end = window.end;
    let cut_right = end < chars.len();
    if cut_right && !chars[end].is_whitespace() {
        while end > match_end && !chars[end - 1].is_whitespace() {
            end -= 1;
        }
    }
    while end > match_end && chars[end - 1].is_whitespace() {
        end -= 1;
    }

    Span { start, end, cut_left, cut_right }
}

fn render(chars: &[char], span: Span) -> String {
    let mut out = String::with_capacity((span.end - span.start) + 2 * ELLIPSIS.len());
    if span.cut_left {
        out.push_str(ELLIPSIS);
    }
    out.extend(&chars[span.start..span.end]);
    if span.cut_right {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Renders the excerpt for an occurrence at `pos..pos + len`
///
/// A side that was cut loses its partial word and gets `...`.
pub fn excerpt(chars: &[char], pos: usize, len: usize) -> String {
    render(chars, span(chars, pos, len))
}

/// First [`FALLBACK_CHARS`] characters, with `...` when the text is longer
pub fn fallback_excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(FALLBACK_CHARS).collect();
    if chars.next().is_some() { format!("{}{}", head, ELLIPSIS) } else { head }
}

/// Excerpts for every occurrence of every term
///
/// An occurrence already shown in full by the previous excerpt of the same term adds no
/// new excerpt; every other occurrence gets its own. Different terms are handled
/// independently.
pub fn highlights_for(original: &[char], folded: &[char], terms: &[Vec<char>]) -> Vec<String> {
    let mut out = Vec::new();
    for term in terms {
        let mut shown_until: Option<usize> = None;
        for pos in find_occurrences(folded, term) {
            if shown_until.is_some_and(|end| pos + term.len() <= end) {
                continue;
            }
            let span = span(original, pos, term.len());
            out.push(render(original, span));
            shown_until = Some(span.end);
        }
    }
    out
}
