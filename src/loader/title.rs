/// Characters that end a sentence for title purposes
const SENTENCE_ENDINGS: [char; 3] = ['.', '!', '?'];

/// A sentence end further in than this is ignored
const SENTENCE_SEARCH_LIMIT: usize = 150;

/// Titles longer than this are shortened
const MAX_TITLE_CHARS: usize = 80;

/// A word break before this position is too early to use
const MIN_WORD_BREAK: usize = 40;

/// Derives a short title from message text
///
/// Whitespace is collapsed first. The title is the first sentence when it ends within
/// the first 150 characters; otherwise long text is cut at a word boundary near 80
/// characters (or hard at 80) with `...` appended. Returns `None` for blank text.
pub fn generate_title(content: &str) -> Option<String> {
    let clean = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.is_empty() {
        return None;
    }

    let chars: Vec<char> = clean.chars().collect();

    if let Some(end) = chars.iter().position(|c| SENTENCE_ENDINGS.contains(c))
        && end > 0
        && end < SENTENCE_SEARCH_LIMIT
    {
        return Some(chars[..=end].iter().collect::<String>().trim().to_string());
    }

    if chars.len() <= MAX_TITLE_CHARS {
        return Some(clean);
    }

    let word_break = chars[..=MAX_TITLE_CHARS].iter().rposition(|c| *c == ' ');
    if let Some(at) = word_break
        && at > MIN_WORD_BREAK
    {
        return Some(format!("{}...", chars[..at].iter().collect::<String>()));
    }

    Some(format!("{}...", chars[..MAX_TITLE_CHARS].iter().collect::<String>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sentence() {
        assert_eq!(
            generate_title("Fix the login bug. It fails on Safari.").as_deref(),
            Some("Fix the login bug.")
        );
        assert_eq!(generate_title("Why is CI red? Help").as_deref(), Some("Why is CI red?"));
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(generate_title("  refactor\n\n the   parser  ").as_deref(), Some("refactor the parser"));
    }

    #[test]
    fn test_short_text_verbatim() {
        assert_eq!(generate_title("add a cache layer").as_deref(), Some("add a cache layer"));
    }

    #[test]
    fn test_leading_punctuation_is_not_a_sentence() {
        assert_eq!(generate_title(".env loading is broken").as_deref(), Some(".env loading is broken"));
    }

    #[test]
    fn test_long_text_breaks_at_word() {
        let text = "word ".repeat(30);
        let title = generate_title(&text).unwrap();
        assert!(title.ends_with("..."));
        assert!(!title.ends_with(" ..."));
        assert!(title.chars().count() <= MAX_TITLE_CHARS + 3);
        assert_eq!(title, format!("{}...", "word ".repeat(16).trim_end()));
    }

    #[test]
    fn test_long_text_without_spaces_hard_cut() {
        let text = "x".repeat(200);
        assert_eq!(generate_title(&text).unwrap(), format!("{}...", "x".repeat(80)));
    }

    #[test]
    fn test_sentence_end_beyond_limit_is_ignored() {
        let text = format!("{} done.", "a".repeat(160));
        assert_eq!(generate_title(&text).unwrap(), format!("{}...", "a".repeat(80)));
    }

    #[test]
    fn test_multibyte_text() {
        let text = "ü".repeat(100);
        assert_eq!(generate_title(&text).unwrap().chars().count(), 83);
    }

    #[test]
    fn test_blank_text() {
        assert_eq!(generate_title("   \n "), None);
    }
}
