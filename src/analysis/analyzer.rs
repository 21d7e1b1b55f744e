use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{Role, Session};

const CODING_INDICATORS: &[&str] = &[
    "function", "const", "let", "var", "class", "import", "export", "return", "if", "else", "for",
    "while", "```", "code", "implement",
];
const DEBUGGING_INDICATORS: &[&str] = &[
    "error", "bug", "fix", "issue", "problem", "debug", "trace", "exception", "fail", "crash", "wrong",
];
const QA_INDICATORS: &[&str] =
    &["what is", "how to", "why", "when", "where", "explain", "tell me", "can you", "?"];
const ANALYSIS_INDICATORS: &[&str] =
    &["analyze", "review", "evaluate", "assess", "examine", "investigate", "study", "research"];

const ERROR_KEYWORDS: &[&str] = &["error", "exception", "fail", "crash", "bug", "issue", "problem"];
const POSITIVE_WORDS: &[&str] =
    &["thank", "great", "perfect", "excellent", "good", "helpful", "works", "solved"];
const NEGATIVE_WORDS: &[&str] =
    &["error", "fail", "wrong", "bad", "issue", "problem", "stuck", "confused"];

/// Topic vocabulary as `(word, label)`, in reporting order
const TOPICS: &[(&str, &str)] = &[
    ("javascript", "Javascript"),
    ("typescript", "Typescript"),
    ("python", "Python"),
    ("java", "Java"),
    ("c++", "C++"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("ruby", "Ruby"),
    ("react", "React"),
    ("vue", "Vue"),
    ("angular", "Angular"),
    ("express", "Express"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("spring", "Spring"),
    ("api", "API"),
    ("database", "DATABASE"),
    ("frontend", "FRONTEND"),
    ("backend", "BACKEND"),
    ("deployment", "DEPLOYMENT"),
    ("testing", "TESTING"),
    ("security", "SECURITY"),
];

const MAX_TOPICS: usize = 5;
const MAX_KEY_PHRASES: usize = 3;
const MAX_PHRASE_CHARS: usize = 50;

/// A conversation is General below this indicator count
const MIN_TYPE_SIGNAL: usize = 3;

static TOPIC_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    TOPICS
        .iter()
        .filter_map(|(word, label)| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok().map(|re| (re, *label))
        })
        .collect()
});

static KEY_PHRASE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:how to|what is|why|when|where|can you|could you)\s+([^.?!]+)",
        r"(?i)(?:i want to|i need to|i'm trying to)\s+([^.?!]+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static CODE_FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    Coding,
    Debugging,
    Qa,
    Analysis,
    General,
    Mixed,
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConversationType::Coding => "Coding session",
            ConversationType::Debugging => "Debugging session",
            ConversationType::Qa => "Q&A session",
            ConversationType::Analysis => "Analysis session",
            ConversationType::General => "General conversation",
            ConversationType::Mixed => "Mixed conversation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// Display-only digest of a session; not used for ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub total_words: usize,
    pub avg_words_per_message: usize,
    pub duration: String,
    pub conversation_type: ConversationType,
    pub main_topics: Vec<String>,
    pub key_phrases: Vec<String>,
    pub code_blocks: usize,
    pub questions: usize,
    pub has_error: bool,
    pub sentiment: Sentiment,
}

impl SessionSummary {
    /// Multi-line plain-text rendering for the CLI and TUI
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("[{}]", self.conversation_type),
            format!(
                "Messages: {} (User: {}, Assistant: {})",
                self.total_messages, self.user_messages, self.assistant_messages
            ),
            format!("Duration: {}", self.duration),
        ];

        if !self.main_topics.is_empty() {
            lines.push(format!("Topics: {}", self.main_topics.join(", ")));
        }
        if !self.key_phrases.is_empty() {
            lines.push(format!("Key phrases: {}", self.key_phrases.join("; ")));
        }
        if self.code_blocks > 0 {
            lines.push(format!("Code blocks: {}", self.code_blocks));
        }
        if self.has_error {
            lines.push("Contains errors or problems".to_string());
        }
        lines.push(format!("Sentiment: {}", self.sentiment));

        lines.join("\n")
    }
}

/// Summarize one session
pub fn analyze(session: &Session) -> SessionSummary {
    let messages = &session.messages;
    let total_messages = messages.len();
    let user_messages = messages.iter().filter(|m| m.role == Role::User).count();
    let assistant_messages = messages.iter().filter(|m| m.role == Role::Assistant).count();

    let total_words: usize = messages.iter().map(|m| m.content.split_whitespace().count()).sum();
    let avg_words_per_message =
        if total_messages > 0 { (total_words as f64 / total_messages as f64).round() as usize } else { 0 };

    let joined = messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join(" ");
    let lowered = joined.to_lowercase();

    SessionSummary {
        total_messages,
        user_messages,
        assistant_messages,
        total_words,
        avg_words_per_message,
        duration: format_duration(session),
        conversation_type: detect_conversation_type(&lowered),
        main_topics: main_topics(&joined),
        key_phrases: key_phrases(session),
        code_blocks: count_code_blocks(session),
        questions: messages.iter().filter(|m| m.role == Role::User && m.content.contains('?')).count(),
        has_error: ERROR_KEYWORDS.iter().any(|k| lowered.contains(k)),
        sentiment: sentiment(&lowered),
    }
}

/// Summaries keyed by session id
pub fn analyze_sessions(sessions: &[Session]) -> HashMap<String, SessionSummary> {
    sessions.iter().map(|s| (s.id.clone(), analyze(s))).collect()
}

fn format_duration(session: &Session) -> String {
    let diff = session.updated_at - session.created_at;
    let hours = diff.num_hours();
    let minutes = diff.num_minutes() % 60;
    if hours > 0 { format!("{}h {}m", hours, minutes) } else { format!("{}m", minutes) }
}

/// Non-overlapping substring occurrences of every indicator in lower-cased text
fn count_indicators(lowered: &str, indicators: &[&str]) -> usize {
    indicators.iter().map(|i| lowered.matches(i).count()).sum()
}

fn detect_conversation_type(lowered: &str) -> ConversationType {
    let coding = count_indicators(lowered, CODING_INDICATORS);
    let debugging = count_indicators(lowered, DEBUGGING_INDICATORS);
    let qa = count_indicators(lowered, QA_INDICATORS);
    let analysis = count_indicators(lowered, ANALYSIS_INDICATORS);

    let max = coding.max(debugging).max(qa).max(analysis);
    if max < MIN_TYPE_SIGNAL {
        return ConversationType::General;
    }

    if debugging as f64 > coding as f64 * 0.5 && debugging > 2 {
        return ConversationType::Debugging;
    }

    let threshold = max as f64 * 0.7;
    [(coding, ConversationType::Coding), (qa, ConversationType::Qa), (analysis, ConversationType::Analysis)]
        .into_iter()
        .find(|(score, _)| *score as f64 > threshold)
        .map(|(_, kind)| kind)
        .unwrap_or(ConversationType::Mixed)
}

fn main_topics(text: &str) -> Vec<String> {
    TOPIC_PATTERNS
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .map(|(_, label)| label.to_string())
        .take(MAX_TOPICS)
        .collect()
}

fn key_phrases(session: &Session) -> Vec<String> {
    let mut phrases = Vec::new();
    for message in session.messages.iter().filter(|m| m.role == Role::User) {
        for pattern in KEY_PHRASE_PATTERNS.iter() {
            if let Some(phrase) = pattern.captures(&message.content).and_then(|c| c.get(1)) {
                phrases.push(phrase.as_str().trim().chars().take(MAX_PHRASE_CHARS).collect());
            }
        }
    }
    phrases.truncate(MAX_KEY_PHRASES);
    phrases
}

fn count_code_blocks(session: &Session) -> usize {
    let joined = session.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n");
    CODE_FENCE.as_ref().map_or(0, |re| re.find_iter(&joined).count())
}

fn sentiment(lowered: &str) -> Sentiment {
    let positive = count_indicators(lowered, POSITIVE_WORDS);
    let negative = count_indicators(lowered, NEGATIVE_WORDS);

    if positive > negative * 2 {
        Sentiment::Positive
    } else if negative > positive * 2 {
        Sentiment::Negative
    } else if positive > 0 && negative > 0 {
        Sentiment::Mixed
    } else {
        Sentiment::Neutral
    }
}
