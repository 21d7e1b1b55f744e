use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{DetailMode, MessageType, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::format_timestamp;
use crate::analysis::{PreviewOptions, analyze, build_preview};
use crate::models::{SearchMatch, Session};
use crate::utils::{format_path_with_tilde, one_line, strip_ansi_codes};

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const DANGER: Color = Color::Rgb(239, 68, 68);
const BAR: Color = Color::Rgb(24, 24, 27);

/// Highlights shown per matching message in the detail pane
const HIGHLIGHTS_PER_MATCH: usize = 2;

/// One results row
pub struct ResultRow<'a> {
    pub session: &'a Session,
    pub score: Option<u64>,
    pub matches: &'a [SearchMatch],
}

/// Everything one frame needs, borrowed from the app
pub struct RenderState<'a> {
    pub input: &'a str,
    pub rows: Vec<ResultRow<'a>>,
    pub selected_idx: usize,
    pub detail_mode: DetailMode,
    pub filtered_count: usize,
    pub total_count: usize,
    pub applied_filter: Option<&'a str>,
    pub filter_error: Option<&'a str>,
    pub status_message: Option<&'a StatusMessage>,
}

pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_input(frame, layout.input_area, state.input);
    render_results_list(frame, layout.results_area, state);
    render_detail(frame, layout.detail_area, state.rows.get(state.selected_idx), state.detail_mode);
    render_status_bar(frame, layout.status_area, state);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).border_style(Style::default().fg(MUTED)).title(title)
}

fn render_input(frame: &mut Frame, area: Rect, input: &str) {
    let line = Line::from(vec![Span::styled("> ", Style::default().fg(ACCENT)), Span::raw(input)]);
    frame.render_widget(Paragraph::new(line).block(bordered(" Filter | Query ")), area);
}

fn render_results_list(frame: &mut Frame, area: Rect, state: &RenderState) {
    let now = Utc::now();
    let title_width = usize::from(area.width.saturating_sub(30)).max(10);

    let items: Vec<ListItem> = state
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let session = row.session;
            let mut content = format!(
                "{:>9} {:>4} {}",
                format_timestamp(&session.updated_at, &now),
                session.message_count(),
                one_line(session.display_title(), title_width)
            );
            if let Some(score) = row.score {
                content.push_str(&format!(" ({})", score));
            }

            let style = if idx == state.selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            ListItem::new(content).style(style)
        })
        .collect();

    let title = format!(" Sessions ({}) ", state.rows.len());
    let list = List::new(items).block(bordered(&title));
    let mut list_state = ListState::default().with_selected(Some(state.selected_idx));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn label(name: &str, value: String) -> Line<'static> {
    Line::from(vec![Span::styled(format!("{}: ", name), Style::default().fg(MUTED)), Span::raw(value)])
}

fn render_detail(frame: &mut Frame, area: Rect, row: Option<&ResultRow>, mode: DetailMode) {
    let content = match row {
        Some(row) => match mode {
            DetailMode::Overview => overview_text(row),
            DetailMode::Transcript => transcript_text(row.session),
        },
        None => Text::from("No session selected"),
    };

    let title = match mode {
        DetailMode::Overview => " Overview (Tab: transcript) ",
        DetailMode::Transcript => " Transcript (Tab: overview) ",
    };
    let paragraph = Paragraph::new(content).block(bordered(title)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn overview_text(row: &ResultRow) -> Text<'static> {
    let session = row.session;
    let now = Utc::now();

    let mut lines = vec![
        Line::styled(session.display_title().to_string(), Style::default().add_modifier(Modifier::BOLD)),
        label("ID", session.id.clone()),
        label("Project", format_path_with_tilde(&session.project)),
        label("Updated", format_timestamp(&session.updated_at, &now)),
    ];
    if !session.tags.is_empty() {
        lines.push(label("Tags", session.tags.iter().cloned().collect::<Vec<_>>().join(", ")));
    }
    lines.push(Line::from(""));

    for summary_line in analyze(session).describe().lines() {
        lines.push(Line::from(summary_line.to_string()));
    }
    lines.push(Line::from(""));

    if row.matches.is_empty() {
        lines.push(Line::styled("Preview", Style::default().fg(MUTED)));
        lines.push(Line::from(strip_ansi_codes(&build_preview(session, &PreviewOptions::default()))));
    } else {
        lines.push(Line::styled(format!("Matches in {} messages", row.matches.len()), Style::default().fg(MUTED)));
        for found in row.matches {
            for highlight in found.highlights.iter().take(HIGHLIGHTS_PER_MATCH) {
                lines.push(Line::from(vec![
                    Span::styled(format!("#{} ", found.message_index + 1), Style::default().fg(ACCENT)),
                    Span::raw(one_line(highlight, 400)),
                ]));
            }
        }
    }

    Text::from(lines)
}

fn transcript_text(session: &Session) -> Text<'static> {
    let mut lines = Vec::new();
    for (index, message) in session.messages.iter().enumerate() {
        lines.push(Line::styled(
            format!("{} ({})", message.role, index + 1),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
        for text_line in strip_ansi_codes(&message.content).lines() {
            lines.push(Line::from(text_line.to_string()));
        }
        lines.push(Line::from(""));
    }
    Text::from(lines)
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, fg) = if let Some(message) = state.status_message {
        let color = match message.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => DANGER,
        };
        (format!(" {} ", message.text), color)
    } else if let Some(error) = state.filter_error {
        (format!(" [ERROR] {} ", error), DANGER)
    } else if state.rows.is_empty() {
        (" No sessions | Enter: apply filter | Esc: clear | Ctrl+C: quit ".to_string(), BRIGHT)
    } else {
        let mut parts = vec![];

        if state.filtered_count < state.total_count {
            parts.push(format!("{}/{} sessions", state.filtered_count, state.total_count));
        } else {
            parts.push(format!("{} sessions", state.total_count));
        }
        if let Some(filter) = state.applied_filter {
            parts.push(format!("filter: {}", filter));
        }
        parts.push(format!("{}/{}", state.selected_idx + 1, state.rows.len()));
        parts.push("Enter: filter".to_string());
        parts.push("Ctrl+Y: copy id".to_string());
        parts.push("Ctrl+O: copy resume".to_string());
        parts.push("Ctrl+R: reload".to_string());
        parts.push("Esc: clear".to_string());

        (format!(" {} ", parts.join(" | ")), BRIGHT)
    };

    frame.render_widget(Paragraph::new(status_text).style(Style::default().fg(fg).bg(BAR)), area);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::time::Instant;

    use chrono::TimeZone;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::models::{Message, Role};

    fn session() -> Session {
        Session {
            id: "abc-123".to_string(),
            title: Some("Fix the login bug".to_string()),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            updated_at: Utc.timestamp_opt(1_700_000_600, 0).unwrap(),
            messages: vec![
                Message::new(Role::User, "Why does login fail?"),
                Message::new(Role::Assistant, "The token \x1b[31mexpired\x1b[0m."),
            ],
            filepath: PathBuf::from("/tmp/abc-123.jsonl"),
            project: "/Users/alice/app".to_string(),
            tags: BTreeSet::from(["work".to_string()]),
            path_suspect: false,
        }
    }

    fn state<'a>(rows: Vec<ResultRow<'a>>, mode: DetailMode) -> RenderState<'a> {
        RenderState {
            input: "tag:work | login",
            rows,
            selected_idx: 0,
            detail_mode: mode,
            filtered_count: 1,
            total_count: 3,
            applied_filter: Some("tag:work"),
            filter_error: None,
            status_message: None,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    fn draw(state: &RenderState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render_ui(f, state)).unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn test_render_overview_with_matches() {
        let session = session();
        let matches = vec![SearchMatch { message_index: 0, highlights: vec!["Why does login fail?".to_string()] }];
        let text = draw(&state(vec![ResultRow { session: &session, score: Some(6), matches: &matches }], DetailMode::Overview));

        assert!(text.contains("Fix the login bug (6)"));
        assert!(text.contains("abc-123"));
        assert!(text.contains("#1 Why does login fail?"));
        assert!(text.contains("1/3 sessions"));
        assert!(text.contains("filter: tag:work"));
    }

    #[test]
    fn test_render_transcript_strips_escapes() {
        let session = session();
        let text = draw(&state(vec![ResultRow { session: &session, score: None, matches: &[] }], DetailMode::Transcript));
        assert!(text.contains("Assistant (2)"));
        assert!(text.contains("The token expired."));
    }

    #[test]
    fn test_render_empty() {
        let text = draw(&state(Vec::new(), DetailMode::Overview));
        assert!(text.contains("No session selected"));
        assert!(text.contains("No sessions"));
    }

    #[test]
    fn test_render_status_message_and_error() {
        let session = session();
        let message = StatusMessage {
            text: "✓ Copied session id".to_string(),
            message_type: MessageType::Success,
            expires_at: Instant::now(),
        };
        let mut with_status = state(vec![ResultRow { session: &session, score: None, matches: &[] }], DetailMode::Overview);
        with_status.status_message = Some(&message);
        assert!(draw(&with_status).contains("Copied session id"));

        let mut with_error = state(Vec::new(), DetailMode::Overview);
        with_error.filter_error = Some("Parse error: bad");
        assert!(draw(&with_error).contains("[ERROR] Parse error: bad"));
    }
}
