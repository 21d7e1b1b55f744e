//! TUI application state and event handling.
//!
//! Input syntax: `filter_expr | query` where:
//! - Filter portion (left of `|`): applied when Enter is pressed, narrows the session set
//! - Query portion (right of `|`, or the whole input without a `|`): free-text search,
//!   re-run on every keystroke
//!
//! Without a query the results are the filtered sessions, most recently updated first.
//! With a query they are the ranked search results, and the detail pane shows the
//! highlights of the selected session instead of its preview.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, poll_event};
use super::rendering::{RenderState, ResultRow, render_ui};
use crate::clipboard::{ClipboardPayload, ClipboardProvider, copy_session};
use crate::filters::{FilterExpr, SortKey, apply_filters, parse_filter, sort_sessions};
use crate::loader::{LoaderConfig, load_corpus};
use crate::models::{SearchMatch, Session};
use crate::search::search;

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Longest accepted input line
const MAX_INPUT_CHARS: usize = 256;
const PAGE_SIZE: isize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// What the detail pane shows for the selected session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailMode {
    /// Metadata, summary, then highlights or preview
    #[default]
    Overview,
    /// Every message in order
    Transcript,
}

/// One visible row: a session in `filtered` plus its search matches
#[derive(Debug, Clone)]
struct Row {
    session_idx: usize,
    score: Option<u64>,
    matches: Vec<SearchMatch>,
}

pub struct App {
    root: Option<PathBuf>,
    all_sessions: Vec<Session>,
    filtered: Vec<Session>,
    rows: Vec<Row>,
    input: String,
    applied_filter: Option<String>,
    filter_error: Option<String>,
    selected_idx: usize,
    detail_mode: DetailMode,
    should_quit: bool,
    last_enter_time: Option<Instant>,
    status_message: Option<StatusMessage>,
    clipboard: Box<dyn ClipboardProvider>,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    /// `root` enables Ctrl+R reloads; without it the session set is fixed
    pub fn new(sessions: Vec<Session>, root: Option<PathBuf>, clipboard: Box<dyn ClipboardProvider>) -> Self {
        let mut app = Self {
            root,
            all_sessions: sessions,
            filtered: Vec::new(),
            rows: Vec::new(),
            input: String::new(),
            applied_filter: None,
            filter_error: None,
            selected_idx: 0,
            detail_mode: DetailMode::default(),
            should_quit: false,
            last_enter_time: None,
            status_message: None,
            clipboard,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        };
        app.reset_filtered(None);
        app
    }

    /// Pre-fill the input line and apply its filter part
    pub fn with_input(mut self, input: &str) -> Self {
        self.input = input.chars().take(MAX_INPUT_CHARS).collect();
        self.apply_filter();
        self
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= Duration::from_millis(100) {
                terminal.draw(|f| render_ui(f, &self.render_state()))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        let rows = self
            .rows
            .iter()
            .filter_map(|row| {
                self.filtered.get(row.session_idx).map(|session| ResultRow {
                    session,
                    score: row.score,
                    matches: &row.matches,
                })
            })
            .collect();

        RenderState {
            input: &self.input,
            rows,
            selected_idx: self.selected_idx,
            detail_mode: self.detail_mode,
            filtered_count: self.filtered.len(),
            total_count: self.all_sessions.len(),
            applied_filter: self.applied_filter.as_deref(),
            filter_error: self.filter_error.as_deref(),
            status_message: self.status_message.as_ref(),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType) {
        let duration_ms = match message_type {
            MessageType::Success => STATUS_SUCCESS_DURATION_MS,
            MessageType::Error => STATUS_ERROR_DURATION_MS,
        };
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn check_and_clear_expired_status(&mut self) {
        if self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at) {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ClearInput => {
                if self.input.is_empty() && self.applied_filter.is_none() {
                    self.should_quit = true;
                } else {
                    self.input.clear();
                    self.reset_filtered(None);
                }
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::PageUp => self.move_selection(-PAGE_SIZE),
            Action::PageDown => self.move_selection(PAGE_SIZE),
            Action::Input(c) => self.push_char(c),
            Action::DeleteChar => {
                if self.input.pop().is_some() {
                    self.refresh_rows();
                }
            }
            Action::ApplyFilter => {
                // Debounce: only apply if 150ms has elapsed since last Enter
                let should_apply =
                    self.last_enter_time.is_none_or(|last| last.elapsed() >= Duration::from_millis(150));
                if should_apply {
                    self.apply_filter();
                    self.last_enter_time = Some(Instant::now());
                }
            }
            Action::CopySessionId => self.copy_selected(ClipboardPayload::SessionId),
            Action::CopyResumeCommand => self.copy_selected(ClipboardPayload::ResumeCommand),
            Action::ToggleDetail => {
                self.detail_mode = match self.detail_mode {
                    DetailMode::Overview => DetailMode::Transcript,
                    DetailMode::Transcript => DetailMode::Overview,
                };
                self.needs_redraw = true;
            }
            Action::Reload => self.reload(),
            Action::None => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let total = self.rows.len();
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn push_char(&mut self, c: char) {
        if self.input.chars().count() < MAX_INPUT_CHARS {
            self.input.push(c);
            self.refresh_rows();
        }
    }

    /// Returns (filter_portion, query_portion)
    fn parse_input(&self) -> (Option<&str>, &str) {
        match self.input.split_once('|') {
            Some((filter, query)) => {
                let filter = filter.trim();
                (if filter.is_empty() { None } else { Some(filter) }, query.trim())
            }
            None => (None, self.input.trim()),
        }
    }

    fn apply_filter(&mut self) {
        let Some(filter_str) = self.parse_input().0.map(str::to_string) else {
            self.reset_filtered(None);
            return;
        };

        match parse_filter(&filter_str) {
            Ok(expr) => {
                self.filter_error = None;
                self.reset_filtered(Some((filter_str, expr)));
            }
            Err(e) => {
                self.filter_error =
                    Some(format!("Parse error: {} | Try: tag:work since:2024-01-01 | query", e));
                self.needs_redraw = true;
            }
        }
    }

    /// Recompute `filtered` from all sessions, then the rows
    fn reset_filtered(&mut self, filter: Option<(String, FilterExpr)>) {
        let mut filtered = match &filter {
            Some((_, expr)) => apply_filters(self.all_sessions.clone(), expr),
            None => self.all_sessions.clone(),
        };
        sort_sessions(&mut filtered, SortKey::Updated);

        self.filtered = filtered;
        self.applied_filter = filter.map(|(text, _)| text);
        if self.applied_filter.is_none() {
            self.filter_error = None;
        }
        self.refresh_rows();
    }

    /// Re-run the query portion over `filtered`
    fn refresh_rows(&mut self) {
        let query = self.parse_input().1.to_string();

        self.rows = if query.is_empty() {
            (0..self.filtered.len()).map(|session_idx| Row { session_idx, score: None, matches: Vec::new() }).collect()
        } else {
            let positions: HashMap<&str, usize> =
                self.filtered.iter().enumerate().map(|(idx, s)| (s.id.as_str(), idx)).collect();
            search(&self.filtered, &query)
                .into_iter()
                .filter_map(|result| {
                    positions.get(result.session.id.as_str()).map(|&session_idx| Row {
                        session_idx,
                        score: Some(result.score),
                        matches: result.matches,
                    })
                })
                .collect()
        };

        self.selected_idx = 0;
        self.needs_redraw = true;
    }

    fn selected_session(&self) -> Option<&Session> {
        self.rows.get(self.selected_idx).and_then(|row| self.filtered.get(row.session_idx))
    }

    fn copy_selected(&mut self, payload: ClipboardPayload) {
        let Some(session) = self.selected_session() else {
            self.set_status("✗ No session selected", MessageType::Error);
            return;
        };
        let session = session.clone();

        match copy_session(&session, payload, self.clipboard.as_mut()) {
            Ok(_) => self.set_status(format!("✓ Copied {}", payload.describe()), MessageType::Success),
            Err(e) => self.set_status(format!("✗ Clipboard error: {}", e), MessageType::Error),
        }
    }

    fn reload(&mut self) {
        let Some(root) = self.root.clone() else {
            self.set_status("✗ Nothing to reload", MessageType::Error);
            return;
        };

        self.all_sessions = load_corpus(&root, &LoaderConfig::default()).sessions;
        let count = self.all_sessions.len();
        self.apply_filter();
        self.set_status(format!("✓ Reloaded {} sessions", count), MessageType::Success);
    }
}
