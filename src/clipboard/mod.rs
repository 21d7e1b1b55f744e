use anyhow::{Context, Result, bail};
use arboard::Clipboard;

use crate::models::Session;

/// Maximum clipboard size (10MB)
const MAX_CLIPBOARD_SIZE: usize = 10 * 1024 * 1024;

/// Command that reopens a session in the recording CLI
const RESUME_COMMAND: &str = "claude --resume";

/// Destination for copied text; the TUI holds one so tests can swap in a mock
pub trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via arboard, opened on first use
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new().context("Failed to initialize clipboard")?);
        }
        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text).context("Failed to set clipboard contents"),
            None => bail!("Clipboard unavailable"),
        }
    }
}

/// What to copy for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardPayload {
    SessionId,
    /// `claude --resume <id>`, ready to paste into a shell
    ResumeCommand,
}

impl ClipboardPayload {
    pub fn text_for(self, session: &Session) -> String {
        match self {
            ClipboardPayload::SessionId => session.id.clone(),
            ClipboardPayload::ResumeCommand => format!("{} {}", RESUME_COMMAND, session.id),
        }
    }

    /// Status-bar wording after a successful copy
    pub fn describe(self) -> &'static str {
        match self {
            ClipboardPayload::SessionId => "session id",
            ClipboardPayload::ResumeCommand => "resume command",
        }
    }
}

fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.is_empty() {
        bail!("Cannot copy empty text to clipboard");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        bail!("Text too large for clipboard ({} bytes, max {})", text.len(), MAX_CLIPBOARD_SIZE);
    }

    Ok(())
}

/// Validate `text` and hand it to `provider`
///
/// # Errors
/// Returns error if:
/// - Text is empty
/// - Text is too large for clipboard (>10MB)
/// - The provider fails (clipboard locked, denied, or no display in headless sessions)
pub fn copy_with_provider(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_clipboard_text(text)?;
    provider.set_text(text)
}

/// Copy the chosen payload for `session`, returning the copied text
pub fn copy_session(
    session: &Session,
    payload: ClipboardPayload,
    provider: &mut dyn ClipboardProvider,
) -> Result<String> {
    let text = payload.text_for(session);
    copy_with_provider(&text, provider)?;
    Ok(text)
}
