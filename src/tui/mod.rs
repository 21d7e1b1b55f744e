//! Interactive session browser

mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use std::path::PathBuf;

use anyhow::Result;
pub use app::App;
use tracing::info;

use self::terminal::TerminalManager;
use crate::clipboard::SystemClipboard;
use crate::loader::{LoaderConfig, load_corpus};

/// Load sessions under `root` and run the browser until the user quits
pub fn run_interactive(root: PathBuf, initial_input: String) -> Result<()> {
    let outcome = load_corpus(&root, &LoaderConfig::default());
    info!(sessions = outcome.sessions.len(), "starting interactive browser");

    let mut app =
        App::new(outcome.sessions, Some(root), Box::new(SystemClipboard::default())).with_input(&initial_input);

    let mut manager = TerminalManager::new()?;
    app.run(manager.terminal_mut())
}
