use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable that overrides the sessions root
pub const PROJECTS_DIR_ENV: &str = "CCSEARCH_PROJECTS_DIR";

/// Default sessions root: `~/.claude/projects`
pub fn default_projects_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".claude").join("projects"))
}

/// Picks the explicit directory when given, otherwise the default root
///
/// The explicit value usually comes from `--projects-dir` or [`PROJECTS_DIR_ENV`],
/// both resolved by the CLI parser.
pub fn resolve_projects_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
        _ => default_projects_dir(),
    }
}
