use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::LoaderConfig;
use super::project_discovery::discover_projects;
use super::title::generate_title;
use crate::models::{Project, Session};
use crate::parsers::{ParsedSessionFile, parse_session_file};
use crate::utils::is_plausible_path;

/// Counters collected during one load
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub projects: usize,
    pub files_read: usize,
    pub files_failed: usize,
    /// Files that parsed but produced no messages
    pub empty_files: usize,
    pub skipped_lines: usize,
    pub dropped_records: usize,
}

/// Sessions from one load plus what happened along the way
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub sessions: Vec<Session>,
    pub stats: LoadStats,
}

/// Load every session under `root` with default limits
///
/// See [`load_corpus`] for the rules.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use ccsearch::load_all;
///
/// let sessions = load_all(Path::new("/Users/alice/.claude/projects"));
/// println!("Loaded {} sessions", sessions.len());
/// ```
pub fn load_all(root: &Path) -> Vec<Session> {
    load_corpus(root, &LoaderConfig::default()).sessions
}

/// Load every session under `root`
///
/// One project directory per subdirectory, one session per `*.jsonl` file. Files that
/// cannot be read are logged at warn level and skipped; files without messages yield no
/// session. Order is deterministic: projects, then files, by file name.
pub fn load_corpus(root: &Path, config: &LoaderConfig) -> LoadOutcome {
    let projects = discover_projects(root, config);
    let mut outcome = LoadOutcome::default();
    outcome.stats.projects = projects.len();
    let mut seen_ids = HashSet::new();

    for project in &projects {
        for file in &project.session_files {
            let parsed = match parse_session_file(file, config.max_file_size_bytes) {
                Ok(parsed) => parsed,
                Err(e) => {
                    outcome.stats.files_failed += 1;
                    warn!(path = %file.display(), error = %format!("{:#}", e), "skipping session file");
                    continue;
                }
            };
            outcome.stats.files_read += 1;
            outcome.stats.skipped_lines += parsed.skipped_lines;
            outcome.stats.dropped_records += parsed.dropped_records;

            match build_session(file, project, parsed) {
                Ok(Some(mut session)) => {
                    session.id = unique_id(session.id, &mut seen_ids);
                    outcome.sessions.push(session);
                }
                Ok(None) => {
                    outcome.stats.empty_files += 1;
                    debug!(path = %file.display(), "session file has no messages");
                }
                Err(e) => {
                    outcome.stats.files_failed += 1;
                    warn!(path = %file.display(), error = %format!("{:#}", e), "skipping session file");
                }
            }
        }
    }

    info!(
        sessions = outcome.sessions.len(),
        projects = outcome.stats.projects,
        failed = outcome.stats.files_failed,
        "loaded sessions"
    );

    outcome
}

/// Load a single session file that belongs to `project`
pub fn load_session_file(path: &Path, project: &Project, config: &LoaderConfig) -> Result<Option<Session>> {
    let parsed = parse_session_file(path, config.max_file_size_bytes)?;
    build_session(path, project, parsed)
}

/// Creation and modification times of a session file
#[derive(Debug, Clone, Copy)]
struct FileTimes {
    born: DateTime<Utc>,
    modified: DateTime<Utc>,
}

fn file_times(path: &Path) -> Result<FileTimes> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    let modified: DateTime<Utc> = metadata
        .modified()
        .with_context(|| format!("Modification time unavailable: {}", path.display()))?
        .into();
    // Birth time is not available on every platform
    let born = metadata.created().map(DateTime::<Utc>::from).unwrap_or(modified);
    Ok(FileTimes { born, modified })
}

fn build_session(path: &Path, project: &Project, parsed: ParsedSessionFile) -> Result<Option<Session>> {
    if parsed.messages.is_empty() {
        return Ok(None);
    }

    let times = file_times(path)?;

    let created_at = parsed
        .messages
        .iter()
        .find_map(|m| m.timestamp)
        .or(parsed.started_at)
        .unwrap_or(times.born);
    let updated_at = parsed.messages.iter().rev().find_map(|m| m.timestamp).unwrap_or(times.modified);
    let updated_at = updated_at.max(created_at);

    let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let id = parsed.session_id.unwrap_or(stem);

    let title = parsed.title.or_else(|| {
        parsed
            .messages
            .iter()
            .find(|m| m.is_user())
            .or_else(|| parsed.messages.first())
            .and_then(|m| generate_title(&m.content))
    });

    Ok(Some(Session {
        id,
        title,
        created_at,
        updated_at,
        messages: parsed.messages,
        filepath: path.to_path_buf(),
        project: project.path.clone(),
        tags: parsed.tags.unwrap_or_default(),
        path_suspect: !is_plausible_path(&project.path),
    }))
}

/// Keeps ids unique within one load by suffixing repeats
fn unique_id(id: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(id.clone()) {
        return id;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", id, n);
        if seen.insert(candidate.clone()) {
            warn!(id = %id, renamed = %candidate, "duplicate session id");
            return candidate;
        }
        n += 1;
    }
}
