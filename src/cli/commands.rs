use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use super::{Cli, Commands};
use crate::analysis::{PreviewOptions, analyze, build_preview};
use crate::export::{ExportFormat, ExportOptions, export_sessions, import_bundle};
use crate::filters::{FieldFilter, FilterExpr, FilterField, SortKey, apply_filters, parse_filter, sort_sessions};
use crate::loader::{LoadOutcome, LoaderConfig, list_projects, load_corpus};
use crate::models::{Role, Session};
use crate::search::search;
use crate::store::{delete_session, find_session, set_tags, set_title};
use crate::utils::{DEFAULT_MAX_FILE_SIZE_BYTES, format_path_with_tilde, one_line, resolve_projects_dir, safe_open_file};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const TITLE_WIDTH: usize = 60;
const HIGHLIGHT_WIDTH: usize = 120;

pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let root = resolve_projects_dir(cli.projects_dir)?;

    match command {
        Commands::Projects => show_projects(&root),
        Commands::List { project, filter, sort, limit, json } => {
            list_sessions(&root, project.as_deref(), filter.as_deref(), sort, limit, json)
        }
        Commands::Search { query, project, filter, limit, json } => {
            search_sessions(&root, &query.join(" "), project.as_deref(), filter.as_deref(), limit, json)
        }
        Commands::Show { id } => show_session(&root, &id),
        Commands::Summary { id, json } => show_summary(&root, &id, json),
        Commands::Export { format, output, project, last, ids, full_paths } => {
            let selection = Selection { project, last, ids };
            export(&root, format, output.as_deref(), &selection, !full_paths)
        }
        Commands::Import { file, query } => import(&file, query.as_deref()),
        Commands::Tag { id, tags } => tag_session(&root, &id, &tags),
        Commands::Title { id, title } => title_session(&root, &id, &title.join(" ")),
        Commands::Delete { id, yes } => remove_session(&root, &id, yes),
        Commands::Stats => show_stats(&root),
        Commands::Tui { input } => crate::tui::run_interactive(root, input.unwrap_or_default()),
    }
}

fn load(root: &Path) -> LoadOutcome {
    let outcome = load_corpus(root, &LoaderConfig::default());
    info!(root = %root.display(), sessions = outcome.sessions.len(), "loaded sessions");
    outcome
}

/// Parsed `--filter` narrowed by `--project`
fn build_filter(project: Option<&str>, filter: Option<&str>) -> Result<FilterExpr> {
    let mut expr = match filter {
        Some(input) => parse_filter(input).with_context(|| format!("Invalid filter: {}", input))?,
        None => FilterExpr::new(),
    };
    if let Some(project) = project {
        expr = expr.and(FieldFilter::new(FilterField::Project, project));
    }
    Ok(expr)
}

fn lookup<'a>(sessions: &'a [Session], id: &str) -> Result<&'a Session> {
    match find_session(sessions, id) {
        Some(session) => Ok(session),
        None => bail!("No session matches id '{}' (ids may be abbreviated to a unique prefix)", id),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn show_projects(root: &Path) -> Result<()> {
    let projects = list_projects(root, &LoaderConfig::default());
    if projects.is_empty() {
        println!("No projects found in {}", format_path_with_tilde(&root.to_string_lossy()));
        return Ok(());
    }

    for project in &projects {
        println!(
            "{:>5}  {:<30}  {}",
            project.session_count(),
            one_line(&project.name, 30),
            format_path_with_tilde(&project.path)
        );
    }
    Ok(())
}

fn list_sessions(
    root: &Path,
    project: Option<&str>,
    filter: Option<&str>,
    sort: SortKey,
    limit: usize,
    json: bool,
) -> Result<()> {
    let expr = build_filter(project, filter)?;
    let mut sessions = apply_filters(load(root).sessions, &expr);
    sort_sessions(&mut sessions, sort);
    sessions.truncate(limit);

    if json {
        return print_json(&sessions);
    }
    if sessions.is_empty() {
        println!("No sessions found");
        return Ok(());
    }

    let options = PreviewOptions { max_messages: 1, ..PreviewOptions::default() };
    for session in &sessions {
        print_session_row(session);
        let preview = build_preview(session, &options);
        if !preview.is_empty() {
            println!("    {}", one_line(&preview, HIGHLIGHT_WIDTH));
        }
    }
    Ok(())
}

fn print_session_row(session: &Session) {
    let tags = if session.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", session.tags.iter().cloned().collect::<Vec<_>>().join(", "))
    };
    println!(
        "{}  {}  {:>4} msgs  {:<20}  {}{}",
        session.id,
        session.updated_at.format(DATE_FORMAT),
        session.message_count(),
        one_line(&session.project_name(), 20),
        one_line(session.display_title(), TITLE_WIDTH),
        tags
    );
}

fn search_sessions(
    root: &Path,
    query: &str,
    project: Option<&str>,
    filter: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let expr = build_filter(project, filter)?;
    let sessions = apply_filters(load(root).sessions, &expr);
    let mut results = search(&sessions, query);
    let total = results.len();
    results.truncate(limit);

    if json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!("No sessions match '{}'", query);
        return Ok(());
    }

    for result in &results {
        println!("[{}] {}", result.score, one_line(result.session.display_title(), TITLE_WIDTH));
        println!("    {}  {}", result.session.id, result.session.updated_at.format(DATE_FORMAT));
        for found in result.matches.iter().take(3) {
            for highlight in found.highlights.iter().take(1) {
                println!("    #{}: {}", found.message_index + 1, one_line(highlight, HIGHLIGHT_WIDTH));
            }
        }
    }
    if total > results.len() {
        println!("... {} more", total - results.len());
    }
    Ok(())
}

fn show_session(root: &Path, id: &str) -> Result<()> {
    let sessions = load(root).sessions;
    let session = lookup(&sessions, id)?;

    println!("{}", session.display_title());
    println!("ID:       {}", session.id);
    println!("Project:  {}", format_path_with_tilde(&session.project));
    println!("Created:  {}", session.created_at.format(DATE_FORMAT));
    println!("Updated:  {}", session.updated_at.format(DATE_FORMAT));
    if !session.tags.is_empty() {
        println!("Tags:     {}", session.tags.iter().cloned().collect::<Vec<_>>().join(", "));
    }
    println!("File:     {}", format_path_with_tilde(&session.filepath.to_string_lossy()));

    for (index, message) in session.messages.iter().enumerate() {
        println!();
        match message.timestamp {
            Some(ts) => println!("--- {} ({}) {}", message.role, index + 1, ts.format(DATE_FORMAT)),
            None => println!("--- {} ({})", message.role, index + 1),
        }
        println!("{}", message.content);
    }
    Ok(())
}

fn show_summary(root: &Path, id: &str, json: bool) -> Result<()> {
    let sessions = load(root).sessions;
    let session = lookup(&sessions, id)?;
    let summary = analyze(session);

    if json {
        return print_json(&summary);
    }

    println!("{}", session.display_title());
    println!("{}", summary.describe());
    println!("Words: {} ({} per message), questions: {}", summary.total_words, summary.avg_words_per_message, summary.questions);
    Ok(())
}

struct Selection {
    project: Option<String>,
    last: Option<usize>,
    ids: Vec<String>,
}

/// Sessions picked by ids, else by project, then cut to the most recent N
fn select<'a>(sessions: &'a [Session], selection: &Selection) -> Result<Vec<&'a Session>> {
    let mut picked: Vec<&Session> = if !selection.ids.is_empty() {
        selection.ids.iter().map(|id| lookup(sessions, id.trim())).collect::<Result<_>>()?
    } else {
        let expr = build_filter(selection.project.as_deref(), None)?;
        sessions.iter().filter(|s| crate::filters::matches_filter(s, &expr)).collect()
    };

    if let Some(last) = selection.last {
        picked.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        picked.truncate(last);
    }
    Ok(picked)
}

fn export(
    root: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    selection: &Selection,
    normalize_projects: bool,
) -> Result<()> {
    let sessions = load(root).sessions;
    let picked = select(&sessions, selection)?;
    if picked.is_empty() {
        bail!("No sessions to export");
    }

    let rendered = export_sessions(&picked, format, &ExportOptions { normalize_projects })?;
    match output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write export: {}", path.display()))?;
            eprintln!("Exported {} sessions to {}", picked.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn import(file: &Path, query: Option<&str>) -> Result<()> {
    let mut input = String::new();
    let mut handle = safe_open_file(file, DEFAULT_MAX_FILE_SIZE_BYTES)?;
    std::io::Read::read_to_string(&mut handle, &mut input)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;

    let outcome = import_bundle(&input).with_context(|| format!("Failed to import {}", file.display()))?;
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }

    println!("Successfully imported {} of {} sessions", outcome.sessions.len(), outcome.total);
    if let Some(date) = &outcome.export_date {
        println!("Exported:  {}", date);
    }

    match query {
        Some(query) => {
            for result in search(&outcome.sessions, query) {
                println!("[{}] {}  {}", result.score, result.session.id, one_line(result.session.display_title(), TITLE_WIDTH));
                if let Some(highlight) = result.first_highlight() {
                    println!("    {}", one_line(highlight, HIGHLIGHT_WIDTH));
                }
            }
        }
        None => outcome.sessions.iter().for_each(print_session_row),
    }
    Ok(())
}

fn tag_session(root: &Path, id: &str, tags: &[String]) -> Result<()> {
    let sessions = load(root).sessions;
    let session = lookup(&sessions, id)?;
    let tags: BTreeSet<String> = tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
    set_tags(session, &tags)?;

    if tags.is_empty() {
        println!("Cleared tags on {}", session.id);
    } else {
        println!("Tagged {}: {}", session.id, tags.into_iter().collect::<Vec<_>>().join(", "));
    }
    Ok(())
}

fn title_session(root: &Path, id: &str, title: &str) -> Result<()> {
    let sessions = load(root).sessions;
    let session = lookup(&sessions, id)?;
    set_title(session, title)?;
    println!("Updated title of {}", session.id);
    Ok(())
}

fn remove_session(root: &Path, id: &str, confirmed: bool) -> Result<()> {
    let sessions = load(root).sessions;
    let session = lookup(&sessions, id)?;
    if !confirmed {
        bail!("Refusing to delete {} without --yes", session.id);
    }
    delete_session(session)?;
    println!("Deleted {} ({})", session.id, session.display_title());
    Ok(())
}

fn show_stats(root: &Path) -> Result<()> {
    let outcome = load(root);
    let sessions = &outcome.sessions;
    let stats = outcome.stats;

    let messages: usize = sessions.iter().map(Session::message_count).sum();
    let by_role = |role: Role| sessions.iter().flat_map(|s| &s.messages).filter(|m| m.role == role).count();
    let tagged = sessions.iter().filter(|s| !s.tags.is_empty()).count();

    println!("Session Statistics");
    println!("==================");
    println!("Projects: {}", stats.projects);
    println!("Sessions: {}", sessions.len());
    println!("  Tagged: {}", tagged);
    println!("Messages: {}", messages);
    println!("  User: {}", by_role(Role::User));
    println!("  Assistant: {}", by_role(Role::Assistant));
    println!("  System: {}", by_role(Role::System));
    println!();
    println!("Sessions root: {}", format_path_with_tilde(&root.to_string_lossy()));

    if let Some(oldest) = sessions.iter().map(|s| s.created_at).min() {
        println!("Oldest session: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = sessions.iter().map(|s| s.updated_at).max() {
        println!("Newest session: {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }

    if stats.files_failed > 0 || stats.skipped_lines > 0 || stats.dropped_records > 0 {
        println!();
        println!("Unreadable files: {}", stats.files_failed);
        println!("Skipped lines: {}", stats.skipped_lines);
        println!("Dropped records: {}", stats.dropped_records);
    }
    Ok(())
}
