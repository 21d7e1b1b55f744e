use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::LoaderConfig;
use crate::models::Project;
use crate::utils::{decode_path, is_plausible_path, project_name};

/// Session files carry this extension
pub const SESSION_FILE_EXTENSION: &str = "jsonl";

/// Discover all project directories under the sessions root
///
/// Every non-hidden subdirectory of `root` is a project; its `*.jsonl` files are its
/// sessions. Directory names are decoded back to filesystem paths with
/// [`decode_path`]. Projects and files come back in file-name order.
///
/// A missing root yields an empty Vec. Unreadable entries, symlinks and anything beyond
/// the configured resource limits are logged and skipped (graceful degradation).
pub fn discover_projects(root: &Path, config: &LoaderConfig) -> Vec<Project> {
    if !root.is_dir() {
        debug!(root = %root.display(), "sessions root does not exist");
        return Vec::new();
    }

    let mut projects = Vec::new();

    for entry in one_level(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "failed to read projects directory entry");
                continue;
            }
        };

        if is_hidden(&entry) {
            continue;
        }

        // Security: project directories must not redirect reads elsewhere
        if entry.path_is_symlink() {
            warn!(path = %entry.path().display(), "skipping symlinked project directory");
            continue;
        }

        if !entry.file_type().is_dir() {
            continue;
        }

        // Security: bound the amount of work a crafted directory tree can cause
        if projects.len() >= config.max_projects {
            warn!(limit = config.max_projects, "project limit reached, ignoring remaining directories");
            break;
        }

        let encoded_name = entry.file_name().to_string_lossy().to_string();
        let path = decode_path(&encoded_name);
        if !is_plausible_path(&path) {
            debug!(encoded = %encoded_name, decoded = %path, "decoded project path looks suspect");
        }

        let session_files = session_files(entry.path(), config);
        projects.push(Project {
            name: project_name(&path),
            path,
            encoded_name,
            project_dir: entry.into_path(),
            session_files,
        });
    }

    projects
}

/// Projects that contain at least one session file, busiest first (ties by name)
pub fn list_projects(root: &Path, config: &LoaderConfig) -> Vec<Project> {
    let mut projects: Vec<Project> =
        discover_projects(root, config).into_iter().filter(|p| p.session_count() > 0).collect();
    projects.sort_by(|a, b| b.session_count().cmp(&a.session_count()).then_with(|| a.name.cmp(&b.name)));
    projects
}

fn session_files(project_dir: &Path, config: &LoaderConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in one_level(project_dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %project_dir.display(), error = %e, "failed to read project directory entry");
                continue;
            }
        };

        if is_hidden(&entry) || !has_session_extension(entry.path()) {
            continue;
        }

        // Security: skip symlinked session files
        if entry.path_is_symlink() {
            warn!(path = %entry.path().display(), "skipping symlinked session file");
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        if files.len() >= config.max_files_per_project {
            warn!(
                path = %project_dir.display(),
                limit = config.max_files_per_project,
                "session file limit reached, ignoring remaining files"
            );
            break;
        }

        files.push(entry.into_path());
    }

    files
}

fn one_level(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false).sort_by_file_name().into_iter()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn has_session_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SESSION_FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// Helper to create a project directory with the given files
    fn create_project_dir(root: &Path, encoded_name: &str, files: &[&str]) -> PathBuf {
        let project_dir = root.join(encoded_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        for filename in files {
            fs::write(project_dir.join(filename), "{}\n").expect("Failed to write session file");
        }
        project_dir
    }

    #[test]
    fn test_discover_projects_with_valid_structure() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-Users-test-github-com-org-beta", &["b.jsonl", "a.jsonl"]);
        create_project_dir(root.path(), "-Users-test-github-com-org-alpha", &["x.jsonl"]);

        let projects = discover_projects(root.path(), &LoaderConfig::default());
        assert_eq!(projects.len(), 2);

        assert_eq!(projects[0].encoded_name, "-Users-test-github-com-org-alpha");
        assert_eq!(projects[0].path, "/Users/test/github.com/org/alpha");
        assert_eq!(projects[0].name, "alpha");

        let names: Vec<_> =
            projects[1].session_files.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["a.jsonl", "b.jsonl"]);
    }

    #[test]
    fn test_discover_projects_missing_directory() {
        let root = TempDir::new().unwrap();
        let projects = discover_projects(&root.path().join("missing"), &LoaderConfig::default());
        assert!(projects.is_empty());
    }

    #[test]
    fn test_discover_ignores_files_hidden_and_other_extensions() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("stray.jsonl"), "{}").unwrap();
        create_project_dir(root.path(), ".cache", &["a.jsonl"]);
        create_project_dir(root.path(), "-Users-test-proj", &["s.jsonl", "notes.txt", ".hidden.jsonl"]);

        let projects = discover_projects(root.path(), &LoaderConfig::default());
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].session_count(), 1);
    }

    #[test]
    fn test_discover_respects_limits() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-Users-test-a", &["1.jsonl", "2.jsonl", "3.jsonl"]);
        create_project_dir(root.path(), "-Users-test-b", &["1.jsonl"]);

        let config = LoaderConfig { max_projects: 1, max_files_per_project: 2, ..LoaderConfig::default() };
        let projects = discover_projects(root.path(), &config);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].session_count(), 2);
    }

    #[test]
    fn test_list_projects_orders_by_count_then_name() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-Users-test-zeta", &["1.jsonl", "2.jsonl"]);
        create_project_dir(root.path(), "-Users-test-alpha", &["1.jsonl"]);
        create_project_dir(root.path(), "-Users-test-beta", &["1.jsonl"]);
        create_project_dir(root.path(), "-Users-test-empty", &[]);

        let projects = list_projects(root.path(), &LoaderConfig::default());
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_discover_skips_symlinks() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.jsonl"), "{}").unwrap();

        std::os::unix::fs::symlink(outside.path(), root.path().join("-Users-test-linked")).unwrap();
        let project = create_project_dir(root.path(), "-Users-test-real", &["ok.jsonl"]);
        std::os::unix::fs::symlink(outside.path().join("secret.jsonl"), project.join("link.jsonl")).unwrap();

        let projects = discover_projects(root.path(), &LoaderConfig::default());
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "real");
        assert_eq!(projects[0].session_count(), 1);
    }
}
