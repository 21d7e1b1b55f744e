//! Project directory name codec.
//!
//! The CLI that writes the transcripts stores each project under a directory whose
//! name is the project's absolute path with every non-alphanumeric character
//! replaced by `-` (so `/Users/alice/github.com/org/repo` becomes
//! `-Users-alice-github-com-org-repo`). That mapping is lossy: a `-` in the
//! encoded name may have been a `/`, a `.`, or a literal hyphen.
//!
//! [`decode_path`] reverses it heuristically with two ordered rewrite tables.
//! New shapes are added as table rows, not control flow. The result is a
//! best-effort reconstruction; [`is_plausible_path`] is the only check applied to it.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;

/// Default maximum size for a single session file: 100MB
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Whole-path rewrites, applied in order to the encoded name (leading `-` removed).
/// Each rule rewrites its first match only.
const PATH_REWRITES: &[(&str, &str)] = &[
    // Home-directory markers, consuming the user segment
    (r"^(Users|home)-([^-]+)-", "$1/$2/"),
    (r"^(Users|home)-", "$1/"),
    (r"[-/]go-src-", "/go/src/"),
    (r"[-/]src-", "/src/"),
    (r"[-/]github-com-", "/github.com/"),
    (r"[-/]gitlab-com-", "/gitlab.com/"),
    (r"[-/]bitbucket-org-", "/bitbucket.org/"),
];

/// Narrower rewrites for the part of a forge path after `<host>/<org>/`, where
/// hyphens are usually part of the repository name
const REPO_REWRITES: &[(&str, &str)] = &[
    ("-backend-terraforms-", "/backend/terraforms/"),
    ("-frontend-", "/frontend/"),
    ("-scripts-", "/scripts/"),
    ("-drive-2-backend", "-drive-2/backend"),
    ("-drive-2-", "-drive-2/"),
    ("-gdrive-backend", "-gdrive/backend"),
    ("-gdrive-frontend", "-gdrive/frontend"),
];

static PATH_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| compile(PATH_REWRITES));

static REPO_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    let escaped: Vec<(String, &'static str)> =
        REPO_REWRITES.iter().map(|(p, r)| (regex::escape(p), *r)).collect();
    escaped
        .iter()
        .filter_map(|(p, r)| Regex::new(p).ok().map(|re| (re, *r)))
        .collect()
});

/// `<host>/<org>` followed by the rest of the path; the org ends at the first
/// `-` or `/`, so organisations with hyphens in their name decode wrongly
static FORGE_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.*?)(?P<host>github\.com|gitlab\.com|bitbucket\.org)/(?P<org>[^/-]+)[-/](?P<rest>.+)$")
        .ok()
});

fn compile(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules.iter().filter_map(|(p, r)| Regex::new(p).ok().map(|re| (re, *r))).collect()
}

fn apply_rules(input: &str, rules: &[(Regex, &'static str)]) -> String {
    rules.iter().fold(input.to_string(), |acc, (re, replacement)| {
        re.replace(&acc, *replacement).into_owned()
    })
}

/// Encodes a filesystem path the way the transcript writer names project directories
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ccsearch::encode_path;
///
/// assert_eq!(encode_path(Path::new("/Users/alice/github.com/org/repo")), "-Users-alice-github-com-org-repo");
/// ```
pub fn encode_path(path: &Path) -> String {
    let path_str = path.to_string_lossy();
    let encoded: String =
        path_str.chars().map(|c| if c.is_alphanumeric() || c == '-' { c } else { '-' }).collect();
    if encoded.starts_with('-') { encoded } else { format!("-{}", encoded) }
}

/// Decodes a project directory name back to a best-guess filesystem path
///
/// # Examples
///
/// ```
/// use ccsearch::decode_path;
///
/// assert_eq!(decode_path("-Users-alice-github-com-org-repo"), "/Users/alice/github.com/org/repo");
/// ```
pub fn decode_path(encoded: &str) -> String {
    let without_prefix = encoded.strip_prefix('-').unwrap_or(encoded);
    let mut working = apply_rules(without_prefix, &PATH_RULES);

    if let Some(re) = FORGE_SHAPE.as_ref()
        && let Some(caps) = re.captures(&working)
    {
        let rest = apply_rules(&caps["rest"], &REPO_RULES);
        working = format!("{}{}/{}/{}", &caps["prefix"], &caps["host"], &caps["org"], rest);
    }

    format!("/{}", working)
}

/// Display name of a project: the last non-empty path segment
pub fn project_name(decoded: &str) -> String {
    decoded
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(decoded)
        .to_string()
}

/// Basic sanity check for a decoded project path
///
/// A plausible path is absolute, has at least two segments, and contains no empty
/// or `..` segments. Failing paths are still used but the session is flagged.
pub fn is_plausible_path(decoded: &str) -> bool {
    let Some(body) = decoded.strip_prefix('/') else {
        return false;
    };
    let segments: Vec<&str> = body.split('/').collect();
    segments.len() >= 2 && segments.iter().all(|s| !s.is_empty() && *s != "..")
}

/// Validates that a file's size is within the configured limit
///
/// Takes an open file handle so the size check and the read see the same file.
pub fn validate_file_size(file: &File, path: &Path, max_bytes: u64) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > max_bytes {
        bail!("File too large: {} ({} bytes, max {} bytes)", path.display(), file_size, max_bytes);
    }

    Ok(())
}

/// Rejects symlinks so a project directory cannot redirect reads elsewhere
pub fn validate_path_not_symlink(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    if metadata.file_type().is_symlink() {
        bail!("Path is a symlink: {}", path.display());
    }
    Ok(())
}

/// Opens a session file for reading without following a final symlink, then checks its size
pub fn safe_open_file(path: &Path, max_bytes: u64) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }

    let file =
        options.open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    validate_file_size(&file, path, max_bytes)?;
    Ok(file)
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use ccsearch::format_path_with_tilde;
///
/// // Returns "~/Documents" if HOME=/Users/alice
/// let formatted = format_path_with_tilde("/Users/alice/Documents");
/// ```
pub fn format_path_with_tilde(path: &str) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &str, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    if let Some(home) = home
        && !home.is_empty()
        && path.starts_with(home)
    {
        return path.replacen(home, "~", 1);
    }

    path.to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_decode_fixture() {
        assert_eq!(decode_path("-Users-alice-github-com-org-repo"), "/Users/alice/github.com/org/repo");
    }

    #[test]
    fn test_decode_go_src_layout() {
        assert_eq!(
            decode_path("-Users-yuma-go-src-github-com-identifyinc-delmo-backend"),
            "/Users/yuma/go/src/github.com/identifyinc/delmo-backend"
        );
    }

    #[test]
    fn test_decode_linux_home() {
        assert_eq!(decode_path("-home-bob-gitlab-com-team-service"), "/home/bob/gitlab.com/team/service");
        assert_eq!(decode_path("-home-bob"), "/home/bob");
    }

    #[test]
    fn test_decode_preserves_repo_hyphens() {
        assert_eq!(
            decode_path("-Users-alice-github-com-acme-my-cool-repo"),
            "/Users/alice/github.com/acme/my-cool-repo"
        );
    }

    #[test]
    fn test_decode_repo_substructure() {
        assert_eq!(
            decode_path("-Users-alice-github-com-acme-shop-frontend-src"),
            "/Users/alice/github.com/acme/shop-frontend-src"
        );
        assert_eq!(
            decode_path("-Users-alice-github-com-acme-shop-frontend-app"),
            "/Users/alice/github.com/acme/shop/frontend/app"
        );
        assert_eq!(
            decode_path("-Users-alice-github-com-acme-files-gdrive-backend"),
            "/Users/alice/github.com/acme/files-gdrive/backend"
        );
    }

    #[test]
    fn test_decode_bitbucket() {
        assert_eq!(
            decode_path("-Users-alice-bitbucket-org-team-api"),
            "/Users/alice/bitbucket.org/team/api"
        );
    }

    #[test]
    fn test_decode_unknown_shape_keeps_hyphens() {
        // No known markers: only the leading separator is restored
        assert_eq!(decode_path("-opt-data"), "/opt-data");
        assert!(!is_plausible_path(&decode_path("-opt-data")));
    }

    #[test]
    fn test_decode_without_leading_hyphen() {
        assert_eq!(decode_path("Users-alice-notes"), "/Users/alice/notes");
    }

    #[test]
    fn test_encode_round_trip_fixture() {
        let original = "/Users/alice/github.com/org/repo";
        let encoded = encode_path(Path::new(original));
        assert_eq!(encoded, "-Users-alice-github-com-org-repo");
        assert_eq!(decode_path(&encoded), original);
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name("/Users/alice/github.com/org/repo"), "repo");
        assert_eq!(project_name("/Users/alice/"), "alice");
        assert_eq!(project_name("/"), "/");
    }

    #[test]
    fn test_is_plausible_path() {
        assert!(is_plausible_path("/Users/alice"));
        assert!(is_plausible_path("/Users/alice/github.com/org/repo"));
        assert!(!is_plausible_path("Users/alice"));
        assert!(!is_plausible_path("/single"));
        assert!(!is_plausible_path("/Users//alice"));
        assert!(!is_plausible_path("/Users/../etc"));
    }

    #[test]
    fn test_safe_open_file_rejects_oversized() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'x'; 64]).unwrap();
        file.flush().unwrap();

        assert!(safe_open_file(file.path(), 1024).is_ok());
        let err = safe_open_file(file.path(), 16).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_safe_open_file_missing() {
        let err = safe_open_file(Path::new("/nonexistent/session.jsonl"), 1024).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_path_not_symlink() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("target.jsonl");
        fs::write(&target, "{}").unwrap();
        let link = dir.path().join("link.jsonl");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(validate_path_not_symlink(&target).is_ok());
        assert!(validate_path_not_symlink(&link).is_err());
    }

    #[test]
    fn test_format_path_with_tilde() {
        let formatted =
            format_path_with_tilde_internal("/Users/testuser/Documents/project", Some("/Users/testuser"));
        assert_eq!(formatted, "~/Documents/project");

        let formatted2 = format_path_with_tilde_internal("/opt/local/bin", Some("/Users/testuser"));
        assert_eq!(formatted2, "/opt/local/bin");
    }
}
