//! Repository discovery
//!
//! Walks a directory tree and yields every repository root it meets. A
//! repository is a leaf: once a directory is recognised as a repository
//! nothing below it is visited, so nested repositories are only ever reported
//! as their outermost ancestor.

use ignore::{DirEntry, Walk, WalkBuilder};
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::{DEFAULT_REPO_NAME, MAX_SCAN_DEPTH, SKIP_DIRECTORIES, UNKNOWN_REPO_NAME};
use super::error::{AuditError, Result};

const GIT_MARKER: &str = ".git";

/// Check if a .git file (for submodules/worktrees) contains gitdir reference
/// Only reads the first 5 lines for efficiency
fn is_git_file(path: &Path) -> bool {
    match fs::File::open(path) {
        Ok(file) => {
            let reader = BufReader::new(file);
            reader
                .lines()
                .take(5)
                .map_while(std::result::Result::ok)
                .any(|line| line.trim_start().starts_with("gitdir:"))
        }
        Err(_) => false,
    }
}

/// Returns true when `path` carries a version-control marker
pub fn is_repo_root(path: &Path) -> bool {
    let marker = path.join(GIT_MARKER);
    match fs::metadata(&marker) {
        Ok(meta) if meta.is_dir() => true,
        Ok(meta) if meta.is_file() => is_git_file(&marker),
        _ => false,
    }
}

/// Options controlling a walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub max_depth: usize,
    pub skip_directories: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_SCAN_DEPTH,
            skip_directories: SKIP_DIRECTORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Lazy sequence of repository roots below one directory
///
/// Siblings come out sorted by file name. The walk is bounded by the
/// configured depth, which also bounds symlink cycles.
pub struct RepoWalk {
    root: PathBuf,
    inner: Walk,
}

impl RepoWalk {
    /// Absolute root this walk started from
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for RepoWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for result in self.inner.by_ref() {
            match result {
                Ok(entry) => {
                    if is_dir(&entry) && is_repo_root(entry.path()) {
                        debug!(path = %entry.path().display(), "found repository");
                        return Some(entry.into_path());
                    }
                }
                Err(e) => warn!("skipping unreadable entry: {e}"),
            }
        }
        None
    }
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
}

/// Walks `root` with the default skip list and the given depth ceiling
pub fn walk(root: impl AsRef<Path>, max_depth: usize) -> Result<RepoWalk> {
    walk_with(
        root,
        &WalkOptions {
            max_depth,
            ..WalkOptions::default()
        },
    )
}

/// Walks `root`, failing with a fatal error when it is not a directory
pub fn walk_with(root: impl AsRef<Path>, options: &WalkOptions) -> Result<RepoWalk> {
    let root = root.as_ref();
    let root = root
        .canonicalize()
        .map_err(|_| AuditError::not_a_directory(root))?;
    if !root.is_dir() {
        return Err(AuditError::not_a_directory(root));
    }

    let skip: Arc<Vec<String>> = Arc::new(options.skip_directories.clone());

    let inner = WalkBuilder::new(&root)
        .standard_filters(false) // .gitignore and hidden rules do not apply here
        .follow_links(true) // Follow symlinks to find symlinked repos
        .max_depth(Some(options.max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            if !is_dir(entry) {
                return false;
            }
            // Never descend into a repository
            if entry.path().parent().is_some_and(is_repo_root) {
                return false;
            }
            // The skip list only prunes plain directories
            if is_repo_root(entry.path()) {
                return true;
            }
            let file_name = entry.file_name().to_str().unwrap_or("");
            !skip.iter().any(|s| s == file_name)
        })
        .build();

    Ok(RepoWalk { root, inner })
}

/// Display label for a repository: its last path segment
pub fn repo_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if path.parent().is_none() {
                DEFAULT_REPO_NAME.to_string()
            } else {
                UNKNOWN_REPO_NAME.to_string()
            }
        })
}

/// Assigns unique display names, suffixing repeats with `-2`, `-3`, ...
pub fn unique_names<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<String> {
    let mut name_counts: HashMap<String, usize> = HashMap::new();
    paths
        .into_iter()
        .map(|path| {
            let base_name = repo_name(path);
            let count = name_counts.entry(base_name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{base_name}-{count}")
            } else {
                base_name
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_repo(path: &Path) {
        fs::create_dir_all(path.join(GIT_MARKER)).unwrap();
    }

    #[test]
    fn test_git_file_with_gitdir_is_a_repo() {
        let temp_dir = TempDir::new().unwrap();
        let worktree = temp_dir.path().join("wt");
        fs::create_dir(&worktree).unwrap();
        fs::write(worktree.join(GIT_MARKER), "gitdir: /somewhere/.git/worktrees/wt\n").unwrap();
        assert!(is_repo_root(&worktree));

        let bogus = temp_dir.path().join("bogus");
        fs::create_dir(&bogus).unwrap();
        fs::write(bogus.join(GIT_MARKER), "not a pointer\n").unwrap();
        assert!(!is_repo_root(&bogus));
    }

    #[test]
    fn test_walk_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let err = walk(temp_dir.path().join("missing"), MAX_SCAN_DEPTH).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_walk_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(walk(&file, MAX_SCAN_DEPTH).is_err());
    }

    #[test]
    fn test_walk_treats_repos_as_leaves() {
        let temp_dir = TempDir::new().unwrap();
        let outer = temp_dir.path().join("outer");
        fake_repo(&outer);
        fake_repo(&outer.join("inner"));
        fake_repo(&temp_dir.path().join("group").join("other"));

        let mut found: Vec<String> = walk(temp_dir.path(), MAX_SCAN_DEPTH)
            .unwrap()
            .map(|p| repo_name(&p))
            .collect();
        found.sort();
        assert_eq!(found, vec!["other", "outer"]);
    }

    #[test]
    fn test_walk_yields_siblings_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["charlie", "alpha", "bravo"] {
            fake_repo(&temp_dir.path().join(name));
        }
        let found: Vec<String> = walk(temp_dir.path(), MAX_SCAN_DEPTH)
            .unwrap()
            .map(|p| repo_name(&p))
            .collect();
        assert_eq!(found, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_walk_skips_excluded_directories() {
        let temp_dir = TempDir::new().unwrap();
        fake_repo(&temp_dir.path().join("node_modules").join("pkg"));
        fake_repo(&temp_dir.path().join(".venv").join("src").join("dep"));
        fake_repo(&temp_dir.path().join("app"));

        let found: Vec<PathBuf> = walk(temp_dir.path(), MAX_SCAN_DEPTH).unwrap().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(repo_name(&found[0]), "app");
    }

    #[test]
    fn test_repos_named_like_skipped_directories_are_found() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["app", "build", "env", "target"] {
            fake_repo(&temp_dir.path().join(name));
        }
        // A plain `build` directory is still pruned
        fake_repo(&temp_dir.path().join("tools").join("build").join("hidden"));

        let found: Vec<String> = walk(temp_dir.path(), MAX_SCAN_DEPTH)
            .unwrap()
            .map(|p| repo_name(&p))
            .collect();
        assert_eq!(found, vec!["app", "build", "env", "target"]);
    }

    #[test]
    fn test_walk_respects_depth_ceiling() {
        let temp_dir = TempDir::new().unwrap();
        fake_repo(&temp_dir.path().join("a").join("b").join("shallow"));
        fake_repo(&temp_dir.path().join("a").join("b").join("c").join("d").join("deep"));

        let found: Vec<String> = walk(temp_dir.path(), 3)
            .unwrap()
            .map(|p| repo_name(&p))
            .collect();
        assert_eq!(found, vec!["shallow"]);
    }

    #[test]
    fn test_root_that_is_a_repo_is_yielded_alone() {
        let temp_dir = TempDir::new().unwrap();
        fake_repo(temp_dir.path());
        fake_repo(&temp_dir.path().join("vendored"));

        let found: Vec<PathBuf> = walk(temp_dir.path(), MAX_SCAN_DEPTH).unwrap().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_unique_names_suffix_duplicates() {
        let paths = [
            PathBuf::from("/a/app"),
            PathBuf::from("/b/app"),
            PathBuf::from("/c/lib"),
            PathBuf::from("/d/app"),
        ];
        let names = unique_names(paths.iter().map(PathBuf::as_path));
        assert_eq!(names, vec!["app", "app-2", "lib", "app-3"]);
    }
}
