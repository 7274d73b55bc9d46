//! Basic git operations and command execution

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::core::config::GIT_OPERATION_TIMEOUT_SECS;
use crate::core::{AuditError, Result};

// Git command arguments
const GIT_UPDATE_INDEX_ARGS: &[&str] = &["update-index", "-q", "--refresh"];
const GIT_DIFF_WORKTREE_ARGS: &[&str] = &["diff", "--quiet"];
const GIT_DIFF_CACHED_ARGS: &[&str] = &["diff", "--cached", "--quiet"];
const GIT_UNTRACKED_ARGS: &[&str] = &["ls-files", "--others", "--exclude-standard"];
const GIT_REV_PARSE_HEAD_ARGS: &[&str] = &["rev-parse", "--abbrev-ref", "HEAD"];
const GIT_SYMBOLIC_REF_ARGS: &[&str] = &["symbolic-ref", "--short", "-q", "HEAD"];
const GIT_UPSTREAM_ARGS: &[&str] = &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"];
const GIT_AHEAD_COUNT_ARGS: &[&str] = &["rev-list", "--count", "@{upstream}..HEAD"];
const GIT_UNPUSHED_LOG_ARGS: &[&str] = &["log", "--oneline", "@{upstream}..HEAD"];
const GIT_SHORT_STATUS_ARGS: &[&str] = &["status", "--short"];
const GIT_FETCH_ARGS: &[&str] = &["fetch", "--quiet"];
const GIT_ADD_ALL_ARGS: &[&str] = &["add", "-A"];
const GIT_COMMIT_ARGS: &[&str] = &["commit", "-q", "-m"];
const GIT_PUSH_ARGS: &[&str] = &["push", "--quiet"];

pub const DETACHED_HEAD_BRANCH: &str = "HEAD";

static GIT_TIMEOUT_SECS: AtomicU64 = AtomicU64::new(GIT_OPERATION_TIMEOUT_SECS);

/// Overrides the per-invocation timeout used by every git call
pub fn set_git_timeout(seconds: u64) {
    GIT_TIMEOUT_SECS.store(seconds.max(1), Ordering::Relaxed);
}

pub fn git_timeout() -> Duration {
    Duration::from_secs(GIT_TIMEOUT_SECS.load(Ordering::Relaxed))
}

/// Runs a git command in the specified directory with a timeout
/// Returns (success, stdout, stderr)
///
/// Stdout keeps its leading whitespace so porcelain columns survive.
pub async fn run_git(path: &Path, args: &[&str]) -> Result<(bool, String, String)> {
    let timeout_duration = git_timeout();
    debug!(repo = %path.display(), ?args, "git");

    let result = tokio::time::timeout(
        timeout_duration,
        Command::new("git")
            .args(args)
            .current_dir(path)
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(Ok(output)) => Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )),
        Ok(Err(e)) => Err(AuditError::SubprocessFailure {
            command: format!("git {}", args.join(" ")),
            message: e.to_string(),
        }),
        Err(_) => Err(AuditError::Timeout {
            seconds: timeout_duration.as_secs(),
        }),
    }
}

/// Runs a git command that must succeed, turning a non-zero exit into `SubprocessFailure`
async fn run_git_checked(path: &Path, args: &[&str]) -> Result<String> {
    match run_git(path, args).await? {
        (true, stdout, _) => Ok(stdout),
        (false, stdout, stderr) => Err(AuditError::SubprocessFailure {
            command: format!("git {}", args.join(" ")),
            message: if stderr.is_empty() { stdout } else { stderr },
        }),
    }
}

/// Checks whether the working tree differs from the index
pub async fn has_unstaged_changes(path: &Path) -> Result<bool> {
    // Exit status 1 means differences were found
    run_git(path, GIT_DIFF_WORKTREE_ARGS)
        .await
        .map(|(success, _, _)| !success)
}

/// Checks if repository has staged changes ready to commit
/// Returns true if there are staged changes, false if staging area is clean
pub async fn has_staged_changes(path: &Path) -> Result<bool> {
    run_git(path, GIT_DIFF_CACHED_ARGS)
        .await
        .map(|(success, _, _)| !success) // Command succeeds when NO changes (exit 0), so invert
}

/// Checks for untracked files that are not ignored
pub async fn has_untracked_files(path: &Path) -> Result<bool> {
    run_git_checked(path, GIT_UNTRACKED_ARGS)
        .await
        .map(|stdout| !stdout.trim().is_empty())
}

/// Checks if a repository has uncommitted changes
///
/// Unstaged edits, staged edits and untracked files all count. A timeout or
/// a git that cannot be spawned is an error, never "no changes".
pub async fn has_uncommitted_changes(path: &Path) -> Result<bool> {
    // Refresh the index so stat-only changes do not show up as diffs
    run_git(path, GIT_UPDATE_INDEX_ARGS).await?;

    Ok(has_unstaged_changes(path).await?
        || has_staged_changes(path).await?
        || has_untracked_files(path).await?)
}

/// Name of the checked-out branch, or `HEAD` when detached
pub async fn current_branch(path: &Path) -> Result<String> {
    if let Ok((true, branch, _)) = run_git(path, GIT_REV_PARSE_HEAD_ARGS).await {
        if !branch.is_empty() {
            return Ok(branch);
        }
    }
    // A branch without commits yet has no HEAD revision, but it still has a name
    run_git_checked(path, GIT_SYMBOLIC_REF_ARGS).await
}

/// Returns the upstream of the current branch, e.g. `origin/main`
pub async fn upstream_branch(path: &Path) -> Result<String> {
    match run_git(path, GIT_UPSTREAM_ARGS).await? {
        (true, upstream, _) if !upstream.is_empty() => Ok(upstream),
        _ => Err(AuditError::RemoteQueryFailed),
    }
}

/// Counts commits reachable from HEAD but not from its upstream
pub async fn count_unpushed_commits(path: &Path) -> Result<u32> {
    let stdout = match run_git(path, GIT_AHEAD_COUNT_ARGS).await? {
        (true, stdout, _) => stdout,
        (false, _, _) => return Err(AuditError::RemoteQueryFailed),
    };
    stdout
        .trim()
        .parse()
        .map_err(|_| AuditError::ParseFailure { input: stdout })
}

/// Refreshes remote-tracking refs
pub async fn fetch(path: &Path) -> Result<()> {
    run_git_checked(path, GIT_FETCH_ARGS).await.map(|_| ())
}

/// Short-form status listing (`git status --short`)
pub async fn short_status(path: &Path) -> Result<String> {
    run_git_checked(path, GIT_SHORT_STATUS_ARGS).await
}

/// One line per commit not yet on the upstream
pub async fn unpushed_log(path: &Path) -> Result<String> {
    run_git_checked(path, GIT_UNPUSHED_LOG_ARGS).await
}

/// Stages every change, including deletions and untracked files
pub async fn stage_all(path: &Path) -> Result<()> {
    run_git_checked(path, GIT_ADD_ALL_ARGS).await.map(|_| ())
}

/// Commits staged changes with the given message
pub async fn commit_changes(path: &Path, message: &str) -> Result<()> {
    let mut args = Vec::from(GIT_COMMIT_ARGS);
    args.push(message);
    run_git_checked(path, &args).await.map(|_| ())
}

/// Pushes the current branch to its configured upstream
pub async fn push_current_branch(path: &Path) -> Result<()> {
    run_git_checked(path, GIT_PUSH_ARGS).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn git(path: &Path, args: &[&str]) {
        StdCommand::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .unwrap();
    }

    fn init_repo() -> Option<TempDir> {
        let temp_dir = TempDir::new().unwrap();
        let ok = StdCommand::new("git")
            .args(["init", "-q"])
            .current_dir(temp_dir.path())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !ok {
            return None;
        }
        git(temp_dir.path(), &["config", "user.name", "Test User"]);
        git(temp_dir.path(), &["config", "user.email", "test@example.com"]);
        git(temp_dir.path(), &["config", "commit.gpgsign", "false"]);
        Some(temp_dir)
    }

    #[tokio::test]
    async fn test_untracked_file_counts_as_uncommitted() {
        let Some(repo) = init_repo() else { return };
        assert!(!has_uncommitted_changes(repo.path()).await.unwrap());

        std::fs::write(repo.path().join("new.txt"), "hello").unwrap();
        assert!(has_uncommitted_changes(repo.path()).await.unwrap());
        assert!(!has_staged_changes(repo.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_stage_and_commit() {
        let Some(repo) = init_repo() else { return };
        std::fs::write(repo.path().join("a.txt"), "a").unwrap();

        stage_all(repo.path()).await.unwrap();
        assert!(has_staged_changes(repo.path()).await.unwrap());

        commit_changes(repo.path(), "first").await.unwrap();
        assert!(!has_uncommitted_changes(repo.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unborn_branch_still_has_a_name() {
        let Some(repo) = init_repo() else { return };
        let branch = current_branch(repo.path()).await.unwrap();
        assert!(!branch.is_empty());
        assert_ne!(branch, DETACHED_HEAD_BRANCH);
    }

    #[tokio::test]
    async fn test_missing_upstream_is_remote_query_failure() {
        let Some(repo) = init_repo() else { return };
        assert_eq!(
            upstream_branch(repo.path()).await,
            Err(AuditError::RemoteQueryFailed)
        );
        assert_eq!(
            count_unpushed_commits(repo.path()).await,
            Err(AuditError::RemoteQueryFailed)
        );
    }

    #[tokio::test]
    async fn test_commit_failure_is_subprocess_failure() {
        let Some(repo) = init_repo() else { return };
        let err = commit_changes(repo.path(), "nothing staged").await.unwrap_err();
        assert!(matches!(err, AuditError::SubprocessFailure { .. }));
    }
}
