//! A working tree query that outlives the git timeout
//!
//! Kept in its own test binary: the timeout is process-wide.
#![cfg(unix)]

use anyhow::Result;
use std::os::unix::fs::PermissionsExt;

use repo_fleet::batch::{apply_one, BatchOptions, Outcome};
use repo_fleet::core::{AuditError, SystemClock};
use repo_fleet::git::operations::set_git_timeout;
use repo_fleet::git::{classify, Classification};

mod common;
use common::{commit_count, git, is_git_available, TestFleet};

#[tokio::test]
async fn test_slow_status_query_is_not_reported_clean() -> Result<()> {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return Ok(());
    }

    let fleet = TestFleet::new()?;
    let path = fleet.repo("slow").with_untracked_file().build()?;

    // Every index read now waits on a monitor hook that outlives the timeout
    let hook = path.join(".git").join("slow-fsmonitor");
    std::fs::write(&hook, "#!/bin/sh\nsleep 3\n")?;
    std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755))?;
    git(&path, &["config", "core.fsmonitor", &*hook.to_string_lossy()])?;
    set_git_timeout(1);

    let repo = classify(&path).await;
    assert_eq!(repo.status_error, Some(AuditError::Timeout { seconds: 1 }));
    assert!(repo.has_uncommitted_changes);
    assert_ne!(repo.classification(), Classification::Clean);

    let result = apply_one(&repo, &BatchOptions::execute(), &SystemClock).await;
    assert!(matches!(result.outcome, Outcome::Failed(_)));
    assert!(!result.committed);
    assert_eq!(commit_count(&path)?, 1);

    Ok(())
}
