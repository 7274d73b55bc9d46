//! Per-repository state inference

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::operations::{
    count_unpushed_commits, current_branch, fetch, has_uncommitted_changes, upstream_branch,
};
use super::status::Classification;
use crate::core::discovery::repo_name;
use crate::core::AuditError;

/// One discovered repository and the signals read from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repository {
    pub path: PathBuf,
    pub name: String,
    pub current_branch: Option<String>,
    pub upstream: Option<String>,
    pub has_uncommitted_changes: bool,
    pub has_unpushed_commits: bool,
    pub unpushed_count: u32,
    /// Non-fatal problem met while querying the upstream
    #[serde(skip)]
    pub remote_error: Option<AuditError>,
    /// Working tree state could not be read; the repository is reported as uncommitted
    #[serde(skip)]
    pub status_error: Option<AuditError>,
}

impl Repository {
    /// Record with no signals set, named after its last path segment
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = repo_name(&path);
        Self {
            path,
            name,
            current_branch: None,
            upstream: None,
            has_uncommitted_changes: false,
            has_unpushed_commits: false,
            unpushed_count: 0,
            remote_error: None,
            status_error: None,
        }
    }

    pub fn classification(&self) -> Classification {
        Classification::from_signals(self.has_uncommitted_changes, self.has_unpushed_commits)
    }

    pub fn has_upstream(&self) -> bool {
        self.upstream.is_some()
    }
}

/// Options for [`classify_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Refresh remote-tracking refs before counting unpushed commits
    pub fetch: bool,
}

/// Reads the state of the repository at `path`
pub async fn classify(path: &Path) -> Repository {
    classify_with(path, ClassifyOptions::default()).await
}

/// Reads the state of the repository at `path`
///
/// Never fails. A missing upstream or a failing upstream query leaves the
/// unpushed signal at zero and is recorded in `remote_error`. A working tree
/// that cannot be read is recorded in `status_error` and counts as
/// uncommitted, so it is never filed as clean.
pub async fn classify_with(path: &Path, options: ClassifyOptions) -> Repository {
    let mut repo = Repository::new(path);

    match has_uncommitted_changes(path).await {
        Ok(dirty) => repo.has_uncommitted_changes = dirty,
        Err(e) => {
            warn!(repo = %path.display(), "could not read working tree state: {e}");
            repo.has_uncommitted_changes = true;
            repo.status_error = Some(e);
        }
    }
    repo.current_branch = current_branch(path).await.ok();

    if options.fetch {
        if let Err(e) = fetch(path).await {
            warn!(repo = %path.display(), "fetch failed: {e}");
        }
    }

    match upstream_branch(path).await {
        Ok(upstream) => {
            repo.upstream = Some(upstream);
            match count_unpushed_commits(path).await {
                Ok(count) => {
                    repo.unpushed_count = count;
                    repo.has_unpushed_commits = count > 0;
                }
                Err(e) => {
                    warn!(repo = %path.display(), "could not count unpushed commits: {e}");
                    repo.remote_error = Some(e);
                }
            }
        }
        Err(e) => {
            debug!(repo = %path.display(), "{e}");
            repo.remote_error = Some(e);
        }
    }

    repo
}
