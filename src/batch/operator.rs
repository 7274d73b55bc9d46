//! Commit-then-push across a selection of repositories
//!
//! Each repository runs through the same small state machine:
//! dirty check → stage + commit → upstream check → push. The first failure
//! ends work on that repository only; the batch moves on to the next one.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::clock::{commit_message, Clock};
use crate::core::config::{AUTO_COMMIT_PREFIX, NAME_DISPLAY_WIDTH};
use crate::core::{clean_error_message, AuditError};
use crate::git::operations::{
    commit_changes, count_unpushed_commits, has_staged_changes, push_current_branch, stage_all,
    upstream_branch,
};
use crate::git::Repository;

/// Why a repository ended without a push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Nothing to commit and nothing to push
    NothingToDo,
    /// No upstream is configured for the current branch
    NoRemote,
    /// Dry run; the plan was reported but not carried out
    DryRun,
    /// The batch was cancelled before this repository was reached
    Cancelled,
}

/// Terminal state of one repository in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Committed,
    Pushed,
    Skipped(SkipReason),
    Failed(String),
}

impl Outcome {
    /// Returns the emoji symbol for this outcome
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Committed | Outcome::Pushed => "🟢",
            Outcome::Skipped(SkipReason::NoRemote) => "🟡",
            Outcome::Skipped(_) => "🟠",
            Outcome::Failed(_) => "🔴",
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &'static str {
        match self {
            Outcome::Committed => "committed",
            Outcome::Pushed => "pushed",
            Outcome::Skipped(SkipReason::NothingToDo) => "no-changes",
            Outcome::Skipped(SkipReason::NoRemote) => "no-remote",
            Outcome::Skipped(SkipReason::DryRun) => "dry-run",
            Outcome::Skipped(SkipReason::Cancelled) => "cancelled",
            Outcome::Failed(_) => "failed",
        }
    }
}

/// Result for a single repository
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoOutcome {
    pub name: String,
    pub path: PathBuf,
    /// A commit was created, whatever happened afterwards
    pub committed: bool,
    pub outcome: Outcome,
    pub detail: String,
}

impl RepoOutcome {
    fn new(repo: &Repository, committed: bool, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            name: repo.name.clone(),
            path: repo.path.clone(),
            committed,
            outcome,
            detail: detail.into(),
        }
    }
}

/// Knobs for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Report what would happen without touching any repository
    pub dry_run: bool,
    /// Prefix for the auto-generated commit message
    pub commit_prefix: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            commit_prefix: AUTO_COMMIT_PREFIX.to_string(),
        }
    }
}

impl BatchOptions {
    /// Options that really commit and push
    pub fn execute() -> Self {
        Self {
            dry_run: false,
            ..Self::default()
        }
    }
}

/// Shared flag that stops a batch between repositories
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcomes of one batch, in selection order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<RepoOutcome>,
}

impl BatchReport {
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn commits_created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.committed).count()
    }

    /// One-line tally
    pub fn generate_summary(&self) -> String {
        let pushed = self.count(|o| matches!(o, Outcome::Pushed));
        let skipped = self.count(|o| matches!(o, Outcome::Skipped(_)));
        let mut summary = format!(
            "✅ Batch finished • {} committed • {} pushed • {} skipped",
            self.commits_created(),
            pushed,
            skipped
        );
        let failed = self.failed();
        if failed > 0 {
            summary.push_str(&format!(" • {failed} failed"));
        }
        summary
    }

    /// Tree listing of every outcome
    pub fn render(&self) -> String {
        let max_name_length = self
            .outcomes
            .iter()
            .map(|o| o.name.len())
            .max()
            .unwrap_or(0)
            .min(NAME_DISPLAY_WIDTH);

        let mut lines: Vec<String> = self
            .outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let tree_char = if i == self.outcomes.len() - 1 { "└─" } else { "├─" };
                format!(
                    "   {} {} {:width$} {:<10}   {}",
                    tree_char,
                    o.outcome.symbol(),
                    o.name,
                    o.outcome.text(),
                    o.detail,
                    width = max_name_length
                )
                .trim_end()
                .to_string()
            })
            .collect();
        lines.push(String::new());
        lines.push(self.generate_summary());
        lines.join("\n")
    }
}

fn failed(repo: &Repository, committed: bool, step: &str, error: &AuditError) -> RepoOutcome {
    let reason = format!("{step} failed: {}", clean_error_message(&error.to_string()));
    warn!(repo = %repo.name, "{reason}");
    RepoOutcome::new(repo, committed, Outcome::Failed(reason.clone()), reason)
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        "commit"
    } else {
        "commits"
    }
}

/// Runs the commit/push state machine for one repository
///
/// The record only says what was true at scan time; upstream and ahead
/// counts are re-read from the repository before pushing.
pub async fn apply_one(repo: &Repository, options: &BatchOptions, clock: &dyn Clock) -> RepoOutcome {
    let path = repo.path.as_path();
    let mut committed = false;

    // Never stage a working tree whose state was not read
    if let Some(e) = &repo.status_error {
        return failed(repo, false, "status", e);
    }

    // CheckDirty
    if repo.has_uncommitted_changes && !options.dry_run {
        if let Err(e) = stage_all(path).await {
            return failed(repo, false, "stage", &e);
        }
        match has_staged_changes(path).await {
            Ok(true) => {
                let message = commit_message(&options.commit_prefix, clock);
                if let Err(e) = commit_changes(path, &message).await {
                    return failed(repo, false, "commit", &e);
                }
                committed = true;
            }
            // Changes disappeared between scan and apply
            Ok(false) => {}
            Err(e) => return failed(repo, false, "stage", &e),
        }
    }

    let will_commit = committed || (options.dry_run && repo.has_uncommitted_changes);
    if !will_commit && !repo.has_unpushed_commits {
        return RepoOutcome::new(
            repo,
            false,
            Outcome::Skipped(SkipReason::NothingToDo),
            "nothing to commit or push",
        );
    }

    // CheckAhead
    let upstream = match upstream_branch(path).await {
        Ok(upstream) => upstream,
        Err(AuditError::RemoteQueryFailed) => {
            let detail = if options.dry_run {
                "would commit locally; no upstream to push to"
            } else if committed {
                "committed locally; no upstream to push to"
            } else {
                "no upstream to push to"
            };
            return RepoOutcome::new(repo, committed, Outcome::Skipped(SkipReason::NoRemote), detail);
        }
        Err(e) => return failed(repo, committed, "upstream check", &e),
    };

    if options.dry_run {
        let detail = if repo.has_uncommitted_changes {
            format!("would commit and push to {upstream}")
        } else {
            format!(
                "would push {} {} to {upstream}",
                repo.unpushed_count,
                plural(repo.unpushed_count)
            )
        };
        return RepoOutcome::new(repo, false, Outcome::Skipped(SkipReason::DryRun), detail);
    }

    let ahead = match count_unpushed_commits(path).await {
        Ok(ahead) => ahead,
        Err(e) => return failed(repo, committed, "ahead count", &e),
    };

    if ahead == 0 {
        return if committed {
            RepoOutcome::new(repo, true, Outcome::Committed, "committed; nothing to push")
        } else {
            RepoOutcome::new(
                repo,
                false,
                Outcome::Skipped(SkipReason::NothingToDo),
                "already up to date",
            )
        };
    }

    // Done
    match push_current_branch(path).await {
        Ok(()) => {
            let verb = if committed { "committed, pushed" } else { "pushed" };
            RepoOutcome::new(
                repo,
                committed,
                Outcome::Pushed,
                format!("{verb} {ahead} {} to {upstream}", plural(ahead)),
            )
        }
        Err(e) => failed(repo, committed, "push", &e),
    }
}

/// Applies the batch to `selection`, one repository after another
///
/// Failures stay with their repository. When `cancel` is raised the
/// remaining repositories are reported as cancelled; work already done is
/// kept.
pub async fn apply(
    selection: &[&Repository],
    options: &BatchOptions,
    clock: &dyn Clock,
    cancel: &CancelFlag,
) -> BatchReport {
    let mut report = BatchReport::default();

    for repo in selection {
        let outcome = if cancel.is_cancelled() {
            RepoOutcome::new(
                repo,
                false,
                Outcome::Skipped(SkipReason::Cancelled),
                "batch cancelled",
            )
        } else {
            apply_one(repo, options, clock).await
        };
        info!(
            repo = %outcome.name,
            outcome = outcome.outcome.text(),
            committed = outcome.committed,
            "{}",
            outcome.detail
        );
        report.outcomes.push(outcome);
    }

    report
}
