//! Public API for git operations.
//!
//! This module provides the stable public API for git-related functionality:
//! - Repository classification
//! - Detailed per-repository reports
//! - The individual queries and write operations used by batch work
//!
//! ## Example: Classifying one repository
//!
//! ```rust,no_run
//! use repo_fleet::git::classify;
//! use std::path::Path;
//!
//! async fn check(path: &Path) {
//!     let repo = classify(path).await;
//!     println!("{} is {}", repo.name, repo.classification().text());
//! }
//! ```

pub use super::classify::{classify, classify_with, ClassifyOptions, Repository};
pub use super::details::report;
pub use super::status::Classification;

pub use super::operations::{
    commit_changes, count_unpushed_commits, current_branch, fetch, has_staged_changes,
    has_uncommitted_changes, has_untracked_files, has_unstaged_changes, push_current_branch,
    run_git, set_git_timeout, short_status, stage_all, unpushed_log, upstream_branch,
};
