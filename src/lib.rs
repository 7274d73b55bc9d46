//! # repo-fleet
//!
//! `repo-fleet` finds every Git repository below a directory, works out which
//! ones have uncommitted changes or unpushed commits, and commits and pushes
//! a chosen subset in one batch. It powers the `repo-fleet` CLI tool.
//!
//! ## Core Features
//!
//! - **Discovery**: Lazy, depth-bounded walk using `ignore` that never descends into a repository.
//! - **Classification**: Four disjoint states derived from git's own plumbing, classified concurrently.
//! - **Batch Operations**: Commit-then-push per repository with per-repository failure isolation.
//! - **Maintenance**: Scheduled linting, fixing and reporting across several roots.
//!
//! ## Example
//!
//! ```rust,no_run
//! use repo_fleet::core::{scan, ScanOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = scan(Path::new("."), &ScanOptions::default(), None).await.unwrap();
//!     for repo in result.needs_attention() {
//!         println!("{}: {}", repo.name, repo.classification().text());
//!     }
//! }
//! ```

pub mod batch;
pub mod commands;
pub mod core;
pub mod git;
pub mod maintenance;
pub mod utils;
