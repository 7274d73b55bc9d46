//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{TestFleet, TestRepoBuilder};
pub use self::git::{commit_count, git, is_git_available, remote_commit_count, setup_git_repo};
