//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Repository discovery
//! - The scan pipeline and its result buckets
//! - Error taxonomy and configuration
//!
//! Internal implementation details are not exposed through this API.

// Core types
pub use super::error::{clean_error_message, AuditError, Result};
pub use super::summary::{aggregate, ScanResult, ATTENTION_ORDER};

// Discovery and scanning
pub use super::discovery::{is_repo_root, walk, walk_with, RepoWalk, WalkOptions};
pub use super::scan::{discover, scan, ScanOptions};

// Configuration
pub use super::config::{get_git_concurrency, FleetConfig, MaintenanceConfig, GIT_CONCURRENT_CAP};

// Time
pub use super::clock::{commit_message, Clock, FixedClock, SystemClock};

// User-facing messages
pub use super::config::{NO_REPOS_MESSAGE, SCANNING_MESSAGE};

// Progress reporting
pub use super::progress::create_scan_progress;

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};
