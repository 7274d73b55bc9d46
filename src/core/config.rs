//! Configuration constants and settings

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::AuditError;

// Concurrency Configuration
//
// Classification is read-only and I/O-bound, so it runs several git processes at
// once. Batch commit/push work always runs one repository at a time.

// Default concurrency cap to keep the number of live git processes reasonable
pub const GIT_CONCURRENT_CAP: usize = 12;

/// Environment variable that overrides the classification concurrency
pub const JOBS_ENV_VAR: &str = "REPO_FLEET_JOBS";

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV_VAR: &str = "REPO_FLEET_CONFIG";

/// Determines the concurrency limit for classification based on CLI args and system resources
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs N flag → N
/// 3. REPO_FLEET_JOBS env var → N
/// 4. Smart default → min(CPU_CORES + 2, 12)
pub fn get_git_concurrency(jobs: Option<usize>, sequential: bool) -> usize {
    if sequential {
        return 1;
    }

    if let Some(n) = jobs {
        return n.max(1);
    }

    if let Ok(env_concurrency) = std::env::var(JOBS_ENV_VAR) {
        if let Ok(n) = env_concurrency.parse::<usize>() {
            if n > 0 {
                return n;
            }
        }
    }

    let cpu_count = num_cpus::get();
    (cpu_count + 2).min(GIT_CONCURRENT_CAP)
}

// Timeout constants
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 180; // 3 minutes per git invocation
pub const LINTER_TIMEOUT_SECS: u64 = 300;

// Progress bar configuration
pub const PROGRESS_TEMPLATE: &str = "{spinner} {prefix:.bold} {wide_msg}";
pub const PROGRESS_TICK_MS: u64 = 120;
pub const DEFAULT_REPO_NAME: &str = "current";
pub const UNKNOWN_REPO_NAME: &str = "unknown";

// UI Constants
pub const SCANNING_MESSAGE: &str = "🔍 Scanning for git repositories...";
pub const NO_REPOS_MESSAGE: &str = "No git repositories found.";
pub const ALL_CLEAN_MESSAGE: &str = "✅ All repositories are clean and up to date";
pub const SEPARATOR_WIDTH: usize = 70;

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 30;
pub const NAME_DISPLAY_WIDTH: usize = 20;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 40;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 37;
pub const CHANGED_FILES_DISPLAY_LIMIT: usize = 10;

// Commit message prefixes
pub const AUTO_COMMIT_PREFIX: &str = "Auto-commit:";
pub const FIX_COMMIT_PREFIX: &str = "Fix whitespace:";
pub const COMMIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Directories to skip during repository search
pub const SKIP_DIRECTORIES: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "target",
    "build",
    ".next",
    "dist",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".tox",
];

// Repository discovery configuration
pub const MAX_SCAN_DEPTH: usize = 10; // Maximum directory depth to scan

// Maintenance defaults
pub const DEFAULT_LOG_PATH: &str = "/var/log/repo-fleet/maintenance.log";
pub const DEFAULT_LINTER: &str = "whitespace-check";
pub const DEFAULT_LINTER_CHECK_ARGS: &[&str] = &["-q", "-r"];
pub const DEFAULT_LINTER_FIX_ARGS: &[&str] = &["-f", "-q", "-r"];
pub const DEFAULT_MAIL_COMMAND: &str = "mail";
pub const LINTER_ISSUES_ANCHOR: &str = "Total issues found:";

/// User configuration loaded from `config.toml`
///
/// Every field is optional; unset fields fall back to the constants above.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FleetConfig {
    pub max_depth: Option<usize>,
    pub extra_skip_directories: Vec<String>,
    pub git_timeout_secs: Option<u64>,
    pub maintenance: MaintenanceConfig,
}

/// `[maintenance]` table of the config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenanceConfig {
    pub dirs: Vec<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub linter: Option<String>,
    pub check_args: Option<Vec<String>>,
    pub fix_args: Option<Vec<String>>,
    pub mail_command: Option<String>,
    pub commit_message: Option<String>,
}

impl FleetConfig {
    /// Location of the config file
    ///
    /// `$REPO_FLEET_CONFIG` wins when set, otherwise `<config_dir>/repo-fleet/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("repo-fleet").join("config.toml"))
    }

    /// Loads the config from the default location, returning defaults when absent
    pub fn load() -> Result<Self, AuditError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads the config from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, AuditError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(AuditError::FatalConfig {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        Self::parse(&content).map_err(|reason| AuditError::FatalConfig {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(MAX_SCAN_DEPTH)
    }

    pub fn git_timeout_secs(&self) -> u64 {
        self.git_timeout_secs.unwrap_or(GIT_OPERATION_TIMEOUT_SECS)
    }

    /// Built-in skip list plus any configured extras
    pub fn skip_directories(&self) -> Vec<String> {
        SKIP_DIRECTORIES
            .iter()
            .map(|s| s.to_string())
            .chain(self.extra_skip_directories.iter().cloned())
            .collect()
    }
}

impl MaintenanceConfig {
    pub fn linter(&self) -> String {
        self.linter.clone().unwrap_or_else(|| DEFAULT_LINTER.to_string())
    }

    pub fn check_args(&self) -> Vec<String> {
        self.check_args
            .clone()
            .unwrap_or_else(|| to_owned_args(DEFAULT_LINTER_CHECK_ARGS))
    }

    pub fn fix_args(&self) -> Vec<String> {
        self.fix_args
            .clone()
            .unwrap_or_else(|| to_owned_args(DEFAULT_LINTER_FIX_ARGS))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
    }

    pub fn mail_command(&self) -> String {
        self.mail_command
            .clone()
            .unwrap_or_else(|| DEFAULT_MAIL_COMMAND.to_string())
    }

    pub fn commit_prefix(&self) -> String {
        self.commit_message
            .clone()
            .unwrap_or_else(|| FIX_COMMIT_PREFIX.to_string())
    }
}

fn to_owned_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
