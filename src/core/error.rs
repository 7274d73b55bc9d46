//! Error types and one-line error condensing

use std::path::PathBuf;
use thiserror::Error;

use super::config::{ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH};

/// Failure taxonomy for scanning, classification and batch work
///
/// Only `FatalConfig` aborts a run. Everything else is scoped to a single
/// repository and ends up in the summary, the batch report or the event log.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    #[error("{}: {reason}", path.display())]
    FatalConfig { path: PathBuf, reason: String },

    #[error("no upstream configured")]
    RemoteQueryFailed,

    #[error("`{command}` failed: {message}")]
    SubprocessFailure { command: String, message: String },

    #[error("timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("could not parse `{input}`")]
    ParseFailure { input: String },
}

impl AuditError {
    /// Root path does not exist or is not a directory
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        AuditError::FatalConfig {
            path: path.into(),
            reason: "not a directory".to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditError::FatalConfig { .. })
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

/// Cleans and condenses error output for one-line display
pub fn clean_error_message(error: &str) -> String {
    let cleaned = error
        .replace('\n', " ")
        .replace('\r', "")
        .replace('\t', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("timed out") {
        // Keep the duration if present, e.g. "timed out after 180 seconds"
        match cleaned
            .split_whitespace()
            .find_map(|word| word.parse::<u64>().ok())
        {
            Some(seconds) => format!("timeout ({seconds}s)"),
            None => "timeout".to_string(),
        }
    } else if cleaned.contains("no upstream") || cleaned.contains("has no upstream branch") {
        "no upstream".to_string()
    } else if cleaned.contains("authentication") || cleaned.contains("Permission denied") {
        "authentication failed".to_string()
    } else if cleaned.contains("rejected") || cleaned.contains("non-fast-forward") {
        "push rejected (remote has new commits)".to_string()
    } else if cleaned.contains("conflict") || cleaned.contains("diverged") {
        "merge conflict".to_string()
    } else if cleaned.contains("Connection") || cleaned.contains("network") {
        "network error".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
