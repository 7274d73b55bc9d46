//! Structured maintenance event log (JSON Lines)
//!
//! Every check and action becomes one record. Reports are rendered from the
//! records; nothing parses prose back out of the file.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::{AuditError, Clock, Result};
use crate::git::Classification;

/// What happened to a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Classified and linted
    Checked,
    /// External fixer ran
    Fixed,
    Committed,
    Pushed,
    Skipped,
    Failed,
    /// Report handed to the mail command
    Emailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub timestamp: DateTime<Local>,
    pub repository: PathBuf,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl MaintenanceEvent {
    pub fn new(clock: &dyn Clock, repository: impl Into<PathBuf>, action: Action) -> Self {
        Self {
            timestamp: clock.now(),
            repository: repository.into(),
            action,
            classification: None,
            issues: None,
            detail: String::new(),
        }
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn with_issues(mut self, issues: u32) -> Self {
        self.issues = Some(issues);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// In-memory record of one run, mirrored to an append-only file when possible
#[derive(Debug, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
    events: Vec<MaintenanceEvent>,
    write_failed: bool,
}

impl EventLog {
    /// Log that also appends to `path`; parent directories are created on demand
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Log kept in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn events(&self) -> &[MaintenanceEvent] {
        &self.events
    }

    /// Records an event; a file that cannot be written is reported once and then ignored
    pub fn record(&mut self, event: MaintenanceEvent) {
        if let Some(path) = self.path.as_deref() {
            if !self.write_failed {
                if let Err(e) = append_event(path, &event) {
                    warn!(log = %path.display(), "cannot write maintenance log: {e}");
                    self.write_failed = true;
                }
            }
        }
        self.events.push(event);
    }
}

fn append_event(path: &Path, event: &MaintenanceEvent) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
    writeln!(file, "{line}")
}

/// Reads every event back from a log file, skipping lines that are not events
pub fn read_events(path: &Path) -> Result<Vec<MaintenanceEvent>> {
    let file = fs::File::open(path).map_err(|e| AuditError::FatalConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut events = Vec::new();
    for line in BufReader::new(file).lines().map_while(std::result::Result::ok) {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<MaintenanceEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => warn!(log = %path.display(), "skipping malformed log line: {e}"),
        }
    }
    Ok(events)
}
