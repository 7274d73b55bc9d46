//! Unattended maintenance over several roots
//!
//! Scans every configured root, runs the whitespace linter on each
//! repository and, with `fix`, lets the linter repair what it found before
//! committing and pushing through the batch operator. Everything that
//! happens is recorded as a [`MaintenanceEvent`].

pub mod linter;
pub mod log;
pub mod report;

pub use linter::{parse_issue_count, Linter};
pub use log::{read_events, Action, EventLog, MaintenanceEvent};
pub use report::{deliver_report, render_report, report_subject, send_email, summarize};

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::batch::{apply, BatchOptions, BatchReport, CancelFlag, Outcome, RepoOutcome};
use crate::core::{scan, AuditError, Clock, FleetConfig, Result, ScanOptions, ScanResult};
use crate::git::{classify_with, Repository};

/// Everything one maintenance run needs
#[derive(Debug, Clone)]
pub struct MaintenanceOptions {
    pub roots: Vec<PathBuf>,
    /// Run the fixer, then commit and push
    pub fix: bool,
    /// With `fix`, report the commit/push plan without carrying it out
    pub dry_run: bool,
    /// Append events here; `None` keeps them in memory only
    pub log_path: Option<PathBuf>,
    pub email: Option<String>,
    pub linter: Linter,
    pub mail_command: String,
    pub commit_prefix: String,
    pub scan: ScanOptions,
}

impl MaintenanceOptions {
    /// Options seeded from the `[maintenance]` config table
    pub fn from_config(config: &FleetConfig) -> Self {
        let maintenance = &config.maintenance;
        Self {
            roots: maintenance.dirs.clone(),
            fix: false,
            dry_run: false,
            log_path: Some(maintenance.log_path()),
            email: None,
            linter: Linter::from_config(maintenance),
            mail_command: maintenance.mail_command(),
            commit_prefix: maintenance.commit_prefix(),
            scan: ScanOptions::default(),
        }
    }
}

/// Result of a maintenance run
#[derive(Debug, Clone)]
pub struct MaintenanceOutcome {
    pub events: Vec<MaintenanceEvent>,
    /// Linter issues or non-clean repositories remain after the run
    pub unresolved: bool,
    pub fix: bool,
    pub batch: Option<BatchReport>,
    /// Roots that were not directories
    pub skipped_roots: Vec<PathBuf>,
    pub emailed: bool,
}

impl MaintenanceOutcome {
    /// Non-zero exactly when problems remain and no fix was requested
    pub fn exit_code(&self) -> i32 {
        if self.unresolved && !self.fix {
            1
        } else {
            0
        }
    }

    pub fn report(&self) -> String {
        render_report(&self.events)
    }
}

/// Runs maintenance over every root in `options`
///
/// Fails only when no root could be scanned at all.
pub async fn run(
    options: &MaintenanceOptions,
    clock: &dyn Clock,
    cancel: &CancelFlag,
) -> Result<MaintenanceOutcome> {
    let mut log = match &options.log_path {
        Some(path) => EventLog::open(path),
        None => EventLog::in_memory(),
    };

    let (scanned, skipped_roots) = scan_roots(options).await?;

    // Lint every repository
    let mut with_issues = Vec::new();
    for repo in scanned.repositories() {
        if cancel.is_cancelled() {
            break;
        }
        let issues = lint(&options.linter, repo).await;
        if issues > 0 {
            with_issues.push(repo.path.clone());
        }
        log.record(
            MaintenanceEvent::new(clock, &repo.path, Action::Checked)
                .with_classification(repo.classification())
                .with_issues(issues),
        );
    }

    let batch = if options.fix && !cancel.is_cancelled() {
        Some(fix_and_publish(options, &scanned, &with_issues, &mut log, clock, cancel).await)
    } else {
        None
    };

    let unresolved = summarize(log.events())
        .values()
        .any(|repo| repo.issues > 0 || repo.classification.is_some_and(|c| !c.is_clean()));

    let mut emailed = false;
    if let Some(address) = &options.email {
        emailed = deliver_report(&options.mail_command, address, log.events()).await;
        if emailed {
            log.record(
                MaintenanceEvent::new(clock, report::run_marker(), Action::Emailed)
                    .with_detail(address.clone()),
            );
        }
    }

    info!(
        repos = scanned.total,
        unresolved,
        fix = options.fix,
        "maintenance finished"
    );

    Ok(MaintenanceOutcome {
        events: log.events().to_vec(),
        unresolved,
        fix: options.fix,
        batch,
        skipped_roots,
        emailed,
    })
}

/// Scans each root in turn; invalid roots are logged and skipped
async fn scan_roots(options: &MaintenanceOptions) -> Result<(ScanResult, Vec<PathBuf>)> {
    let first_root = options.roots.first().cloned().unwrap_or_default();
    if options.roots.is_empty() {
        return Err(AuditError::FatalConfig {
            path: first_root,
            reason: "no maintenance directories configured".to_string(),
        });
    }

    let mut combined = ScanResult::new();
    let mut skipped = Vec::new();
    for root in &options.roots {
        match scan(root, &options.scan, None).await {
            Ok(result) => combined.merge(result),
            Err(e) if e.is_fatal() => {
                warn!(root = %root.display(), "skipping maintenance root: {e}");
                skipped.push(root.clone());
            }
            Err(e) => return Err(e),
        }
    }

    if skipped.len() == options.roots.len() {
        return Err(AuditError::FatalConfig {
            path: first_root,
            reason: "none of the maintenance directories exist".to_string(),
        });
    }
    Ok((combined, skipped))
}

/// Linter issue count; a linter that cannot run counts as no issues
async fn lint(linter: &Linter, repo: &Repository) -> u32 {
    match linter.check(&repo.path).await {
        Ok(issues) => issues,
        Err(e) => {
            warn!(repo = %repo.path.display(), "linter failed: {e}");
            0
        }
    }
}

async fn fix_and_publish(
    options: &MaintenanceOptions,
    scanned: &ScanResult,
    with_issues: &[PathBuf],
    log: &mut EventLog,
    clock: &dyn Clock,
    cancel: &CancelFlag,
) -> BatchReport {
    let mut touched: HashSet<PathBuf> = HashSet::new();

    for path in with_issues {
        if cancel.is_cancelled() {
            break;
        }
        let event = match options.linter.fix(path).await {
            Ok(()) => MaintenanceEvent::new(clock, path, Action::Fixed),
            Err(e) => {
                warn!(repo = %path.display(), "fixer failed: {e}");
                MaintenanceEvent::new(clock, path, Action::Failed)
                    .with_detail(format!("fix failed: {e}"))
            }
        };
        log.record(event);
        touched.insert(path.clone());
    }

    // Fixed repositories have new working-tree changes; read them again
    let mut refreshed = ScanResult::new();
    for repo in scanned.repositories() {
        if touched.contains(&repo.path) {
            let mut fresh = classify_with(&repo.path, options.scan.classify).await;
            fresh.name = repo.name.clone();
            refreshed.push(fresh);
        } else {
            refreshed.push(repo.clone());
        }
    }

    let batch_options = BatchOptions {
        dry_run: options.dry_run,
        commit_prefix: options.commit_prefix.clone(),
    };
    let selection = refreshed.needs_attention();
    let report = apply(&selection, &batch_options, clock, cancel).await;

    for outcome in &report.outcomes {
        record_outcome(log, clock, outcome);
        touched.insert(outcome.path.clone());
    }

    // Final state of everything the run changed
    for repo in refreshed.repositories().filter(|r| touched.contains(&r.path)) {
        let fresh = classify_with(&repo.path, options.scan.classify).await;
        let issues = lint(&options.linter, &fresh).await;
        log.record(
            MaintenanceEvent::new(clock, &fresh.path, Action::Checked)
                .with_classification(fresh.classification())
                .with_issues(issues),
        );
    }

    report
}

fn record_outcome(log: &mut EventLog, clock: &dyn Clock, outcome: &RepoOutcome) {
    if outcome.committed {
        log.record(MaintenanceEvent::new(clock, &outcome.path, Action::Committed));
    }
    let action = match &outcome.outcome {
        // Already recorded above
        Outcome::Committed => return,
        Outcome::Pushed => Action::Pushed,
        Outcome::Skipped(_) => Action::Skipped,
        Outcome::Failed(_) => Action::Failed,
    };
    log.record(MaintenanceEvent::new(clock, &outcome.path, action).with_detail(outcome.detail.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;
    use crate::git::Classification;
    use chrono::{Local, TimeZone};

    fn clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn outcome(unresolved: bool, fix: bool) -> MaintenanceOutcome {
        MaintenanceOutcome {
            events: vec![],
            unresolved,
            fix,
            batch: None,
            skipped_roots: vec![],
            emailed: false,
        }
    }

    #[test]
    fn test_exit_code_contract() {
        assert_eq!(outcome(false, false).exit_code(), 0);
        assert_eq!(outcome(true, false).exit_code(), 1);
        assert_eq!(outcome(true, true).exit_code(), 0);
        assert_eq!(outcome(false, true).exit_code(), 0);
    }

    #[test]
    fn test_options_from_config() {
        let config: FleetConfig = toml::from_str(
            r#"
[maintenance]
dirs = ["/srv/a"]
linter = "ws"
commit_message = "Tidy:"
"#,
        )
        .unwrap();
        let options = MaintenanceOptions::from_config(&config);
        assert_eq!(options.roots, vec![PathBuf::from("/srv/a")]);
        assert_eq!(options.linter.program, "ws");
        assert_eq!(options.commit_prefix, "Tidy:");
        assert!(!options.fix);
    }

    #[tokio::test]
    async fn test_all_roots_invalid_is_fatal() {
        let mut options = MaintenanceOptions::from_config(&FleetConfig::default());
        options.roots = vec![PathBuf::from("/nonexistent/one"), PathBuf::from("/nonexistent/two")];
        options.log_path = None;

        let err = run(&options, &clock(), &CancelFlag::new()).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_no_roots_is_fatal() {
        let mut options = MaintenanceOptions::from_config(&FleetConfig::default());
        options.roots.clear();
        options.log_path = None;
        assert!(run(&options, &clock(), &CancelFlag::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_root_is_skipped_next_to_valid_one() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut options = MaintenanceOptions::from_config(&FleetConfig::default());
        options.roots = vec![PathBuf::from("/nonexistent/one"), dir.path().to_path_buf()];
        options.log_path = None;

        let outcome = run(&options, &clock(), &CancelFlag::new()).await.unwrap();
        assert_eq!(outcome.skipped_roots, vec![PathBuf::from("/nonexistent/one")]);
        assert!(!outcome.unresolved);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_record_outcome_logs_commit_and_push() {
        let mut log = EventLog::in_memory();
        let pushed = RepoOutcome {
            name: "a".to_string(),
            path: PathBuf::from("/srv/a"),
            committed: true,
            outcome: Outcome::Pushed,
            detail: "committed, pushed 1 commit to origin/main".to_string(),
        };
        record_outcome(&mut log, &clock(), &pushed);

        let actions: Vec<Action> = log.events().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::Committed, Action::Pushed]);
        assert_eq!(log.events()[0].classification, None::<Classification>);
    }
}
