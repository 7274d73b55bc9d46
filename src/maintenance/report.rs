//! Text report rendered from maintenance events, and its delivery by mail

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::log::{Action, MaintenanceEvent};
use crate::core::config::{GIT_OPERATION_TIMEOUT_SECS, SEPARATOR_WIDTH};
use crate::core::{AuditError, Result};
use crate::git::Classification;

/// What the events say about one repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoSummary {
    pub classification: Option<Classification>,
    pub issues: u32,
    pub actions: Vec<Action>,
    pub failures: Vec<String>,
}

impl RepoSummary {
    fn is_clean(&self) -> bool {
        self.issues == 0 && matches!(self.classification, None | Some(Classification::Clean))
    }
}

/// Folds events into one summary per repository, sorted by path
pub fn summarize(events: &[MaintenanceEvent]) -> BTreeMap<PathBuf, RepoSummary> {
    let mut repos: BTreeMap<PathBuf, RepoSummary> = BTreeMap::new();

    for event in events {
        if event.action == Action::Emailed {
            continue;
        }
        let summary = repos.entry(event.repository.clone()).or_default();
        match event.action {
            Action::Checked => {
                // The latest check wins; a re-check after fixing replaces the first one
                summary.classification = event.classification.or(summary.classification);
                summary.issues = event.issues.unwrap_or(summary.issues);
            }
            Action::Failed => {
                summary.actions.push(Action::Failed);
                summary.failures.push(event.detail.clone());
            }
            action => summary.actions.push(action),
        }
    }

    repos
}

/// Subject line for the mailed report
pub fn report_subject(events: &[MaintenanceEvent]) -> String {
    let repos = summarize(events);
    let issues: u32 = repos.values().map(|r| r.issues).sum();
    let attention = repos.values().filter(|r| !r.is_clean()).count();
    if attention == 0 {
        "Repository maintenance: all clean".to_string()
    } else {
        format!("Repository maintenance: {attention} need attention, {issues} whitespace issues")
    }
}

/// Renders the per-repository report with totals
pub fn render_report(events: &[MaintenanceEvent]) -> String {
    let repos = summarize(events);
    let mut lines = vec!["━".repeat(SEPARATOR_WIDTH)];

    if repos.is_empty() {
        lines.push("No repositories were checked.".to_string());
    }

    let count = repos.len();
    for (i, (path, repo)) in repos.iter().enumerate() {
        let tree_char = if i == count - 1 { "└─" } else { "├─" };
        let (symbol, state) = match repo.classification {
            Some(classification) => (classification.symbol(), classification.text()),
            None => ("⚪", "unknown"),
        };

        let mut line = format!(
            "   {} {} {} [{}] {} {}",
            tree_char,
            symbol,
            path.display(),
            state,
            repo.issues,
            if repo.issues == 1 { "issue" } else { "issues" }
        );
        if !repo.actions.is_empty() {
            let actions: Vec<String> = repo.actions.iter().map(action_text).collect();
            line.push_str(&format!(" • {}", actions.join(", ")));
        }
        lines.push(line);
        for failure in &repo.failures {
            lines.push(format!("        # {failure}"));
        }
    }

    let issues: u32 = repos.values().map(|r| r.issues).sum();
    let attention = repos.values().filter(|r| !r.is_clean()).count();
    let action_count =
        |action: Action| repos.values().filter(|r| r.actions.contains(&action)).count();

    lines.push("━".repeat(SEPARATOR_WIDTH));
    let mut totals = format!(
        "{} checked • {} need attention • {} whitespace issues",
        count, attention, issues
    );
    for (action, label) in [
        (Action::Fixed, "fixed"),
        (Action::Committed, "committed"),
        (Action::Pushed, "pushed"),
        (Action::Failed, "failed"),
    ] {
        let n = action_count(action);
        if n > 0 {
            totals.push_str(&format!(" • {n} {label}"));
        }
    }
    lines.push(totals);

    lines.join("\n")
}

fn action_text(action: &Action) -> String {
    match action {
        Action::Checked => "checked",
        Action::Fixed => "fixed",
        Action::Committed => "committed",
        Action::Pushed => "pushed",
        Action::Skipped => "skipped",
        Action::Failed => "failed",
        Action::Emailed => "emailed",
    }
    .to_string()
}

/// Pipes `body` to `<mail_command> -s <subject> <address>`
pub async fn send_email(mail_command: &str, address: &str, subject: &str, body: &str) -> Result<()> {
    let command = format!("{mail_command} -s {subject:?} {address}");
    debug!(%command, "sending report");
    let spawn_failure = |e: std::io::Error| AuditError::SubprocessFailure {
        command: command.clone(),
        message: e.to_string(),
    };

    let mut child = Command::new(mail_command)
        .arg("-s")
        .arg(subject)
        .arg(address)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(spawn_failure)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(body.as_bytes()).await.map_err(spawn_failure)?;
        // Closing stdin ends the message
        drop(stdin);
    }

    let output = tokio::time::timeout(
        Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| AuditError::Timeout {
        seconds: GIT_OPERATION_TIMEOUT_SECS,
    })?
    .map_err(spawn_failure)?;

    if output.status.success() {
        Ok(())
    } else {
        Err(AuditError::SubprocessFailure {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Sends the report, logging instead of failing when mail cannot be delivered
pub async fn deliver_report(mail_command: &str, address: &str, events: &[MaintenanceEvent]) -> bool {
    let subject = report_subject(events);
    let body = render_report(events);
    match send_email(mail_command, address, &subject, &body).await {
        Ok(()) => true,
        Err(e) => {
            warn!(%address, "could not email report: {e}");
            false
        }
    }
}

/// Pseudo-repository path used for run-level events such as emailing
pub fn run_marker() -> &'static Path {
    Path::new("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;
    use chrono::{Local, TimeZone};

    fn clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn checked(path: &str, classification: Classification, issues: u32) -> MaintenanceEvent {
        MaintenanceEvent::new(&clock(), path, Action::Checked)
            .with_classification(classification)
            .with_issues(issues)
    }

    #[test]
    fn test_render_report_totals() {
        let events = vec![
            checked("/srv/a", Classification::Clean, 0),
            checked("/srv/b", Classification::UncommittedOnly, 4),
            MaintenanceEvent::new(&clock(), "/srv/b", Action::Fixed),
            MaintenanceEvent::new(&clock(), "/srv/b", Action::Committed),
            MaintenanceEvent::new(&clock(), "/srv/b", Action::Failed)
                .with_detail("push failed: no upstream"),
        ];

        let report = render_report(&events);
        assert!(report.contains("🟢 /srv/a [clean] 0 issues"));
        assert!(report.contains("/srv/b [uncommitted] 4 issues • fixed, committed, failed"));
        assert!(report.contains("# push failed: no upstream"));
        assert!(report.contains(
            "2 checked • 1 need attention • 4 whitespace issues • 1 fixed • 1 committed • 1 failed"
        ));
    }

    #[test]
    fn test_latest_check_wins() {
        let events = vec![
            checked("/srv/b", Classification::UncommittedOnly, 4),
            checked("/srv/b", Classification::UnpushedOnly, 0),
        ];
        let repos = summarize(&events);
        let b = &repos[Path::new("/srv/b")];
        assert_eq!(b.issues, 0);
        assert_eq!(b.classification, Some(Classification::UnpushedOnly));
    }

    #[test]
    fn test_subject_reflects_state() {
        assert_eq!(
            report_subject(&[checked("/srv/a", Classification::Clean, 0)]),
            "Repository maintenance: all clean"
        );
        assert_eq!(
            report_subject(&[checked("/srv/a", Classification::Clean, 2)]),
            "Repository maintenance: 1 need attention, 2 whitespace issues"
        );
    }

    #[test]
    fn test_emailed_events_are_not_repositories() {
        let events = vec![MaintenanceEvent::new(&clock(), run_marker(), Action::Emailed)];
        assert!(summarize(&events).is_empty());
        assert!(render_report(&events).contains("No repositories were checked."));
    }

    #[tokio::test]
    async fn test_missing_mail_command_is_reported_not_fatal() {
        let delivered = deliver_report(
            "definitely-not-a-mail-binary",
            "ops@example.com",
            &[checked("/srv/a", Classification::Clean, 0)],
        )
        .await;
        assert!(!delivered);
    }
}
