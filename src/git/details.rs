//! Per-repository drill-down: branch, changed files and unpushed commits

use super::classify::Repository;
use super::operations::{short_status, unpushed_log, DETACHED_HEAD_BRANCH};
use crate::core::config::CHANGED_FILES_DISPLAY_LIMIT;

/// Renders a read-only detail block for one repository
pub async fn report(repo: &Repository) -> String {
    let mut lines = vec![format!("📁 {} ({})", repo.name, repo.path.display())];

    let branch = match repo.current_branch.as_deref() {
        Some(DETACHED_HEAD_BRANCH) => "detached HEAD".to_string(),
        Some(branch) => branch.to_string(),
        None => "unknown".to_string(),
    };
    let upstream = repo.upstream.as_deref().unwrap_or("no upstream");
    lines.push(format!("   Branch: {branch} → {upstream}"));

    if repo.has_uncommitted_changes {
        lines.push("   Changes:".to_string());
        match short_status(&repo.path).await {
            Ok(status) => lines.extend(limit_lines(&status, CHANGED_FILES_DISPLAY_LIMIT)),
            Err(e) => lines.push(format!("      (could not read status: {e})")),
        }
    }

    if repo.has_unpushed_commits {
        lines.push(format!("   Unpushed commits ({}):", repo.unpushed_count));
        match unpushed_log(&repo.path).await {
            Ok(log) => lines.extend(log.lines().map(|line| format!("      {line}"))),
            Err(e) => lines.push(format!("      (could not read log: {e})")),
        }
    }

    lines.join("\n")
}

/// Indents `output` and keeps at most `limit` non-empty lines
fn limit_lines(output: &str, limit: usize) -> Vec<String> {
    let entries: Vec<&str> = output.lines().filter(|line| !line.is_empty()).collect();
    let mut lines: Vec<String> = entries
        .iter()
        .take(limit)
        .map(|line| format!("      {line}"))
        .collect();
    if entries.len() > limit {
        lines.push(format!("      ... and {} more", entries.len() - limit));
    }
    lines
}
