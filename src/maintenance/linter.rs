//! External whitespace checker/fixer invoked as a subprocess

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::config::{LINTER_ISSUES_ANCHOR, LINTER_TIMEOUT_SECS, MaintenanceConfig};
use crate::core::{AuditError, Result};

/// How to call the external tool
#[derive(Debug, Clone, PartialEq)]
pub struct Linter {
    pub program: String,
    pub check_args: Vec<String>,
    pub fix_args: Vec<String>,
}

impl Linter {
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self {
            program: config.linter(),
            check_args: config.check_args(),
            fix_args: config.fix_args(),
        }
    }

    /// Runs `<program> <check_args> <path>` and returns the reported issue count
    ///
    /// A summary line that is missing or unparsable counts as zero issues and
    /// is logged; only a tool that cannot run at all is an error.
    pub async fn check(&self, path: &Path) -> Result<u32> {
        let stdout = self.run(&self.check_args, path).await?;
        match parse_issue_count(&stdout) {
            Ok(count) => Ok(count),
            Err(e) => {
                warn!(repo = %path.display(), "{e}; assuming no issues");
                Ok(0)
            }
        }
    }

    /// Runs `<program> <fix_args> <path>`
    pub async fn fix(&self, path: &Path) -> Result<()> {
        self.run(&self.fix_args, path).await.map(|_| ())
    }

    async fn run(&self, args: &[String], path: &Path) -> Result<String> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(repo = %path.display(), %command, "linter");

        let result = tokio::time::timeout(
            Duration::from_secs(LINTER_TIMEOUT_SECS),
            Command::new(&self.program)
                .args(args)
                .arg(path)
                .current_dir(path)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            // The exit status only says whether issues were found; stdout carries the count
            Ok(Ok(output)) => Ok(String::from_utf8_lossy(&output.stdout).to_string()),
            Ok(Err(e)) => Err(AuditError::SubprocessFailure {
                command,
                message: e.to_string(),
            }),
            Err(_) => Err(AuditError::Timeout {
                seconds: LINTER_TIMEOUT_SECS,
            }),
        }
    }
}

/// Extracts `N` from a `Total issues found: N` line
pub fn parse_issue_count(output: &str) -> Result<u32> {
    let line = output
        .lines()
        .find(|line| line.contains(LINTER_ISSUES_ANCHOR))
        .ok_or_else(|| AuditError::ParseFailure {
            input: first_line(output),
        })?;

    let tail = line
        .split_once(LINTER_ISSUES_ANCHOR)
        .map(|(_, tail)| tail.trim())
        .unwrap_or_default();
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();

    digits.parse().map_err(|_| AuditError::ParseFailure {
        input: line.trim().to_string(),
    })
}

fn first_line(output: &str) -> String {
    output.lines().next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_issue_count() {
        let output = "Scanning /srv/app\nTotal issues found: 12\n";
        assert_eq!(parse_issue_count(output), Ok(12));
    }

    #[test]
    fn test_parse_issue_count_with_decoration() {
        assert_eq!(parse_issue_count("  ✔ Total issues found: 0 files clean"), Ok(0));
    }

    #[test]
    fn test_parse_issue_count_missing_line() {
        let err = parse_issue_count("all good\n").unwrap_err();
        assert!(matches!(err, AuditError::ParseFailure { .. }));
    }

    #[test]
    fn test_parse_issue_count_not_a_number() {
        assert!(parse_issue_count("Total issues found: many").is_err());
    }

    #[tokio::test]
    async fn test_missing_tool_is_subprocess_failure() {
        let linter = Linter {
            program: "definitely-not-a-real-linter-binary".to_string(),
            check_args: vec!["-q".to_string(), "-r".to_string()],
            fix_args: vec![],
        };
        let dir = tempfile::TempDir::new().unwrap();
        let err = linter.check(dir.path()).await.unwrap_err();
        assert!(matches!(err, AuditError::SubprocessFailure { .. }));
    }

    #[test]
    fn test_defaults_from_empty_config() {
        let linter = Linter::from_config(&MaintenanceConfig::default());
        assert_eq!(linter.program, "whitespace-check");
        assert_eq!(linter.check_args, vec!["-q", "-r"]);
    }
}
