//! Scheduled maintenance command implementation
//!
//! Meant for cron: scans the configured roots, lints every repository,
//! optionally fixes and publishes, then prints or mails the report. The
//! process exit status tells the scheduler whether anything is left to do.

use anyhow::Result;
use std::path::PathBuf;

use crate::batch::CancelFlag;
use crate::core::{get_git_concurrency, FleetConfig, SystemClock, WalkOptions};
use crate::maintenance::{run, MaintenanceOptions};

/// Flags of `repo-fleet maintain`; unset values come from the config file
#[derive(Debug, Clone, Default)]
pub struct MaintainOptions {
    pub dirs: Option<Vec<PathBuf>>,
    pub fix: bool,
    pub log: Option<PathBuf>,
    pub email: Option<String>,
    pub quiet: bool,
    pub linter: Option<String>,
    pub dry_run: bool,
}

impl MaintainOptions {
    /// Merges the flags over the `[maintenance]` config table
    pub fn resolve(&self, config: &FleetConfig) -> MaintenanceOptions {
        let mut options = MaintenanceOptions::from_config(config);
        if let Some(dirs) = &self.dirs {
            options.roots = dirs.clone();
        }
        if let Some(log) = &self.log {
            options.log_path = Some(log.clone());
        }
        if let Some(linter) = &self.linter {
            options.linter.program = linter.clone();
        }
        options.fix = self.fix;
        options.dry_run = self.dry_run;
        options.email = self.email.clone();
        options.scan.walk = WalkOptions {
            max_depth: config.max_depth(),
            skip_directories: config.skip_directories(),
        };
        options.scan.concurrency = get_git_concurrency(None, false);
        options
    }
}

/// Handles the maintain command and returns the process exit code
pub async fn handle_maintain_command(options: MaintainOptions, config: &FleetConfig) -> Result<i32> {
    let resolved = options.resolve(config);

    let cancel = CancelFlag::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let outcome = run(&resolved, &SystemClock, &cancel).await;
    watcher.abort();
    let outcome = outcome?;

    if !options.quiet {
        for root in &outcome.skipped_roots {
            println!("⚠️  Skipped {}: not a directory", root.display());
        }
        println!("{}", outcome.report());
        if let Some(batch) = &outcome.batch {
            if !batch.outcomes.is_empty() {
                println!();
                println!("{}", batch.render());
            }
        }
        if let Some(address) = &resolved.email {
            if outcome.emailed {
                println!("📧 Report sent to {address}");
            } else {
                println!("⚠️  Could not send report to {address}");
            }
        }
    }

    Ok(outcome.exit_code())
}

/// Splits a `-d a,b,c` argument into roots
pub fn parse_dirs(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dirs() {
        assert_eq!(
            parse_dirs("/srv/a, /srv/b,,"),
            vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
        assert!(parse_dirs("").is_empty());
    }

    #[test]
    fn test_flags_override_config() {
        let config: FleetConfig = toml::from_str(
            r#"
max_depth = 3

[maintenance]
dirs = ["/srv/config"]
log_path = "/tmp/from-config.log"
linter = "ws"
"#,
        )
        .unwrap();

        let flags = MaintainOptions {
            dirs: Some(vec![PathBuf::from("/srv/flag")]),
            linter: Some("other-ws".to_string()),
            fix: true,
            ..MaintainOptions::default()
        };
        let resolved = flags.resolve(&config);
        assert_eq!(resolved.roots, vec![PathBuf::from("/srv/flag")]);
        assert_eq!(resolved.log_path, Some(PathBuf::from("/tmp/from-config.log")));
        assert_eq!(resolved.linter.program, "other-ws");
        assert_eq!(resolved.scan.walk.max_depth, 3);
        assert!(resolved.fix);
    }
}
