//! Repository check command implementation
//!
//! This module handles the interactive audit: discover and classify every
//! repository under a directory, print the buckets, then optionally commit
//! and push a selection of the repositories that need attention.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

use crate::batch::{apply_selection, BatchOptions, CancelFlag, Selection};
use crate::core::{
    create_scan_progress, get_git_concurrency, scan, set_terminal_title,
    set_terminal_title_and_flush, FleetConfig, ScanOptions, ScanResult, SystemClock, WalkOptions,
    NO_REPOS_MESSAGE, SCANNING_MESSAGE,
};
use crate::core::config::SEPARATOR_WIDTH;
use crate::git::{report, ClassifyOptions};
use crate::utils::{confirm, prompt_line};

const SELECTION_PROMPT: &str = "Select repositories to commit and push (e.g. 1,3-5 or all; empty for none): ";

/// Flags of `repo-fleet check`
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub directory: PathBuf,
    /// Print branch, changed files and unpushed commits per repository
    pub detailed: bool,
    /// Fetch remote-tracking refs before counting unpushed commits
    pub fetch: bool,
    /// Selection given up front instead of prompting
    pub apply: Option<String>,
    pub dry_run: bool,
    /// Never read from stdin
    pub no_prompt: bool,
    pub jobs: Option<usize>,
    pub sequential: bool,
    pub max_depth: Option<usize>,
}

impl CheckOptions {
    /// Scan settings from the flags, falling back to the config file
    pub fn scan_options(&self, config: &FleetConfig) -> ScanOptions {
        ScanOptions {
            walk: WalkOptions {
                max_depth: self.max_depth.unwrap_or_else(|| config.max_depth()),
                skip_directories: config.skip_directories(),
            },
            classify: ClassifyOptions { fetch: self.fetch },
            concurrency: get_git_concurrency(self.jobs, self.sequential),
        }
    }
}

/// Handles the check command
///
/// Returns an error only for an unusable root; everything found in the
/// repositories themselves is reported, not raised.
pub async fn handle_check_command(options: CheckOptions, config: &FleetConfig) -> Result<()> {
    set_terminal_title("🚀 repo-fleet");

    print!("{SCANNING_MESSAGE}");
    std::io::stdout().flush()?;

    let start_time = Instant::now();
    let progress = create_scan_progress(false)?;
    let scanned = scan(&options.directory, &options.scan_options(config), Some(&progress)).await;
    progress.finish_and_clear();

    let scanned = match scanned {
        Ok(scanned) => scanned,
        Err(e) => {
            println!();
            set_terminal_title_and_flush("❌ repo-fleet");
            return Err(e.into());
        }
    };

    if scanned.total == 0 {
        println!("\r{NO_REPOS_MESSAGE}");
        set_terminal_title_and_flush("✅ repo-fleet");
        return Ok(());
    }

    println!("\r{}", scanned.generate_summary(start_time.elapsed()));
    println!();
    println!("{}", scanned.render());

    if !scanned.is_all_clean() {
        if options.detailed {
            print_details(&scanned).await;
        }
        run_batch(&options, &scanned).await?;
    }

    set_terminal_title_and_flush("✅ repo-fleet");
    Ok(())
}

async fn print_details(scanned: &ScanResult) {
    println!("\n{}", "━".repeat(SEPARATOR_WIDTH));
    for repo in scanned.needs_attention() {
        println!("{}\n", report(repo).await);
    }
    println!("{}", "━".repeat(SEPARATOR_WIDTH));
}

async fn run_batch(options: &CheckOptions, scanned: &ScanResult) -> Result<()> {
    let candidates = scanned.needs_attention().len();

    // Stdin is only touched before any batch work starts
    let selection = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        match plan_batch(options, candidates, &mut input)? {
            Some(selection) => selection,
            None => return Ok(()),
        }
    };

    let batch_options = BatchOptions {
        dry_run: options.dry_run,
        ..BatchOptions::default()
    };

    let cancel = CancelFlag::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n⚠️  Cancelling; repositories already processed keep their changes");
                cancel.cancel();
            }
        })
    };

    println!();
    let (report, ignored) =
        apply_selection(scanned, &selection, &batch_options, &SystemClock, &cancel).await;
    watcher.abort();

    if !ignored.is_empty() {
        println!("⚠️  Ignored out-of-range selections: {}", join_indices(&ignored));
    }
    if report.outcomes.is_empty() {
        println!("Nothing selected.");
    } else {
        println!("{}", report.render());
    }
    Ok(())
}

/// Decides what to apply, prompting on `input` when allowed
///
/// Returns `None` when nothing should be done.
pub fn plan_batch(
    options: &CheckOptions,
    candidates: usize,
    input: &mut impl BufRead,
) -> std::io::Result<Option<Selection>> {
    let answer = match (&options.apply, options.no_prompt) {
        (Some(apply), _) => apply.clone(),
        (None, true) => {
            println!("\nRun with --apply <all|LIST> to commit and push these repositories.");
            return Ok(None);
        }
        (None, false) => {
            println!();
            match prompt_line(SELECTION_PROMPT, input)? {
                Some(answer) => answer,
                None => return Ok(None),
            }
        }
    };

    let (selection, invalid) = Selection::parse(&answer);
    if !invalid.is_empty() {
        println!("⚠️  Ignored unrecognised selections: {}", invalid.join(", "));
    }
    debug!(?selection, "parsed selection");

    let count = match &selection {
        Selection::None => {
            println!("Nothing selected.");
            return Ok(None);
        }
        Selection::All => candidates,
        Selection::Indices(indices) => indices.iter().filter(|&&i| (1..=candidates).contains(&i)).count(),
    };

    if options.dry_run || options.no_prompt {
        return Ok(Some(selection));
    }

    let repo_word = if count == 1 { "repository" } else { "repositories" };
    if confirm(&format!("Commit and push {count} {repo_word}?"), input)? {
        Ok(Some(selection))
    } else {
        println!("Aborted.");
        Ok(None)
    }
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
