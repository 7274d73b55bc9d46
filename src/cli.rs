use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use repo_fleet::commands::{parse_dirs, CheckOptions, MaintainOptions};

#[derive(Parser, Debug)]
#[command(name = "repo-fleet")]
#[command(version)]
#[command(about = "Audit a tree of Git repositories and commit/push pending work in batches")]
pub struct Cli {
    /// Path to configuration file (overrides REPO_FLEET_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory tree and report repositories with pending work
    Check(CheckArgs),
    /// Lint, optionally fix and publish, and report on the configured roots
    Maintain(MaintainArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Show branch, changed files and unpushed commits for each repository
    #[arg(short, long)]
    pub detailed: bool,

    /// Fetch from remotes before counting unpushed commits
    #[arg(long)]
    pub fetch: bool,

    /// Commit and push without prompting for a selection (`all` or e.g. `1,3-5`)
    #[arg(long, value_name = "all|LIST")]
    pub apply: Option<String>,

    /// Show what would be committed and pushed without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; without --apply nothing is committed or pushed
    #[arg(long)]
    pub no_prompt: bool,

    /// Number of repositories to classify concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Classify one repository at a time
    #[arg(long, conflicts_with = "jobs")]
    pub sequential: bool,

    /// Maximum directory depth to descend
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

#[derive(Args, Debug)]
pub struct MaintainArgs {
    /// Comma-separated list of roots (overrides the config file)
    #[arg(short, long, value_name = "DIR,DIR")]
    pub dirs: Option<String>,

    /// Run the fixer, then commit and push the result
    #[arg(short, long)]
    pub fix: bool,

    /// Append structured events to this file
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Email the report to this address
    #[arg(short, long, value_name = "ADDR")]
    pub email: Option<String>,

    /// Print nothing; only the exit status reports the result
    #[arg(short, long)]
    pub quiet: bool,

    /// Whitespace checker to run (overrides the config file)
    #[arg(long, value_name = "PROG")]
    pub linter: Option<String>,

    /// With --fix, report the commit/push plan without carrying it out
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        matches!(&self.command, Commands::Maintain(args) if args.quiet)
    }
}

impl From<CheckArgs> for CheckOptions {
    fn from(args: CheckArgs) -> Self {
        CheckOptions {
            directory: args.directory,
            detailed: args.detailed,
            fetch: args.fetch,
            apply: args.apply,
            dry_run: args.dry_run,
            no_prompt: args.no_prompt,
            jobs: args.jobs,
            sequential: args.sequential,
            max_depth: args.max_depth,
        }
    }
}

impl From<MaintainArgs> for MaintainOptions {
    fn from(args: MaintainArgs) -> Self {
        MaintainOptions {
            dirs: args.dirs.as_deref().map(parse_dirs),
            fix: args.fix,
            log: args.log,
            email: args.email,
            quiet: args.quiet,
            linter: args.linter,
            dry_run: args.dry_run,
        }
    }
}
