//! Progress bar management

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

use super::config::{PROGRESS_TEMPLATE, PROGRESS_TICK_MS};

/// Creates a progress bar style configuration
/// Returns a ProgressStyle configured with the application's visual styling
pub(crate) fn create_progress_style() -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE)?)
}

/// Spinner shown while repositories are classified
///
/// Hidden when `quiet` is set or stdout is not a terminal, so piped output
/// stays free of control sequences.
pub fn create_scan_progress(quiet: bool) -> anyhow::Result<ProgressBar> {
    if quiet || !std::io::stdout().is_terminal() {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(0);
    pb.set_style(create_progress_style()?);
    pb.set_prefix("classifying");
    pb.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    Ok(pb)
}
