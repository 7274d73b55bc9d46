//! Batch commit/push over repositories that need attention

pub mod operator;
pub mod selection;

pub use operator::{apply, apply_one, BatchOptions, BatchReport, CancelFlag, Outcome, RepoOutcome, SkipReason};
pub use selection::Selection;

use crate::core::{Clock, ScanResult};

/// Resolves `selection` against the scan's numbered list and runs the batch
///
/// Returns the report and the selection indices that matched nothing.
pub async fn apply_selection(
    scan: &ScanResult,
    selection: &Selection,
    options: &BatchOptions,
    clock: &dyn Clock,
    cancel: &CancelFlag,
) -> (BatchReport, Vec<usize>) {
    let candidates = scan.needs_attention();
    let (selected, ignored) = selection.resolve(&candidates);
    if !ignored.is_empty() {
        tracing::warn!(?ignored, "selection indices out of range");
    }
    let report = apply(&selected, options, clock, cancel).await;
    (report, ignored)
}
