//! Discovery → classification → aggregation pipeline

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::discovery::{unique_names, walk_with, WalkOptions};
use super::error::{AuditError, Result};
use super::summary::ScanResult;
use crate::git::{classify_with, ClassifyOptions};

/// Everything a scan needs besides the root
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub walk: WalkOptions,
    pub classify: ClassifyOptions,
    /// Number of repositories classified at once
    pub concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default(),
            classify: ClassifyOptions::default(),
            concurrency: 1,
        }
    }
}

/// Finds every repository under `root` without classifying them
pub async fn discover(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let options = options.clone();
    tokio::task::spawn_blocking(move || walk_with(&root, &options).map(|walk| walk.collect()))
        .await
        .map_err(|e| AuditError::SubprocessFailure {
            command: "directory walk".to_string(),
            message: e.to_string(),
        })?
}

/// Scans `root` and returns freshly classified buckets
///
/// Fails only when `root` is not a directory. Bucket order follows discovery
/// order even when several repositories are classified concurrently.
pub async fn scan(
    root: &Path,
    options: &ScanOptions,
    progress: Option<&ProgressBar>,
) -> Result<ScanResult> {
    let paths = discover(root, &options.walk).await?;
    info!(root = %root.display(), repos = paths.len(), "discovered repositories");

    if let Some(pb) = progress {
        pb.set_length(paths.len() as u64);
    }

    let names = unique_names(paths.iter().map(PathBuf::as_path));
    let classify_options = options.classify;
    let mut classified = stream::iter(paths.into_iter().zip(names))
        .map(|(path, name)| async move {
            let mut repo = classify_with(&path, classify_options).await;
            repo.name = name;
            repo
        })
        .buffered(options.concurrency.max(1));

    let mut result = ScanResult::new();
    while let Some(repo) = classified.next().await {
        debug!(repo = %repo.name, state = repo.classification().text(), "classified");
        if let Some(pb) = progress {
            pb.set_message(repo.name.clone());
            pb.inc(1);
        }
        result.push(repo);
    }

    Ok(result)
}
