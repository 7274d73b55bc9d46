//! Bucketing of classified repositories and summary rendering

use serde::Serialize;
use std::time::Duration;

use super::config::{ALL_CLEAN_MESSAGE, NAME_DISPLAY_WIDTH, PATH_DISPLAY_WIDTH};
use super::error::clean_error_message;
use crate::git::{Classification, Repository};
use crate::utils::shorten_path;

/// Non-clean buckets in display order; selection indices follow this order
pub const ATTENTION_ORDER: [Classification; 3] = [
    Classification::UncommittedOnly,
    Classification::UnpushedOnly,
    Classification::Both,
];

/// Result of one scan: four disjoint buckets in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResult {
    pub clean: Vec<Repository>,
    pub uncommitted_only: Vec<Repository>,
    pub unpushed_only: Vec<Repository>,
    pub both: Vec<Repository>,
    pub total: usize,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a repository into exactly one bucket
    pub fn push(&mut self, repo: Repository) {
        self.total += 1;
        match repo.classification() {
            Classification::Clean => self.clean.push(repo),
            Classification::UncommittedOnly => self.uncommitted_only.push(repo),
            Classification::UnpushedOnly => self.unpushed_only.push(repo),
            Classification::Both => self.both.push(repo),
        }
    }

    /// Appends another result, keeping its order after ours
    pub fn merge(&mut self, other: ScanResult) {
        self.clean.extend(other.clean);
        self.uncommitted_only.extend(other.uncommitted_only);
        self.unpushed_only.extend(other.unpushed_only);
        self.both.extend(other.both);
        self.total += other.total;
    }

    pub fn bucket(&self, classification: Classification) -> &[Repository] {
        match classification {
            Classification::Clean => &self.clean,
            Classification::UncommittedOnly => &self.uncommitted_only,
            Classification::UnpushedOnly => &self.unpushed_only,
            Classification::Both => &self.both,
        }
    }

    /// True when every non-clean bucket is empty
    pub fn is_all_clean(&self) -> bool {
        ATTENTION_ORDER
            .iter()
            .all(|classification| self.bucket(*classification).is_empty())
    }

    /// Non-clean repositories in the order they are numbered for selection
    pub fn needs_attention(&self) -> Vec<&Repository> {
        ATTENTION_ORDER
            .iter()
            .flat_map(|classification| self.bucket(*classification).iter())
            .collect()
    }

    /// Every repository, clean ones first
    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.clean
            .iter()
            .chain(self.needs_attention())
    }

    /// One-line tally
    pub fn generate_summary(&self, duration: Duration) -> String {
        let attention = self.total - self.clean.len();
        let repo_word = if self.total == 1 {
            "repository"
        } else {
            "repositories"
        };
        format!(
            "✅ Scanned {} {} in {:.1}s • {} clean • {} need attention",
            self.total,
            repo_word,
            duration.as_secs_f64(),
            self.clean.len(),
            attention
        )
    }

    /// Lists each non-empty non-clean bucket with numbered members
    ///
    /// Returns a single affirmation line when everything is clean.
    pub fn render(&self) -> String {
        if self.is_all_clean() {
            return ALL_CLEAN_MESSAGE.to_string();
        }

        let mut lines = Vec::new();
        let mut index = 1;

        for classification in ATTENTION_ORDER {
            let repos = self.bucket(classification);
            if repos.is_empty() {
                continue;
            }

            lines.push(format!(
                "{} {} ({})",
                classification.symbol(),
                classification.header(),
                repos.len()
            ));
            for (i, repo) in repos.iter().enumerate() {
                let tree_char = if i == repos.len() - 1 { "└─" } else { "├─" };
                let short_path =
                    shorten_path(&repo.path.to_string_lossy(), PATH_DISPLAY_WIDTH);
                let mut line = format!(
                    "   {} {:>3}. {:name_width$} {:path_width$}",
                    tree_char,
                    index,
                    repo.name,
                    short_path,
                    name_width = NAME_DISPLAY_WIDTH,
                    path_width = PATH_DISPLAY_WIDTH
                );
                if let Some(note) = repo_note(repo) {
                    line.push_str(&format!(" # {note}"));
                }
                lines.push(line.trim_end().to_string());
                index += 1;
            }
            lines.push(String::new());
        }

        // Remove trailing blank line if it exists
        if lines.last() == Some(&String::new()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

fn repo_note(repo: &Repository) -> Option<String> {
    if let Some(error) = &repo.status_error {
        Some(format!("status unknown: {}", clean_error_message(&error.to_string())))
    } else if repo.has_unpushed_commits {
        let commit_word = if repo.unpushed_count == 1 {
            "commit"
        } else {
            "commits"
        };
        Some(format!("{} {} ahead", repo.unpushed_count, commit_word))
    } else if !repo.has_upstream() {
        Some("no upstream".to_string())
    } else {
        None
    }
}

/// Buckets repositories by classification in a single pass
pub fn aggregate(repos: impl IntoIterator<Item = Repository>) -> ScanResult {
    let mut result = ScanResult::new();
    for repo in repos {
        result.push(repo);
    }
    result
}
