//! Synchronization state of a repository relative to its upstream

use serde::{Deserialize, Serialize};

/// One of four mutually exclusive states derived from two signals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Nothing to commit, nothing to push
    Clean,
    /// Working tree or index differs from the last commit
    UncommittedOnly,
    /// Local commits are missing from the upstream
    UnpushedOnly,
    /// Both of the above
    Both,
}

impl Classification {
    /// Derives the classification from the uncommitted/unpushed signals
    pub fn from_signals(has_uncommitted: bool, has_unpushed: bool) -> Self {
        match (has_uncommitted, has_unpushed) {
            (false, false) => Classification::Clean,
            (true, false) => Classification::UncommittedOnly,
            (false, true) => Classification::UnpushedOnly,
            (true, true) => Classification::Both,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Classification::Clean)
    }

    /// Returns the emoji symbol for this classification
    pub fn symbol(&self) -> &'static str {
        match self {
            Classification::Clean => "🟢",
            Classification::UncommittedOnly => "🟡",
            Classification::UnpushedOnly => "🟠",
            Classification::Both => "🔴",
        }
    }

    /// Returns the text representation of this classification
    pub fn text(&self) -> &'static str {
        match self {
            Classification::Clean => "clean",
            Classification::UncommittedOnly => "uncommitted",
            Classification::UnpushedOnly => "unpushed",
            Classification::Both => "uncommitted+unpushed",
        }
    }

    /// Section header used in summaries
    pub fn header(&self) -> &'static str {
        match self {
            Classification::Clean => "CLEAN",
            Classification::UncommittedOnly => "UNCOMMITTED CHANGES",
            Classification::UnpushedOnly => "UNPUSHED COMMITS",
            Classification::Both => "UNCOMMITTED CHANGES AND UNPUSHED COMMITS",
        }
    }
}
