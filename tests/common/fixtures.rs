//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::git::{add_upstream, create_bare_remote, create_test_commit, setup_git_repo};

/// A directory tree of repositories plus a separate home for their remotes
///
/// Remotes live outside the scanned root so they never show up in a scan.
pub struct TestFleet {
    root: TempDir,
    remotes: TempDir,
}

impl TestFleet {
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
            remotes: TempDir::new()?,
        })
    }

    /// Root directory to scan
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Bare remote belonging to the repository named `name`
    pub fn remote_path(&self, name: &str) -> PathBuf {
        self.remotes.path().join(format!("{name}.git"))
    }

    /// Starts a repository at `<root>/<relative>`
    pub fn repo(&self, relative: &str) -> TestRepoBuilder<'_> {
        TestRepoBuilder::new(self, relative)
    }
}

/// Builder for creating test repositories inside a [`TestFleet`]
pub struct TestRepoBuilder<'a> {
    fleet: &'a TestFleet,
    relative: String,
    with_upstream: bool,
    unpushed_commits: usize,
    modified: bool,
    untracked: bool,
}

impl<'a> TestRepoBuilder<'a> {
    fn new(fleet: &'a TestFleet, relative: &str) -> Self {
        Self {
            fleet,
            relative: relative.to_string(),
            with_upstream: false,
            unpushed_commits: 0,
            modified: false,
            untracked: false,
        }
    }

    /// Push the initial commit to a bare remote and track it
    pub fn with_upstream(mut self) -> Self {
        self.with_upstream = true;
        self
    }

    /// Local commits made after the upstream was set
    pub fn with_unpushed_commits(mut self, count: usize) -> Self {
        self.unpushed_commits = count;
        self
    }

    /// Leave a tracked file modified
    pub fn with_modified_file(mut self) -> Self {
        self.modified = true;
        self
    }

    /// Leave a new file that git does not track yet
    pub fn with_untracked_file(mut self) -> Self {
        self.untracked = true;
        self
    }

    pub fn build(self) -> Result<PathBuf> {
        let path = self.fleet.path().join(&self.relative);
        std::fs::create_dir_all(&path)?;
        setup_git_repo(&path)?;
        create_test_commit(&path, "README.md", "# Test Repo\n", "Initial commit")?;

        if self.with_upstream {
            let name = self.relative.replace('/', "-");
            let remote = self.fleet.remote_path(&name);
            create_bare_remote(&remote)?;
            add_upstream(&path, &remote)?;
        }

        for i in 1..=self.unpushed_commits {
            create_test_commit(
                &path,
                &format!("file{i}.txt"),
                &format!("Content {i}\n"),
                &format!("Commit {i}"),
            )?;
        }

        if self.modified {
            std::fs::write(path.join("README.md"), "# Test Repo\n\nEdited.\n")?;
        }
        if self.untracked {
            std::fs::write(path.join("notes.txt"), "scratch\n")?;
        }

        Ok(path)
    }
}
