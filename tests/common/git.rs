//! Git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Runs git in `path` and returns trimmed stdout, failing on a non-zero exit
pub fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(path).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a git repository with user config on a `main` branch
/// Returns Ok(()) on success, or skips test if git is not available
pub fn setup_git_repo(path: &Path) -> Result<()> {
    let init_result = Command::new("git")
        .args(["init", "-q"])
        .current_dir(path)
        .output()?;

    if !init_result.status.success() {
        anyhow::bail!("Git not available - skipping test");
    }

    // Same branch name whatever init.defaultBranch says
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    // Disable commit signing for tests
    git(path, &["config", "commit.gpgsign", "false"])?;

    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(
    path: &Path,
    file_name: &str,
    content: &str,
    message: &str,
) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "-q", "-m", message])?;
    Ok(())
}

/// Creates an empty bare repository to push to
pub fn create_bare_remote(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    git(path, &["init", "-q", "--bare"])?;
    Ok(())
}

/// Adds `url` as `origin` and pushes `main` with upstream tracking
pub fn add_upstream(path: &Path, url: &Path) -> Result<()> {
    let url = url.to_string_lossy();
    git(path, &["remote", "add", "origin", &*url])?;
    git(path, &["push", "-q", "-u", "origin", "main"])?;
    Ok(())
}

/// Number of commits on `main` in the bare remote at `remote`
pub fn remote_commit_count(remote: &Path) -> Result<u32> {
    Ok(git(remote, &["rev-list", "--count", "main"])?.parse()?)
}

/// Number of commits on the current branch
pub fn commit_count(path: &Path) -> Result<u32> {
    Ok(git(path, &["rev-list", "--count", "HEAD"])?.parse()?)
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
