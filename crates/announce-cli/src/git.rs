use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Release metadata the CLI falls back to when neither flags nor env provide it.
pub trait RepoMetadata {
    fn latest_tag(&self) -> Option<String>;
    fn github_url(&self) -> Option<String>;
}

/// Reads metadata by shelling out to `git` inside a checkout.
#[derive(Debug, Clone)]
pub struct GitCheckout {
    path: PathBuf,
}

impl GitCheckout {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl RepoMetadata for GitCheckout {
    fn latest_tag(&self) -> Option<String> {
        git_stdout(&self.path, &["describe", "--tags", "--abbrev=0"]).ok()
    }

    fn github_url(&self) -> Option<String> {
        let remote = git_stdout(&self.path, &["config", "--get", "remote.origin.url"]).ok()?;
        normalize_github_remote(&remote).ok()
    }
}

pub fn release_url_for_tag(repo_url: &str, tag: &str) -> String {
    format!("{}/releases/tag/{tag}", repo_url.trim_end_matches('/'))
}

pub fn normalize_github_remote(remote_url: &str) -> Result<String, GitError> {
    let remote_url = remote_url.trim();
    let normalized = if let Some(rest) = remote_url.strip_prefix("git@github.com:") {
        normalize_repo_path(rest)
    } else if let Some(rest) = remote_url.strip_prefix("https://github.com/") {
        normalize_repo_path(rest)
    } else {
        return Err(GitError::UnsupportedRemote(remote_url.to_string()));
    };

    if normalized.split('/').count() != 2 {
        return Err(GitError::UnsupportedRemote(remote_url.to_string()));
    }

    Ok(format!("https://github.com/{normalized}"))
}

fn normalize_repo_path(raw: &str) -> String {
    raw.trim_end_matches('/')
        .trim_end_matches(".git")
        .trim()
        .to_string()
}

fn git_stdout(path: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(args)
        .output()
        .map_err(|error| GitError::Command {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    if !output.status.success() {
        return Err(GitError::Command {
            path: path.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return Err(GitError::EmptyOutput(args.join(" ")));
    }

    Ok(stdout)
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("unsupported remote URL format: {0}")]
    UnsupportedRemote(String),
    #[error("failed to execute git in {path}: {message}")]
    Command { path: PathBuf, message: String },
    #[error("git {0} printed nothing")]
    EmptyOutput(String),
}
