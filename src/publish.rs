//! Publishing: stage, commit and push the generated site with git.
//!
//! The [`Publisher`] trait is the seam between the export pipeline and the
//! repository. [`GitPublisher`] shells out to the `git` executable the same
//! way a user would; tests substitute their own implementation.

use crate::error::PublishError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// What a successful publication did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishOutcome {
    /// A commit was created and pushed.
    Pushed,
    /// The staged paths did not differ from `HEAD`; nothing was committed.
    NoChanges,
}

/// Stages, commits and pushes a set of paths.
pub trait Publisher {
    fn stage_and_commit_and_push(
        &self,
        paths: &[PathBuf],
        message: &str,
    ) -> Result<PublishOutcome, PublishError>;
}

/// [`Publisher`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: Option<String>,
    branch: Option<String>,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: None,
            branch: None,
        }
    }

    /// Push to an explicit remote (and branch) instead of the upstream.
    pub fn with_target(mut self, remote: Option<String>, branch: Option<String>) -> Self {
        self.remote = remote;
        self.branch = branch;
        self
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn git(&self, args: &[&str]) -> Result<Output, PublishError> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .map_err(PublishError::GitUnavailable)
    }

    fn git_checked(&self, args: &[&str]) -> Result<Output, PublishError> {
        let output = self.git(args)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(PublishError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Paths as seen from the repository root: relative paths are relative
    /// to the current directory, so make them absolute first.
    fn pathspecs(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                let p = if p.is_absolute() {
                    p.clone()
                } else {
                    std::env::current_dir()
                        .map(|cwd| cwd.join(p))
                        .unwrap_or_else(|_| p.clone())
                };
                p.to_string_lossy().into_owned()
            })
            .collect()
    }
}

impl Publisher for GitPublisher {
    fn stage_and_commit_and_push(
        &self,
        paths: &[PathBuf],
        message: &str,
    ) -> Result<PublishOutcome, PublishError> {
        let specs = Self::pathspecs(paths);
        let spec_refs: Vec<&str> = specs.iter().map(String::as_str).collect();

        let mut add = vec!["add", "-A", "--"];
        add.extend(&spec_refs);
        self.git_checked(&add)?;

        // `diff --cached --quiet` exits 0 when nothing is staged, 1 otherwise.
        let mut diff = vec!["diff", "--cached", "--quiet", "--"];
        diff.extend(&spec_refs);
        let staged = self.git(&diff)?;
        match staged.status.code() {
            Some(0) => {
                info!("No changes to publish");
                return Ok(PublishOutcome::NoChanges);
            }
            Some(1) => {}
            _ => {
                return Err(PublishError::CommandFailed {
                    command: format!("git {}", diff.join(" ")),
                    status: staged.status.to_string(),
                    stderr: String::from_utf8_lossy(&staged.stderr).trim().to_string(),
                })
            }
        }

        self.git_checked(&["commit", "-m", message])?;

        let mut push = vec!["push"];
        if let Some(ref remote) = self.remote {
            push.push(remote.as_str());
            if let Some(ref branch) = self.branch {
                push.push(branch.as_str());
            }
        }
        self.git_checked(&push)?;

        info!("Pushed: {}", message);
        Ok(PublishOutcome::Pushed)
    }
}
