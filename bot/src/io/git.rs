//! Git adapter for the weekly repository working tree.
//!
//! The bot only ever needs a handful of porcelain commands, so we keep a
//! small, explicit wrapper around `git` subprocess calls.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::io::process::{CommandOutput, run_command_with_timeout};

pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file.
    pub path: String,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }

    pub fn with_limits(mut self, timeout: Duration, output_limit_bytes: usize) -> Self {
        self.timeout = timeout;
        self.output_limit_bytes = output_limit_bytes;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Return the current branch name (errors on detached HEAD).
    #[instrument(skip_all)]
    pub fn current_branch(&self) -> Result<String> {
        let out = self.run_capture(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = out.trim().to_string();
        if name == "HEAD" {
            warn!("detached HEAD detected");
            return Err(anyhow!("detached HEAD (refuse to run)"));
        }
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    /// Get status entries (including untracked) in porcelain format.
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = self.run_capture(&["status", "--porcelain=v1", "-uall"])?;
        let mut entries = Vec::new();
        for line in out.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_status_line(line)?);
        }
        Ok(entries)
    }

    /// Ensure the worktree is fully clean (including untracked files).
    #[instrument(skip_all)]
    pub fn ensure_clean(&self) -> Result<()> {
        let entries = self.status_porcelain()?;
        if entries.is_empty() {
            debug!("worktree is clean");
            return Ok(());
        }
        warn!(dirty_count = entries.len(), "worktree not clean");
        let mut msg = String::new();
        msg.push_str("working tree not clean:\n");
        for entry in entries {
            msg.push_str(&format!("{} {}\n", entry.code, entry.path));
        }
        Err(anyhow!(msg.trim_end().to_string()))
    }

    /// Check whether a local branch exists.
    pub fn branch_exists(&self, branch: &str) -> Result<bool> {
        let output = self.run(&[
            "show-ref",
            "--verify",
            "--quiet",
            &format!("refs/heads/{branch}"),
        ])?;
        Ok(output.success())
    }

    /// Create and checkout a new branch at current HEAD.
    #[instrument(skip_all, fields(branch))]
    pub fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "creating and checking out new branch");
        self.run_checked(&["checkout", "-b", branch])?;
        Ok(())
    }

    /// Checkout an existing branch.
    #[instrument(skip_all, fields(branch))]
    pub fn checkout_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out branch");
        self.run_checked(&["checkout", branch])?;
        Ok(())
    }

    /// Force-delete a local branch.
    #[instrument(skip_all, fields(branch))]
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting local branch");
        self.run_checked(&["branch", "-D", branch])?;
        Ok(())
    }

    /// Fast-forward the current branch from `remote/branch`.
    #[instrument(skip_all, fields(remote, branch))]
    pub fn pull_ff_only(&self, remote: &str, branch: &str) -> Result<()> {
        debug!(remote, branch, "pulling");
        self.run_checked(&["pull", "--ff-only", remote, branch])?;
        Ok(())
    }

    /// Push `branch` to `remote` and record it as upstream.
    #[instrument(skip_all, fields(remote, branch))]
    pub fn push_upstream(&self, remote: &str, branch: &str) -> Result<()> {
        debug!(remote, branch, "pushing");
        self.run_checked(&["push", "-u", remote, branch])?;
        Ok(())
    }

    /// Stage all changes (respects .gitignore).
    pub fn add_all(&self) -> Result<()> {
        self.run_checked(&["add", "-A"])?;
        Ok(())
    }

    /// True if there is anything staged for commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let out = self.run_capture(&["diff", "--cached", "--name-only"])?;
        Ok(!out.trim().is_empty())
    }

    /// Commit staged changes with a message.
    ///
    /// If there are no staged changes, this returns Ok(false) and does nothing.
    #[instrument(skip_all)]
    pub fn commit_staged(&self, message: &str) -> Result<bool> {
        if !self.has_staged_changes()? {
            debug!("no staged changes, skipping commit");
            return Ok(false);
        }
        debug!("committing staged changes");
        self.run_checked(&["commit", "-m", message])?;
        Ok(true)
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(output.stdout_text())
    }

    fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(args)?;
        if output.timed_out {
            return Err(anyhow!(
                "git {} timed out after {:?}",
                args.join(" "),
                self.timeout
            ));
        }
        if !output.status.success() {
            return Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                output.stderr_text()
            ));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        run_command_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .map_err(|err| err.context(format!("spawn git {}", args.join(" "))))
    }
}

fn parse_status_line(line: &str) -> Result<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 {
        return Err(anyhow!("unexpected porcelain line: '{line}'"));
    }
    let code = line[..2].to_string();
    let mut path = line[3..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_untracked_line() {
        let e = parse_status_line("?? 2019/2019-04-08-weekly.md").expect("parse");
        assert_eq!(
            e,
            StatusEntry {
                code: "??".to_string(),
                path: "2019/2019-04-08-weekly.md".to_string()
            }
        );
    }

    #[test]
    fn parses_modified_line() {
        let e = parse_status_line(" M README.md").expect("parse");
        assert_eq!(
            e,
            StatusEntry {
                code: " M".to_string(),
                path: "README.md".to_string()
            }
        );
    }

    #[test]
    fn parses_rename_line_uses_new_path() {
        let e = parse_status_line("R  old.md -> new.md").expect("parse");
        assert_eq!(e.path, "new.md");
    }

    #[test]
    fn rejects_short_line() {
        assert!(parse_status_line("M").is_err());
    }
}
