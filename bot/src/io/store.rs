//! Versioned file store: the working tree the weekly documents live in.
//!
//! The [`FileStore`] trait decouples the rollover from git so tests can use
//! an in-memory store. [`GitStore`] is the production implementation.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::core::types::CommitOutcome;
use crate::core::weekly::DocumentPath;
use crate::io::git::Git;

/// Branch, write, commit and push operations used by the rollover.
pub trait FileStore {
    /// Sync to the latest base branch and check out a new branch `name` from it.
    fn prepare_branch(&self, name: &str) -> Result<()>;

    /// Read a document from the working tree, `None` if it does not exist.
    fn read_file(&self, path: &DocumentPath) -> Result<Option<String>>;

    fn write_file(&self, path: &DocumentPath, content: &str) -> Result<()>;

    /// Stage everything, commit and push `branch`.
    ///
    /// Returns [`CommitOutcome::NothingChanged`] (not an error) when the tree
    /// matches the base.
    fn commit_and_push(&self, branch: &str, message: &str) -> Result<CommitOutcome>;
}

/// [`FileStore`] backed by a local git clone.
#[derive(Debug, Clone)]
pub struct GitStore {
    git: Git,
    remote: String,
    base_branch: String,
}

impl GitStore {
    pub fn new(git: Git, remote: impl Into<String>, base_branch: impl Into<String>) -> Self {
        Self {
            git,
            remote: remote.into(),
            base_branch: base_branch.into(),
        }
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    fn resolve(&self, path: &DocumentPath) -> Result<PathBuf> {
        let relative = Path::new(path.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(anyhow!(
                "document path '{path}' must be relative to the working directory"
            ));
        }
        Ok(self.git.workdir().join(relative))
    }
}

impl FileStore for GitStore {
    #[instrument(skip_all, fields(branch = name, base = %self.base_branch))]
    fn prepare_branch(&self, name: &str) -> Result<()> {
        self.git.ensure_clean()?;
        if self.git.current_branch()? != self.base_branch {
            self.git.checkout_branch(&self.base_branch)?;
        }
        self.git.pull_ff_only(&self.remote, &self.base_branch)?;
        if self.git.branch_exists(name)? {
            return Err(anyhow!("branch '{name}' already exists"));
        }
        self.git.checkout_new_branch(name)?;
        info!("working branch ready");
        Ok(())
    }

    fn read_file(&self, path: &DocumentPath) -> Result<Option<String>> {
        let full = self.resolve(path)?;
        if !full.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&full).with_context(|| format!("read {}", full.display()))?;
        Ok(Some(contents))
    }

    #[instrument(skip_all, fields(path = %path))]
    fn write_file(&self, path: &DocumentPath, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&full, content).with_context(|| format!("write {}", full.display()))?;
        debug!(bytes = content.len(), "document written");
        Ok(())
    }

    #[instrument(skip_all, fields(branch))]
    fn commit_and_push(&self, branch: &str, message: &str) -> Result<CommitOutcome> {
        self.git.add_all()?;
        if !self.git.commit_staged(message)? {
            // Abandon the branch; it never leaves this clone.
            info!("nothing changed, discarding branch");
            self.git.checkout_branch(&self.base_branch)?;
            self.git.delete_branch(branch)?;
            return Ok(CommitOutcome::NothingChanged);
        }
        self.git.push_upstream(&self.remote, branch)?;
        info!(remote = %self.remote, "branch pushed");
        Ok(CommitOutcome::Pushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> GitStore {
        GitStore::new(Git::new(root), "origin", "master")
    }

    #[test]
    fn write_then_read_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(temp.path());
        let path = crate::core::weekly::path_for_period(
            crate::core::weekly::Period::new(1).expect("period"),
        );

        assert_eq!(store.read_file(&path).expect("read"), None);
        store.write_file(&path, "# Weekly-1\n").expect("write");
        assert_eq!(
            store.read_file(&path).expect("read").as_deref(),
            Some("# Weekly-1\n")
        );
        assert!(temp.path().join("2019/2019-04-08-weekly.md").exists());
    }
}
