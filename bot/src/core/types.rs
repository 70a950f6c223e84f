//! Shared deterministic types for the rollover workflow.
//!
//! These types define the contract between the worker and its collaborators
//! (issue tracker, file store, document generator). They hold no I/O handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `owner/repo` pair identifying the repository the bot works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Tracking issue as seen by the worker. Read-only input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub body: String,
}

impl Issue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Request to open a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub labels: Vec<String>,
    pub assignee: String,
    pub body: String,
}

/// Request to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Reference to an issue created on the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub number: u64,
    pub url: String,
}

/// Reference to a pull request created on the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRef {
    pub number: u64,
    pub url: String,
}

/// Result of staging and committing the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created and the branch pushed.
    Pushed,
    /// The tree matched the base; no commit, nothing pushed.
    NothingChanged,
}

/// Terminal, successful outcome of one rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverOutcome {
    Submitted(PrRef),
    NoChange,
}

/// Workflow stage, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ParseTitle,
    RemoveLabel,
    CreateIssue,
    PrepareEnv,
    BuildDocument,
    CommitPush,
    SubmitPr,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ParseTitle => "parse-title",
            Stage::RemoveLabel => "remove-label",
            Stage::CreateIssue => "create-issue",
            Stage::PrepareEnv => "prepare-env",
            Stage::BuildDocument => "build-document",
            Stage::CommitPush => "commit-push",
            Stage::SubmitPr => "submit-pr",
        }
    }

    /// True once a stage may have left a remote side effect behind.
    pub fn after_remote_calls(self) -> bool {
        !matches!(self, Stage::ParseTitle)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_are_kebab_case() {
        assert_eq!(Stage::RemoveLabel.to_string(), "remove-label");
        assert_eq!(Stage::SubmitPr.to_string(), "submit-pr");
        assert_eq!(Stage::BuildDocument.to_string(), "build-document");
    }

    #[test]
    fn repo_slug_displays_owner_slash_repo() {
        assert_eq!(RepoSlug::new("dyweb", "weekly").to_string(), "dyweb/weekly");
    }

    #[test]
    fn issue_has_label_matches_exactly() {
        let issue = Issue {
            labels: vec!["working".to_string()],
            ..Issue::default()
        };
        assert!(issue.has_label("working"));
        assert!(!issue.has_label("work"));
    }
}
