//! Issue tracker abstraction and its GitHub CLI implementation.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::core::types::{Issue, IssueRef, NewIssue, NewPullRequest, PrRef, RepoSlug};
use crate::io::gh::{GhCli, GhIssue, ISSUE_JSON_FIELDS, last_line, number_from_url};

/// Remote operations the rollover performs on the tracker.
pub trait IssueTracker {
    fn remove_label(&self, repo: &RepoSlug, issue_number: u64, label: &str) -> Result<()>;
    fn create_issue(&self, repo: &RepoSlug, issue: &NewIssue) -> Result<IssueRef>;
    fn create_pull_request(&self, repo: &RepoSlug, pr: &NewPullRequest) -> Result<PrRef>;
}

/// [`IssueTracker`] that shells out to `gh`.
#[derive(Debug, Clone)]
pub struct GhTracker {
    cli: GhCli,
}

impl GhTracker {
    pub fn new(cli: GhCli) -> Self {
        Self { cli }
    }

    /// Load a single issue by number.
    #[instrument(skip_all, fields(repo = %repo, issue_number))]
    pub fn fetch_issue(&self, repo: &RepoSlug, issue_number: u64) -> Result<Issue> {
        let slug = repo.to_string();
        let number = issue_number.to_string();
        let raw: GhIssue = self
            .cli
            .json(&["issue", "view", &number, "-R", &slug], ISSUE_JSON_FIELDS)
            .with_context(|| format!("fetch issue #{issue_number}"))?;
        Ok(raw.into())
    }

    /// Find the single open issue carrying `label`.
    #[instrument(skip_all, fields(repo = %repo, label))]
    pub fn find_working_issue(&self, repo: &RepoSlug, label: &str) -> Result<Issue> {
        let slug = repo.to_string();
        let raw: Vec<GhIssue> = self
            .cli
            .json(
                &["issue", "list", "-R", &slug, "--state", "open", "-l", label],
                ISSUE_JSON_FIELDS,
            )
            .with_context(|| format!("list open issues labelled '{label}'"))?;
        let issues: Vec<Issue> = raw.into_iter().map(Issue::from).collect();
        pick_single(issues, label)
    }
}

fn pick_single(mut issues: Vec<Issue>, label: &str) -> Result<Issue> {
    match issues.len() {
        1 => Ok(issues.remove(0)),
        0 => Err(anyhow!("no open issue labelled '{label}'")),
        n => {
            let numbers: Vec<String> = issues.iter().map(|i| format!("#{}", i.number)).collect();
            Err(anyhow!(
                "expected one open issue labelled '{label}', found {n} ({})",
                numbers.join(", ")
            ))
        }
    }
}

impl IssueTracker for GhTracker {
    #[instrument(skip_all, fields(repo = %repo, issue_number, label))]
    fn remove_label(&self, repo: &RepoSlug, issue_number: u64, label: &str) -> Result<()> {
        let slug = repo.to_string();
        let number = issue_number.to_string();
        self.cli
            .action(&[
                "issue",
                "edit",
                &number,
                "-R",
                &slug,
                "--remove-label",
                label,
            ])
            .with_context(|| format!("remove label '{label}' from #{issue_number}"))?;
        debug!("label removed");
        Ok(())
    }

    #[instrument(skip_all, fields(repo = %repo, title = %issue.title))]
    fn create_issue(&self, repo: &RepoSlug, issue: &NewIssue) -> Result<IssueRef> {
        let slug = repo.to_string();
        let labels = issue.labels.join(",");
        let mut args = vec![
            "issue",
            "create",
            "-R",
            &slug,
            "-t",
            &issue.title,
            "-b",
            &issue.body,
            "-a",
            &issue.assignee,
        ];
        if !labels.is_empty() {
            args.extend(["-l", &labels]);
        }
        let stdout = self
            .cli
            .action(&args)
            .with_context(|| format!("create issue '{}'", issue.title))?;
        let url = last_line(&stdout).to_string();
        let number = number_from_url(&url)?;
        info!(number, url = %url, "issue created");
        Ok(IssueRef { number, url })
    }

    #[instrument(skip_all, fields(repo = %repo, head = %pr.head, base = %pr.base))]
    fn create_pull_request(&self, repo: &RepoSlug, pr: &NewPullRequest) -> Result<PrRef> {
        let slug = repo.to_string();
        let stdout = self
            .cli
            .action(&[
                "pr", "create", "-R", &slug, "--head", &pr.head, "--base", &pr.base, "-t",
                &pr.title, "-b", &pr.body,
            ])
            .with_context(|| format!("create pull request from '{}'", pr.head))?;
        let url = last_line(&stdout).to_string();
        let number = number_from_url(&url)?;
        info!(number, url = %url, "pull request created");
        Ok(PrRef { number, url })
    }
}
