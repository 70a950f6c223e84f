//! Blocking executor for GitHub CLI (`gh`) commands.
//!
//! Every call is bounded by a timeout and fails with a typed [`GhError`] so
//! callers can tell a missing CLI or a missing login from an API failure.

use std::process::Command;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::core::types::Issue;
use crate::io::process::run_command_with_timeout;

/// JSON fields requested whenever an issue is read through `gh`.
pub const ISSUE_JSON_FIELDS: &str = "number,title,labels,assignees,body";

/// Errors that can occur when executing gh CLI commands.
#[derive(Error, Debug)]
pub enum GhError {
    #[error("gh command failed (exit code {code}): {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("gh CLI not found - ensure gh is installed and in PATH")]
    NotFound,

    #[error("gh CLI not authenticated - run 'gh auth login' or configure a token")]
    NotAuthenticated,

    #[error("gh command timed out after {0:?}")]
    TimedOut(Duration),

    #[error("failed to run gh: {0:#}")]
    Spawn(anyhow::Error),

    #[error("failed to parse gh JSON output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected gh output: '{0}'")]
    UnexpectedOutput(String),
}

pub type GhResult<T> = Result<T, GhError>;

/// Connection settings for the `gh` binary.
#[derive(Debug, Clone)]
pub struct GhCli {
    token: Option<String>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl GhCli {
    pub fn new(token: Option<String>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            token,
            timeout,
            output_limit_bytes,
        }
    }

    /// Run a state-changing command and return its trimmed stdout (usually a URL).
    #[instrument(skip_all, fields(cmd = %args.join(" ")))]
    pub fn action(&self, args: &[&str]) -> GhResult<String> {
        debug!("executing gh");
        let mut cmd = Command::new("gh");
        cmd.args(args);
        if let Some(token) = &self.token {
            cmd.env("GH_TOKEN", token);
        }

        let output = run_command_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .map_err(|err| {
                let missing = err
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound);
                if missing { GhError::NotFound } else { GhError::Spawn(err) }
            })?;

        if output.timed_out {
            error!("gh command timed out");
            return Err(GhError::TimedOut(self.timeout));
        }
        if !output.status.success() {
            let stderr = output.stderr_text();
            let code = output.status.code().unwrap_or(-1);
            if is_auth_failure(&stderr) {
                error!("gh authentication required");
                return Err(GhError::NotAuthenticated);
            }
            error!(code, stderr = %stderr, "gh command failed");
            return Err(GhError::CommandFailed { code, stderr });
        }

        Ok(output.stdout_text().trim().to_string())
    }

    /// Run a command with `--json <fields>` and parse the output.
    pub fn json<T: DeserializeOwned>(&self, args: &[&str], fields: &str) -> GhResult<T> {
        let mut full_args = args.to_vec();
        full_args.extend(["--json", fields]);
        let stdout = self.action(&full_args)?;
        Ok(serde_json::from_str(&stdout)?)
    }
}

fn is_auth_failure(stderr: &str) -> bool {
    stderr.contains("gh auth login") || stderr.contains("not logged in")
}

/// Issue as returned by `gh issue view/list --json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GhIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<GhLabel>,
    #[serde(default)]
    pub assignees: Vec<GhUser>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhUser {
    pub login: String,
}

impl From<GhIssue> for Issue {
    fn from(raw: GhIssue) -> Self {
        Issue {
            number: raw.number,
            title: raw.title,
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            assignee: raw.assignees.into_iter().next().map(|u| u.login),
            body: raw.body,
        }
    }
}

/// Extract the trailing number from an issue or pull request URL
/// (`https://github.com/o/r/issues/42` → 42).
pub fn number_from_url(url: &str) -> GhResult<u64> {
    let last = url
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    last.parse()
        .map_err(|_| GhError::UnexpectedOutput(url.to_string()))
}

/// `gh` prints progress lines before the URL; keep the last non-empty line.
pub fn last_line(stdout: &str) -> &str {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_number_from_issue_url() {
        assert_eq!(
            number_from_url("https://github.com/dyweb/weekly/issues/501").expect("number"),
            501
        );
        assert_eq!(
            number_from_url("https://github.com/dyweb/weekly/pull/77/").expect("number"),
            77
        );
    }

    #[test]
    fn rejects_url_without_number() {
        let err = number_from_url("https://github.com/dyweb/weekly").unwrap_err();
        assert!(matches!(err, GhError::UnexpectedOutput(_)));
    }

    #[test]
    fn last_line_skips_progress_output() {
        let stdout = "\nCreating issue in dyweb/weekly\n\nhttps://github.com/dyweb/weekly/issues/9\n";
        assert_eq!(last_line(stdout), "https://github.com/dyweb/weekly/issues/9");
    }

    #[test]
    fn converts_gh_issue_json() {
        let raw: GhIssue = serde_json::from_str(
            r#"{
                "number": 500,
                "title": "Weekly-12",
                "labels": [{"name": "working", "color": "ededed"}],
                "assignees": [{"login": "gaocegege-bot"}],
                "body": "- [link](https://example.com)"
            }"#,
        )
        .expect("parse");
        let issue = Issue::from(raw);
        assert_eq!(issue.number, 500);
        assert_eq!(issue.title, "Weekly-12");
        assert_eq!(issue.labels, vec!["working".to_string()]);
        assert_eq!(issue.assignee.as_deref(), Some("gaocegege-bot"));
        assert!(issue.body.contains("example.com"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let raw: GhIssue =
            serde_json::from_str(r#"{"number": 1, "title": "Weekly-1"}"#).expect("parse");
        let issue = Issue::from(raw);
        assert!(issue.labels.is_empty());
        assert_eq!(issue.assignee, None);
        assert_eq!(issue.body, "");
    }

    #[test]
    fn detects_auth_failures() {
        assert!(is_auth_failure("To get started with GitHub CLI, please run:  gh auth login"));
        assert!(!is_auth_failure("HTTP 404: Not Found"));
    }
}
