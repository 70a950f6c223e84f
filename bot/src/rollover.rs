//! Orchestration for one weekly rollover.
//!
//! Takes the issue of the period that just ended and:
//! 1. removes its working label,
//! 2. opens the issue for the next period,
//! 3. writes the ended period's document on a fresh branch, commits, pushes
//!    and opens a pull request (skipped when the document did not change).
//!
//! Each stage stops the workflow on error. Nothing is rolled back: a failure
//! after step 2 leaves the new issue open for an operator to reconcile.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use tracing::{info, instrument, warn};

use crate::core::error::{ErrorKind, IdentityError, RolloverError};
use crate::core::types::{
    CommitOutcome, Issue, IssueRef, NewIssue, NewPullRequest, PrRef, RepoSlug, RolloverOutcome,
    Stage,
};
use crate::core::weekly::{
    DocumentPath, MAX_PERIOD, Period, date_for_period, parse_period, path_for_period,
};
use crate::io::config::BotConfig;
use crate::io::document::{DocumentGenerator, DocumentRequest};
use crate::io::store::FileStore;
use crate::io::templates::Templates;
use crate::io::tracker::IssueTracker;

/// Settings the rollover reads; a subset of [`BotConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverConfig {
    pub repo: RepoSlug,
    pub base_branch: String,
    pub label: String,
    pub assignee: String,
}

impl RolloverConfig {
    pub fn from_bot_config(cfg: &BotConfig) -> Self {
        Self {
            repo: cfg.repo_slug(),
            base_branch: cfg.base_branch.clone(),
            label: cfg.label.clone(),
            assignee: cfg.assignee.clone(),
        }
    }
}

/// Runs rollovers against injected tracker, store and generator.
pub struct RolloverWorker<T, S, G> {
    config: RolloverConfig,
    tracker: T,
    store: S,
    generator: G,
    templates: Templates,
}

impl<T: IssueTracker, S: FileStore, G: DocumentGenerator> RolloverWorker<T, S, G> {
    pub fn new(config: RolloverConfig, tracker: T, store: S, generator: G) -> Self {
        Self {
            config,
            tracker,
            store,
            generator,
            templates: Templates::new(),
        }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Roll `issue` (the period that just ended) over to the next period.
    ///
    /// The title is validated before any remote call, so a malformed title
    /// leaves the tracker and the working tree untouched.
    #[instrument(skip_all, fields(issue_number = issue.number, title = %issue.title))]
    pub fn handle_weekly(&self, issue: &Issue) -> Result<RolloverOutcome, RolloverError> {
        let result = self.run(issue);
        match &result {
            Ok(RolloverOutcome::Submitted(pr)) => {
                info!(pr_number = pr.number, url = %pr.url, "rollover submitted");
            }
            Ok(RolloverOutcome::NoChange) => info!("rollover finished with no change"),
            Err(err) => warn!(stage = %err.stage, error = %format!("{:#}", err.cause), "rollover failed"),
        }
        result
    }

    fn run(&self, issue: &Issue) -> Result<RolloverOutcome, RolloverError> {
        let current = parse_period(issue).map_err(RolloverError::malformed_title)?;
        let next = current.next().ok_or_else(|| {
            RolloverError::malformed_title(IdentityError::PeriodOutOfRange {
                number: u64::from(current.number()) + 1,
                max: MAX_PERIOD,
            })
        })?;

        self.remove_working_label(issue)?;
        self.open_new_issue(next)?;
        self.commit_and_submit_pr(issue, current, next)
    }

    fn remove_working_label(&self, issue: &Issue) -> Result<(), RolloverError> {
        self.tracker
            .remove_label(&self.config.repo, issue.number, &self.config.label)
            .map_err(|err| RolloverError::tracker(Stage::RemoveLabel, err))?;
        info!(label = %self.config.label, "label removed");
        Ok(())
    }

    fn open_new_issue(&self, next: Period) -> Result<IssueRef, RolloverError> {
        let body = self
            .templates
            .render_issue_body(next)
            .map_err(|err| RolloverError::new(Stage::CreateIssue, ErrorKind::Generator, err))?;
        let request = NewIssue {
            title: next.title(),
            labels: vec![self.config.label.clone()],
            assignee: self.config.assignee.clone(),
            body,
        };
        let created = self
            .tracker
            .create_issue(&self.config.repo, &request)
            .map_err(|err| RolloverError::tracker(Stage::CreateIssue, err))?;
        info!(number = created.number, title = %request.title, "next weekly issue opened");
        Ok(created)
    }

    fn commit_and_submit_pr(
        &self,
        issue: &Issue,
        current: Period,
        next: Period,
    ) -> Result<RolloverOutcome, RolloverError> {
        let branch = generate_branch_name(current, Utc::now());
        info!(branch = %branch, "generated branch name");

        self.store
            .prepare_branch(&branch)
            .map_err(|err| RolloverError::store(Stage::PrepareEnv, err))?;

        let path = self.build_weekly(issue, current)?;

        let message = format!("weekly: add {} report ({path})", current.title());
        let committed = self
            .store
            .commit_and_push(&branch, &message)
            .map_err(|err| RolloverError::store(Stage::CommitPush, err))?;
        if committed == CommitOutcome::NothingChanged {
            info!(path = %path, "document unchanged, no pull request needed");
            return Ok(RolloverOutcome::NoChange);
        }

        let pr = self.submit_pr(&branch, issue, &path, next)?;
        Ok(RolloverOutcome::Submitted(pr))
    }

    /// Write the document of the period being closed out, not the new one.
    fn build_weekly(&self, issue: &Issue, current: Period) -> Result<DocumentPath, RolloverError> {
        let path = path_for_period(current);
        let existing = self
            .store
            .read_file(&path)
            .map_err(|err| RolloverError::store(Stage::BuildDocument, err))?;
        let content = self
            .generator
            .generate(&DocumentRequest {
                repo: &self.config.repo,
                issue,
                period: current,
                date: date_for_period(current),
                path: &path,
                existing: existing.as_deref(),
            })
            .map_err(|err| RolloverError::generator(Stage::BuildDocument, err))?;
        self.store
            .write_file(&path, &content)
            .map_err(|err| RolloverError::store(Stage::BuildDocument, err))?;
        info!(path = %path, "weekly document built");
        Ok(path)
    }

    fn submit_pr(
        &self,
        branch: &str,
        issue: &Issue,
        path: &DocumentPath,
        next: Period,
    ) -> Result<PrRef, RolloverError> {
        let body = self
            .templates
            .render_pr_body(issue.number, path, next)
            .map_err(|err| RolloverError::new(Stage::SubmitPr, ErrorKind::Generator, err))?;
        let request = NewPullRequest {
            head: branch.to_string(),
            base: self.config.base_branch.clone(),
            title: format!("{}: publish weekly report", next.title()),
            body,
        };
        self.tracker
            .create_pull_request(&self.config.repo, &request)
            .map_err(|err| RolloverError::tracker(Stage::SubmitPr, err))
    }
}

/// `weekly/<period>-<yyyymmdd-HHMMSS>-<6 random chars>`.
pub fn generate_branch_name(period: Period, now: DateTime<Utc>) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    branch_name(period, now, &suffix)
}

pub fn branch_name(period: Period, now: DateTime<Utc>, suffix: &str) -> String {
    format!("weekly/{period}-{}-{suffix}", now.format("%Y%m%d-%H%M%S"))
}
