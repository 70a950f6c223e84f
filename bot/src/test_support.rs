//! Test-only fakes for the rollover collaborators and a throwaway git remote.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use anyhow::{Result, anyhow};

use crate::core::types::{
    CommitOutcome, Issue, IssueRef, NewIssue, NewPullRequest, PrRef, RepoSlug,
};
use crate::core::weekly::DocumentPath;
use crate::io::document::{DocumentGenerator, DocumentRequest};
use crate::io::store::FileStore;
use crate::io::tracker::IssueTracker;

/// Create a deterministic weekly issue carrying the `working` label.
pub fn weekly_issue(title: &str, number: u64) -> Issue {
    Issue {
        number,
        title: title.to_string(),
        labels: vec!["working".to_string()],
        assignee: Some("gaocegege-bot".to_string()),
        body: format!("Entries for {title}"),
    }
}

/// Ordered record of every collaborator call, shared between fakes.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Which fake operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    RemoveLabel,
    CreateIssue,
    CreatePullRequest,
    PrepareBranch,
    ReadFile,
    WriteFile,
    CommitAndPush,
}

/// In-memory issue tracker recording every request.
pub struct FakeTracker {
    journal: Journal,
    fail_at: Option<FailAt>,
    pub removed_labels: RefCell<Vec<(u64, String)>>,
    pub created_issues: RefCell<Vec<NewIssue>>,
    pub pull_requests: RefCell<Vec<NewPullRequest>>,
}

impl FakeTracker {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_at: None,
            removed_labels: RefCell::new(Vec::new()),
            created_issues: RefCell::new(Vec::new()),
            pull_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = Some(fail_at);
        self
    }

    fn check(&self, op: FailAt) -> Result<()> {
        if self.fail_at == Some(op) {
            return Err(anyhow!("tracker rejected {op:?}"));
        }
        Ok(())
    }
}

impl IssueTracker for FakeTracker {
    fn remove_label(&self, _repo: &RepoSlug, issue_number: u64, label: &str) -> Result<()> {
        self.journal
            .borrow_mut()
            .push(format!("remove-label #{issue_number} {label}"));
        self.check(FailAt::RemoveLabel)?;
        self.removed_labels
            .borrow_mut()
            .push((issue_number, label.to_string()));
        Ok(())
    }

    fn create_issue(&self, _repo: &RepoSlug, issue: &NewIssue) -> Result<IssueRef> {
        self.journal
            .borrow_mut()
            .push(format!("create-issue {}", issue.title));
        self.check(FailAt::CreateIssue)?;
        self.created_issues.borrow_mut().push(issue.clone());
        let number = 1000 + self.created_issues.borrow().len() as u64;
        Ok(IssueRef {
            number,
            url: format!("https://github.com/dyweb/weekly/issues/{number}"),
        })
    }

    fn create_pull_request(&self, _repo: &RepoSlug, pr: &NewPullRequest) -> Result<PrRef> {
        self.journal
            .borrow_mut()
            .push(format!("create-pull-request {}", pr.title));
        self.check(FailAt::CreatePullRequest)?;
        self.pull_requests.borrow_mut().push(pr.clone());
        let number = 2000 + self.pull_requests.borrow().len() as u64;
        Ok(PrRef {
            number,
            url: format!("https://github.com/dyweb/weekly/pull/{number}"),
        })
    }
}

/// In-memory file store: `committed` is the base branch, `working` the tree.
pub struct FakeStore {
    journal: Journal,
    fail_at: Option<FailAt>,
    pub committed: RefCell<BTreeMap<String, String>>,
    pub working: RefCell<BTreeMap<String, String>>,
    pub branches: RefCell<Vec<String>>,
    pub pushed: RefCell<Vec<(String, String)>>,
}

impl FakeStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_at: None,
            committed: RefCell::new(BTreeMap::new()),
            working: RefCell::new(BTreeMap::new()),
            branches: RefCell::new(Vec::new()),
            pushed: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = Some(fail_at);
        self
    }

    /// Seed a file that is already committed on the base branch.
    pub fn with_committed(self, path: &str, content: &str) -> Self {
        self.committed
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self
    }

    fn check(&self, op: FailAt) -> Result<()> {
        if self.fail_at == Some(op) {
            return Err(anyhow!("store rejected {op:?}"));
        }
        Ok(())
    }
}

impl FileStore for FakeStore {
    fn prepare_branch(&self, name: &str) -> Result<()> {
        self.journal.borrow_mut().push("prepare-branch".to_string());
        self.check(FailAt::PrepareBranch)?;
        self.branches.borrow_mut().push(name.to_string());
        *self.working.borrow_mut() = self.committed.borrow().clone();
        Ok(())
    }

    fn read_file(&self, path: &DocumentPath) -> Result<Option<String>> {
        self.journal
            .borrow_mut()
            .push(format!("read-file {path}"));
        self.check(FailAt::ReadFile)?;
        Ok(self.working.borrow().get(path.as_str()).cloned())
    }

    fn write_file(&self, path: &DocumentPath, content: &str) -> Result<()> {
        self.journal
            .borrow_mut()
            .push(format!("write-file {path}"));
        self.check(FailAt::WriteFile)?;
        self.working
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn commit_and_push(&self, branch: &str, message: &str) -> Result<CommitOutcome> {
        self.journal.borrow_mut().push("commit-and-push".to_string());
        self.check(FailAt::CommitAndPush)?;
        if *self.working.borrow() == *self.committed.borrow() {
            return Ok(CommitOutcome::NothingChanged);
        }
        self.pushed
            .borrow_mut()
            .push((branch.to_string(), message.to_string()));
        Ok(CommitOutcome::Pushed)
    }
}

/// Generator returning a fixed document.
pub struct FakeGenerator {
    journal: Journal,
    content: String,
    fail: bool,
    pub requests: RefCell<Vec<(u64, u32, String)>>,
}

impl FakeGenerator {
    pub fn new(journal: Journal, content: &str) -> Self {
        Self {
            journal,
            content: content.to_string(),
            fail: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl DocumentGenerator for FakeGenerator {
    fn generate(&self, request: &DocumentRequest<'_>) -> Result<String> {
        self.journal
            .borrow_mut()
            .push(format!("generate {}", request.path));
        if self.fail {
            return Err(anyhow!("generator exploded"));
        }
        self.requests.borrow_mut().push((
            request.issue.number,
            request.period.number(),
            request.path.to_string(),
        ));
        Ok(self.content.clone())
    }
}

/// A bare "remote" plus a clone of it, both in a temp directory.
pub struct TestRepo {
    _temp: tempfile::TempDir,
    remote: PathBuf,
    clone: PathBuf,
}

impl TestRepo {
    /// Create a remote with one commit on `master` and clone it.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let remote = temp.path().join("remote.git");
        let seed = temp.path().join("seed");
        let clone = temp.path().join("clone");

        fs::create_dir_all(&seed)?;
        run_git(temp.path(), &["init", "--bare", "remote.git"])?;
        run_git(&remote, &["symbolic-ref", "HEAD", "refs/heads/master"])?;
        run_git(&seed, &["init"])?;
        run_git(&seed, &["symbolic-ref", "HEAD", "refs/heads/master"])?;
        configure_identity(&seed)?;
        fs::write(seed.join("README.md"), "# weekly\n")?;
        run_git(&seed, &["add", "README.md"])?;
        run_git(&seed, &["commit", "-m", "chore: seed"])?;
        run_git(&seed, &["remote", "add", "origin", &remote.to_string_lossy()])?;
        run_git(&seed, &["push", "origin", "master"])?;

        run_git(
            temp.path(),
            &[
                "clone",
                "--branch",
                "master",
                &remote.to_string_lossy(),
                "clone",
            ],
        )?;
        configure_identity(&clone)?;

        Ok(Self {
            _temp: temp,
            remote,
            clone,
        })
    }

    /// Working directory the bot operates on.
    pub fn path(&self) -> &Path {
        &self.clone
    }

    /// Whether `branch` exists on the remote.
    pub fn remote_has_branch(&self, branch: &str) -> Result<bool> {
        let out = run_git(&self.remote, &["branch", "--list", branch])?;
        Ok(!out.trim().is_empty())
    }

    /// Contents of `path` at the tip of `branch` on the remote.
    pub fn remote_file(&self, branch: &str, path: &str) -> Result<String> {
        run_git(&self.remote, &["show", &format!("{branch}:{path}")])
    }

    /// Commit `path` directly on the remote's `master` via the clone, then
    /// return the clone to a clean `master`.
    pub fn commit_on_master(&self, path: &str, content: &str) -> Result<()> {
        run_git(&self.clone, &["checkout", "master"])?;
        let full = self.clone.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        run_git(&self.clone, &["add", path])?;
        run_git(&self.clone, &["commit", "-m", "chore: seed document"])?;
        run_git(&self.clone, &["push", "origin", "master"])?;
        Ok(())
    }
}

fn configure_identity(dir: &Path) -> Result<()> {
    run_git(dir, &["config", "user.email", "test@example.com"])?;
    run_git(dir, &["config", "user.name", "test"])?;
    Ok(())
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        return Err(anyhow!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
