//! `GitStore` against a real clone with a bare remote.

use working_bot::core::types::CommitOutcome;
use working_bot::core::weekly::{Period, path_for_period};
use working_bot::io::git::Git;
use working_bot::io::store::{FileStore, GitStore};
use working_bot::test_support::TestRepo;

fn store(repo: &TestRepo) -> GitStore {
    GitStore::new(Git::new(repo.path()), "origin", "master")
}

#[test]
fn changed_document_is_committed_and_pushed() {
    let repo = TestRepo::new().expect("repo");
    let store = store(&repo);
    let path = path_for_period(Period::new(1).expect("period"));

    store.prepare_branch("weekly/1-test").expect("prepare");
    assert_eq!(
        Git::new(repo.path()).current_branch().expect("branch"),
        "weekly/1-test"
    );
    store.write_file(&path, "# Weekly-1\n").expect("write");
    let outcome = store
        .commit_and_push("weekly/1-test", "weekly: add Weekly-1 report")
        .expect("commit");

    assert_eq!(outcome, CommitOutcome::Pushed);
    assert!(repo.remote_has_branch("weekly/1-test").expect("list"));
    assert_eq!(
        repo.remote_file("weekly/1-test", "2019/2019-04-08-weekly.md")
            .expect("show"),
        "# Weekly-1\n"
    );
}

#[test]
fn identical_document_reports_nothing_changed_and_drops_branch() {
    let repo = TestRepo::new().expect("repo");
    repo.commit_on_master("2019/2019-04-08-weekly.md", "# Weekly-1\n")
        .expect("seed");
    let store = store(&repo);
    let path = path_for_period(Period::new(1).expect("period"));

    store.prepare_branch("weekly/1-again").expect("prepare");
    assert_eq!(
        store.read_file(&path).expect("read").as_deref(),
        Some("# Weekly-1\n")
    );
    store.write_file(&path, "# Weekly-1\n").expect("write");
    let outcome = store
        .commit_and_push("weekly/1-again", "weekly: add Weekly-1 report")
        .expect("commit");

    assert_eq!(outcome, CommitOutcome::NothingChanged);
    assert!(!repo.remote_has_branch("weekly/1-again").expect("list"));
    let git = Git::new(repo.path());
    assert_eq!(git.current_branch().expect("branch"), "master");
    assert!(!git.branch_exists("weekly/1-again").expect("exists"));
}

#[test]
fn prepare_refuses_dirty_tree() {
    let repo = TestRepo::new().expect("repo");
    std::fs::write(repo.path().join("stray.txt"), "oops\n").expect("write");

    let err = store(&repo).prepare_branch("weekly/2-dirty").unwrap_err();
    assert!(err.to_string().contains("not clean"), "{err:#}");
}

#[test]
fn prepare_starts_from_latest_base() {
    let repo = TestRepo::new().expect("repo");
    let store = store(&repo);

    // First run leaves the clone on its branch; the next run must return to master.
    store.prepare_branch("weekly/3-first").expect("prepare");
    store
        .write_file(&path_for_period(Period::new(3).expect("period")), "three\n")
        .expect("write");
    store
        .commit_and_push("weekly/3-first", "weekly: add Weekly-3 report")
        .expect("commit");

    store.prepare_branch("weekly/4-second").expect("prepare again");
    let path3 = path_for_period(Period::new(3).expect("period"));
    assert_eq!(store.read_file(&path3).expect("read"), None);
}

#[test]
fn prepare_rejects_existing_branch_name() {
    let repo = TestRepo::new().expect("repo");
    let store = store(&repo);
    Git::new(repo.path())
        .checkout_new_branch("weekly/5-taken")
        .expect("create");
    Git::new(repo.path()).checkout_branch("master").expect("back");

    let err = store.prepare_branch("weekly/5-taken").unwrap_err();
    assert!(err.to_string().contains("already exists"));
}
