//! CLI tests: spawn the binary and check output and exit codes.

use std::fs;
use std::process::Command;

use working_bot::exit_codes;
use working_bot::io::config::load_config;

fn bot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_working-bot"))
}

#[test]
fn path_prints_document_path() {
    let output = bot().args(["path", "Weekly-2"]).output().expect("run");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "2019/2019-04-15-weekly.md"
    );
}

#[test]
fn path_rejects_malformed_title() {
    let output = bot().args(["path", "WeeklyReport"]).output().expect("run");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed weekly title"));
}

#[test]
fn rollover_without_repository_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = bot()
        .current_dir(temp.path())
        .args(["rollover", "--issue", "1"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("owner must be non-empty"));
}

#[test]
fn init_config_writes_overrides_and_refuses_to_clobber() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("bot.toml");
    let path_arg = path.to_string_lossy().to_string();

    let status = bot()
        .args(["init-config", "-c", &path_arg, "-o", "dyweb", "-r", "weekly"])
        .status()
        .expect("run");
    assert_eq!(status.code(), Some(exit_codes::OK));
    let cfg = load_config(&path).expect("load");
    assert_eq!(cfg.owner, "dyweb");
    assert_eq!(cfg.repo, "weekly");
    cfg.validate().expect("valid");

    let before = fs::read_to_string(&path).expect("read");
    let status = bot()
        .args(["init-config", "-c", &path_arg, "-o", "other"])
        .status()
        .expect("run");
    assert_eq!(status.code(), Some(exit_codes::INVALID));
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}
