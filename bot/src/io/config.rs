//! Bot configuration stored in `working-bot.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::RepoSlug;

pub const DEFAULT_CONFIG_PATH: &str = "working-bot.toml";

/// Bot configuration (TOML).
///
/// Missing fields default to the values the weekly repository has always
/// used; `owner`, `repo` and `work_dir` normally come from the file or flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BotConfig {
    /// GitHub account owning the weekly repository.
    pub owner: String,
    pub repo: String,

    /// Local clone of the weekly repository.
    pub work_dir: PathBuf,

    /// Token handed to `gh` as `GH_TOKEN`. Falls back to `gh`'s own login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Listen address carried for an HTTP front end; the rollover never reads it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_listen: Option<String>,

    pub base_branch: String,
    pub remote: String,

    /// Label marking the issue of the period in progress.
    pub label: String,

    /// Assignee of each newly opened weekly issue.
    pub assignee: String,

    /// Upper bound for a single git or gh invocation.
    pub command_timeout_secs: u64,

    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            work_dir: PathBuf::from("."),
            access_token: None,
            http_listen: None,
            base_branch: "master".to_string(),
            remote: "origin".to_string(),
            label: "working".to_string(),
            assignee: "gaocegege-bot".to_string(),
            command_timeout_secs: 120,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("owner", self.owner.as_str()),
            ("repo", self.repo.as_str()),
            ("base_branch", self.base_branch.as_str()),
            ("remote", self.remote.as_str()),
            ("label", self.label.as_str()),
            ("assignee", self.assignee.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{name} must be non-empty"));
            }
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(anyhow!("work_dir must be non-empty"));
        }
        if self.command_timeout_secs == 0 {
            return Err(anyhow!("command_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn repo_slug(&self) -> RepoSlug {
        RepoSlug::new(&self.owner, &self.repo)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BotConfig::default()`. Validation is left
/// to the caller so command-line overrides can be applied first.
pub fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        return Ok(BotConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BotConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &BotConfig) -> Result<()> {
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
