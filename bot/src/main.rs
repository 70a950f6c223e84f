//! Weekly report rollover bot.
//!
//! `working-bot rollover` closes out the open `Weekly-<N>` issue, opens the
//! next one and proposes the period's report as a pull request.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use working_bot::core::types::RolloverOutcome;
use working_bot::core::weekly::{date_for_period, parse_title, path_for_period};
use working_bot::exit_codes;
use working_bot::io::config::{BotConfig, DEFAULT_CONFIG_PATH, load_config, write_config};
use working_bot::io::document::TemplateGenerator;
use working_bot::io::gh::GhCli;
use working_bot::io::git::Git;
use working_bot::io::store::GitStore;
use working_bot::io::tracker::GhTracker;
use working_bot::logging;
use working_bot::rollover::{RolloverConfig, RolloverWorker};

#[derive(Parser)]
#[command(name = "working-bot", version, about = "Weekly report rollover bot")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for values normally read from the config file.
#[derive(Args, Debug, Default)]
struct RepoArgs {
    /// GitHub account owning the weekly repository.
    #[arg(short, long)]
    owner: Option<String>,
    /// Weekly repository name.
    #[arg(short, long)]
    repo: Option<String>,
    /// Local clone of the weekly repository.
    #[arg(short = 'w', long = "work-dir")]
    work_dir: Option<PathBuf>,
    /// Access token passed to `gh`.
    #[arg(short = 't', long = "token")]
    token: Option<String>,
}

impl RepoArgs {
    fn apply(self, cfg: &mut BotConfig) {
        if let Some(owner) = self.owner {
            cfg.owner = owner;
        }
        if let Some(repo) = self.repo {
            cfg.repo = repo;
        }
        if let Some(work_dir) = self.work_dir {
            cfg.work_dir = work_dir;
        }
        if let Some(token) = self.token {
            cfg.access_token = Some(token);
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Roll the current weekly issue over to the next period.
    Rollover {
        #[command(flatten)]
        repo: RepoArgs,
        /// Issue to close out. Defaults to the single open issue with the working label.
        #[arg(long)]
        issue: Option<u64>,
    },
    /// Print the document path for a `Weekly-<N>` title.
    Path { title: String },
    /// Write a config file with defaults and any overrides given.
    InitConfig {
        #[command(flatten)]
        repo: RepoArgs,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Rollover { repo, issue } => cmd_rollover(&cli.config, repo, issue),
        Command::Path { title } => cmd_path(&title),
        Command::InitConfig { repo, force } => cmd_init_config(&cli.config, repo, force),
    }
}

fn cmd_rollover(config_path: &Path, overrides: RepoArgs, issue_number: Option<u64>) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    overrides.apply(&mut cfg);
    cfg.validate()
        .with_context(|| format!("invalid config {}", config_path.display()))?;

    let repo = cfg.repo_slug();
    let tracker = GhTracker::new(GhCli::new(
        cfg.access_token.clone(),
        cfg.command_timeout(),
        cfg.output_limit_bytes,
    ));
    let issue = match issue_number {
        Some(number) => tracker.fetch_issue(&repo, number)?,
        None => tracker.find_working_issue(&repo, &cfg.label)?,
    };
    info!(number = issue.number, title = %issue.title, "rolling over");

    let git = Git::new(&cfg.work_dir).with_limits(cfg.command_timeout(), cfg.output_limit_bytes);
    let store = GitStore::new(git, &cfg.remote, &cfg.base_branch);
    let worker = RolloverWorker::new(
        RolloverConfig::from_bot_config(&cfg),
        tracker,
        store,
        TemplateGenerator::new(),
    );

    match worker.handle_weekly(&issue) {
        Ok(RolloverOutcome::Submitted(pr)) => {
            println!("submitted {}", pr.url);
            Ok(exit_codes::OK)
        }
        Ok(RolloverOutcome::NoChange) => {
            println!("no change");
            Ok(exit_codes::OK)
        }
        Err(err) => {
            eprintln!("{err}");
            if err.stage.after_remote_calls() {
                Ok(exit_codes::STAGE_FAILED)
            } else {
                Ok(exit_codes::INVALID)
            }
        }
    }
}

fn cmd_path(title: &str) -> Result<i32> {
    let period = parse_title(title)?;
    info!(
        period = period.number(),
        date = %date_for_period(period).format("%Y-%m-%d"),
        "resolved period"
    );
    println!("{}", path_for_period(period));
    Ok(exit_codes::OK)
}

fn cmd_init_config(path: &Path, overrides: RepoArgs, force: bool) -> Result<i32> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    let mut cfg = BotConfig::default();
    overrides.apply(&mut cfg);
    write_config(path, &cfg)?;
    println!("{}", path.display());
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rollover_with_overrides() {
        let cli = Cli::parse_from([
            "working-bot",
            "rollover",
            "-o",
            "dyweb",
            "-r",
            "weekly",
            "-w",
            "/srv/weekly",
            "--issue",
            "500",
        ]);
        let Command::Rollover { repo, issue } = cli.command else {
            panic!("expected rollover");
        };
        assert_eq!(issue, Some(500));
        assert_eq!(repo.owner.as_deref(), Some("dyweb"));
        assert_eq!(repo.repo.as_deref(), Some("weekly"));
        assert_eq!(repo.work_dir, Some(PathBuf::from("/srv/weekly")));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_rollover_without_issue() {
        let cli = Cli::parse_from(["working-bot", "rollover"]);
        assert!(matches!(cli.command, Command::Rollover { issue: None, .. }));
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["working-bot", "path", "Weekly-3", "--config", "bot.toml"]);
        assert_eq!(cli.config, PathBuf::from("bot.toml"));
        assert!(matches!(cli.command, Command::Path { ref title } if title == "Weekly-3"));
    }

    #[test]
    fn parse_init_config_force() {
        let cli = Cli::parse_from(["working-bot", "init-config", "--force"]);
        assert!(matches!(cli.command, Command::InitConfig { force: true, .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = BotConfig {
            owner: "old".to_string(),
            repo: "weekly".to_string(),
            ..BotConfig::default()
        };
        RepoArgs {
            owner: Some("dyweb".to_string()),
            token: Some("ghp_x".to_string()),
            ..RepoArgs::default()
        }
        .apply(&mut cfg);
        assert_eq!(cfg.owner, "dyweb");
        assert_eq!(cfg.repo, "weekly");
        assert_eq!(cfg.access_token.as_deref(), Some("ghp_x"));
    }
}
