use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::config::{self, Env};
use crate::event::ActionContext;
use crate::github::HttpGitHub;
use crate::sync::{IssueRef, Synchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Synchronize the issue named by the triggering event.
    Event,
    /// Synchronize every open issue assigned to a tracked member.
    Sweep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Options),
    Help,
}

/// Parse arguments after the program name.
///
/// Supported forms:
///   teamsync [--dry-run] [--config <path>]
///   teamsync sweep [--dry-run] [--config <path>]
///   teamsync help
pub fn parse_args(args: &[String]) -> Result<Command> {
    let mut options = Options {
        mode: Mode::Event,
        dry_run: false,
        config: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "help" | "-h" | "--help" => return Ok(Command::Help),
            "sweep" if i == 0 => options.mode = Mode::Sweep,
            "--dry-run" | "-n" => options.dry_run = true,
            "--config" | "-c" => {
                i += 1;
                match args.get(i) {
                    Some(path) => options.config = Some(PathBuf::from(path)),
                    None => bail!("Missing value for --config"),
                }
            }
            other => bail!("Unknown argument '{other}'. Run `teamsync help` for usage."),
        }
        i += 1;
    }

    Ok(Command::Run(options))
}

pub async fn run(options: Options) -> Result<()> {
    let path = config::config_path(options.config.as_deref());
    let config = config::load_config(&path)?;
    let env = Env::from_env();

    let (issue_ref, repositories) = match options.mode {
        Mode::Event => {
            let raw = env
                .context
                .as_deref()
                .context("GITHUB_CONTEXT is not set; run inside a workflow or use `teamsync sweep`")?;
            let ctx = ActionContext::parse(raw)?;
            tracing::info!(
                action = ctx.event.action.as_deref().unwrap_or("-"),
                label = ctx.event.label.as_ref().map(|l| l.name.as_str()).unwrap_or("-"),
                issue = ctx.issue_url(),
                "handling issue event"
            );
            (
                IssueRef::Url(ctx.issue_url().to_string()),
                vec![ctx.repository_url().to_string()],
            )
        }
        Mode::Sweep => {
            if config.github.issue_repositories.is_empty() {
                bail!("Sweep mode needs github.issue_repositories in {}", path.display());
            }
            let repositories = config.github.repository_urls();
            (
                IssueRef::Assigned {
                    repositories: repositories.clone(),
                },
                repositories,
            )
        }
    };

    let token = env.token.as_deref().context("GITHUB_TOKEN is not set")?;
    let api = HttpGitHub::new(token)?;

    let sync = Synchronizer::from_config(&api, &config, options.dry_run);
    let report = sync
        .run(&issue_ref, &repositories)
        .await
        .context("Synchronization failed")?;

    let summary = report.summary;
    println!(
        "{} created, {} moved, {} not applied (dry run), {} unresolved",
        summary.created,
        summary.moved,
        summary.skipped,
        report.reconciliation.diagnostics.len()
    );
    Ok(())
}

pub fn print_help() {
    println!("teamsync — keep team project boards in step with issue progress\n");
    println!("USAGE:");
    println!("  teamsync             Synchronize the issue from GITHUB_CONTEXT");
    println!("  teamsync sweep       Synchronize all open issues assigned to team members");
    println!();
    println!("OPTIONS:");
    println!("  -n, --dry-run        Compute actions without writing to GitHub");
    println!("  -c, --config <path>  Config file (default: $TEAMSYNC_CONFIG or .github/teamsync.toml)");
    println!();
    println!("ENVIRONMENT:");
    println!("  GITHUB_TOKEN         API token (required)");
    println!("  GITHUB_CONTEXT       Workflow context JSON (event mode)");
    println!("  RUST_LOG             Log filter (default: info)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    fn options(cmd: Command) -> Options {
        match cmd {
            Command::Run(options) => options,
            Command::Help => panic!("expected run"),
        }
    }

    #[test]
    fn no_args_is_event_mode() {
        let opts = options(parse_args(&args(&[])).unwrap());
        assert_eq!(opts.mode, Mode::Event);
        assert!(!opts.dry_run);
        assert_eq!(opts.config, None);
    }

    #[test]
    fn sweep_with_flags() {
        let opts =
            options(parse_args(&args(&["sweep", "--dry-run", "-c", "teams.toml"])).unwrap());
        assert_eq!(opts.mode, Mode::Sweep);
        assert!(opts.dry_run);
        assert_eq!(opts.config, Some(PathBuf::from("teams.toml")));
    }

    #[test]
    fn sweep_only_as_first_word() {
        assert!(parse_args(&args(&["--dry-run", "sweep"])).is_err());
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse_args(&args(&["--dry-run", "--help"])).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["help"])).unwrap(), Command::Help);
    }

    #[test]
    fn missing_config_value_fails() {
        let err = parse_args(&args(&["--config"])).unwrap_err();
        assert!(err.to_string().contains("Missing value"));
    }

    #[test]
    fn unknown_argument_fails() {
        let err = parse_args(&args(&["--force"])).unwrap_err();
        assert!(err.to_string().contains("--force"));
    }
}
