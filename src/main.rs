use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_bump::cli::{self, BumpWorkflowArgs, ReleaseWorkflowArgs};
use git_bump::config::{self, Config};
use git_bump::domain::BumpType;
use git_bump::git::Git2Repository;
use git_bump::ui;

#[derive(Parser)]
#[command(
    name = "git-bump",
    version,
    about = "Compute and apply semantic version releases across major lines"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging on stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the next version without changing any ref
    Bump {
        #[arg(short = 't', long = "type", value_enum)]
        bump_type: BumpType,

        #[arg(short, long, help = "Target branch (defaults to the current branch)")]
        branch: Option<String>,
    },
    /// Compute the next version, then create its tag, alias and release branch
    Release {
        #[arg(short = 't', long = "type", value_enum)]
        bump_type: BumpType,

        #[arg(short, long, help = "Target branch (defaults to the current branch)")]
        branch: Option<String>,

        #[arg(long, help = "Push the release refs to the configured remote")]
        push: bool,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,

        #[arg(short, long, help = "Skip confirmation prompts")]
        force: bool,
    },
    /// Show the release lines of the repository
    Status,
    /// Run scenario fixtures (files or directories of *.json)
    Verify {
        #[arg(required = true)]
        fixtures: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "git_bump=debug" } else { "git_bump=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but did not succeed
fn run(args: Args) -> Result<bool> {
    match args.command {
        Command::Bump { bump_type, branch } => {
            let config = load_config(args.config.as_deref())?;
            let repo = Git2Repository::open(".")?;
            let result =
                cli::run_bump_workflow(&repo, &BumpWorkflowArgs { bump_type, branch }, &config)?;
            ui::display_outputs(&result.outputs);
            Ok(true)
        }
        Command::Release {
            bump_type,
            branch,
            push,
            dry_run,
            force,
        } => {
            let config = load_config(args.config.as_deref())?;
            let mut repo = Git2Repository::open(".")?;
            let release_args = ReleaseWorkflowArgs {
                bump_type,
                branch,
                push,
                dry_run,
                force,
            };
            match cli::run_release_workflow(&mut repo, &release_args, &config, ui::confirm_action)? {
                Some(result) => {
                    ui::display_outputs(&result.outputs);
                    if !dry_run {
                        ui::display_success(&format!("Released {}", result.bump.new_version));
                    }
                    Ok(true)
                }
                None => {
                    ui::display_status("Operation cancelled by user.");
                    Ok(false)
                }
            }
        }
        Command::Status => {
            let config = load_config(args.config.as_deref())?;
            let repo = Git2Repository::open(".")?;
            let report = cli::run_status(&repo, &config)?;
            ui::display_status_report(&report);
            Ok(true)
        }
        Command::Verify { fixtures } => {
            let reports = cli::run_verify(&fixtures)?;
            for report in &reports {
                ui::display_scenario_report(report);
            }
            let failed = reports.iter().filter(|r| !r.passed()).count();
            println!("\n{} scenarios, {} failed", reports.len(), failed);
            Ok(failed == 0)
        }
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    Ok(config::load_config(path)?)
}
