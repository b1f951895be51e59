//! Command-line surface: argument parsing and dispatch to the workflow.

pub mod orchestration;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::context::{ReleaseContext, ReleaseOptions};
use crate::domain::ReleaseType;
use crate::git::Git2Repository;
use crate::ui::{self, ConsolePrompter};
use crate::workflow;

use orchestration::PipelineOptions;

#[derive(Parser, Debug)]
#[command(
    name = "release-flow",
    version,
    about = "Cut snapshot and final releases of a Cargo package from a develop/master git flow"
)]
pub struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        help = "Project root (defaults to the enclosing git work tree)"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Release, publish, then bump to the next working version
    Release(ReleaseArgs),
    /// Merge the release branches and move to the next working version
    BumpVersion(BumpArgs),
    /// Show the package version and what each release type would propose
    Status,
}

#[derive(clap::Args, Debug)]
pub struct ReleaseArgs {
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        value_parser = parse_release_type,
        help = "snapshot, final or testfinal"
    )]
    pub release_type: ReleaseType,

    #[arg(long, help = "Preview what would happen without making changes")]
    pub dry_run: bool,

    #[arg(long, help = "Skip the branch and clean-tree checks")]
    pub disable_checks: bool,

    #[arg(long, help = "Do not run the build and test commands")]
    pub skip_build: bool,

    #[arg(long, value_name = "VERSION", help = "Release this version without prompting")]
    pub set_version: Option<String>,

    #[arg(short = 'y', long, help = "Skip the release confirmation prompt")]
    pub yes: bool,

    #[arg(long, help = "Do not package and publish the crate")]
    pub no_publish: bool,

    #[arg(long, help = "Stop after the release; do not bump the version")]
    pub no_bump: bool,
}

#[derive(clap::Args, Debug)]
pub struct BumpArgs {
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        value_parser = parse_release_type,
        help = "Type of the release just made"
    )]
    pub release_type: ReleaseType,

    #[arg(long, help = "Preview what would happen without making changes")]
    pub dry_run: bool,
}

fn parse_release_type(value: &str) -> std::result::Result<ReleaseType, String> {
    value.parse::<ReleaseType>().map_err(|e| e.to_string())
}

/// Runs the selected subcommand.
pub fn run(args: Args) -> Result<()> {
    let (repo, project_root) = open_project(args.project_root.as_deref())?;
    let config = config::load_config(args.config.as_deref(), &project_root)
        .context("Error loading config")?;

    match args.command {
        Command::Release(release_args) => run_release(release_args, &config, repo, project_root),
        Command::BumpVersion(bump_args) => run_bump(bump_args, &config, repo, project_root),
        Command::Status => run_status(&config, repo, project_root),
    }
}

fn open_project(explicit_root: Option<&Path>) -> Result<(Git2Repository, PathBuf)> {
    let start = explicit_root.unwrap_or_else(|| Path::new("."));
    let repo = Git2Repository::open(start)?;
    let root = match explicit_root {
        Some(root) => root.to_path_buf(),
        None => repo.root().to_path_buf(),
    };
    log::debug!("project root {}", root.display());
    Ok((repo, root))
}

fn run_release(
    args: ReleaseArgs,
    config: &Config,
    repo: Git2Repository,
    project_root: PathBuf,
) -> Result<()> {
    let mut options = ReleaseOptions::new(project_root, args.release_type);
    options.dry_run = args.dry_run;
    options.disable_checks = args.disable_checks;
    options.run_build = !args.skip_build;
    options.assume_yes = args.yes;
    options.version_override = args.set_version;

    let ctx = ReleaseContext::new(options, config, repo)?;
    let pipeline = PipelineOptions {
        publish: !args.no_publish,
        bump: !args.no_bump,
    };

    let mut prompter = ConsolePrompter::stdin();
    let result = orchestration::run_release_pipeline(&ctx, &mut prompter, pipeline)?;

    let release = &result.release;
    if ctx.dry_run {
        ui::display_success(&format!(
            "Dry run complete: {} {} would be tagged {}",
            release.package_name, release.version, release.tag
        ));
    } else {
        ui::display_success(&format!(
            "Released {} {} (tag {})",
            release.package_name, release.version, release.tag
        ));
    }
    if let Some(bump) = &result.bump {
        ui::display_status(&format!("Working version is now {}", bump.version));
    }
    Ok(())
}

fn run_bump(
    args: BumpArgs,
    config: &Config,
    repo: Git2Repository,
    project_root: PathBuf,
) -> Result<()> {
    let mut options = ReleaseOptions::new(project_root, args.release_type);
    options.dry_run = args.dry_run;

    let ctx = ReleaseContext::new(options, config, repo)?;
    let outcome = workflow::bump_version(&ctx)?;
    ui::display_success(&format!("Working version is now {}", outcome.version));
    Ok(())
}

fn run_status(config: &Config, repo: Git2Repository, project_root: PathBuf) -> Result<()> {
    let mut options = ReleaseOptions::new(project_root, ReleaseType::Snapshot);
    options.dry_run = true;

    let ctx = ReleaseContext::new(options, config, repo)?;
    let report = orchestration::status_report(&ctx)?;
    ui::display_status_report(&report);
    Ok(())
}
