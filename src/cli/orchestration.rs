//! Release pipeline orchestration
//!
//! Chains the release, the registry upload and the post-release bump into
//! the single run the `release` command performs, and assembles the
//! `status` report. Kept free of clap so it can be driven from tests.

use crate::build;
use crate::context::ReleaseContext;
use crate::domain::{version, ReleaseType};
use crate::error::Result;
use crate::git::Repository;
use crate::ui::{self, Prompter, StatusReport};
use crate::workflow::{self, BumpOutcome, ReleaseOutcome};

/// Optional pipeline stages after the release itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Package and upload the released crate
    pub publish: bool,
    /// Move to the next working version afterwards
    pub bump: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            publish: true,
            bump: true,
        }
    }
}

/// Result of a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub release: ReleaseOutcome,
    /// Whether the crate was uploaded
    pub published: bool,
    /// `None` when the bump was disabled
    pub bump: Option<BumpOutcome>,
}

/// Release, publish, then bump.
///
/// Stops at the first failure. A failed publish leaves the release
/// commit and tag in place and skips the bump.
pub fn run_release_pipeline<R, P>(
    ctx: &ReleaseContext<R>,
    prompter: &mut P,
    options: PipelineOptions,
) -> Result<PipelineResult>
where
    R: Repository,
    P: Prompter,
{
    let release = workflow::release(ctx, prompter)?;
    let published = publish_release(ctx, options.publish)?;

    let bump = if options.bump {
        Some(workflow::bump_version(ctx)?)
    } else {
        log::info!("version bump disabled");
        None
    };

    Ok(PipelineResult {
        release,
        published,
        bump,
    })
}

fn publish_release<R: Repository>(ctx: &ReleaseContext<R>, enabled: bool) -> Result<bool> {
    if !enabled {
        log::info!("publishing disabled");
        return Ok(false);
    }
    if !ctx.release_type.is_publishable() {
        ui::display_status("Test-final releases are not published.");
        return Ok(false);
    }
    if ctx.dry_run {
        ui::display_dry_run("would package and publish the crate");
        return Ok(false);
    }

    build::package(&ctx.commands, ctx.project_root())?;
    build::publish(&ctx.commands, ctx.project_root())?;
    Ok(true)
}

/// Reads the manifest and repository state for the `status` command
pub fn status_report<R: Repository>(ctx: &ReleaseContext<R>) -> Result<StatusReport> {
    let package = ctx.read_manifest()?;
    let proposals = ReleaseType::ALL
        .iter()
        .map(|&release_type| {
            (
                release_type,
                version::presentation_version(release_type, &package.version),
            )
        })
        .collect();

    Ok(StatusReport {
        package_name: package.name,
        version: package.version,
        branch: ctx.active_branch()?,
        dirty: ctx.is_dirty()?,
        proposals,
    })
}
