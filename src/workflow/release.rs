use semver::Version;

use crate::build;
use crate::context::ReleaseContext;
use crate::domain::ReleaseType;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::manifest::PackageInfo;
use crate::ui::{self, Prompter};
use crate::workflow::confirm_version;

/// What a release produced
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub package_name: String,
    pub version: Version,
    pub tag: String,
    /// Id of the release commit; `None` in dry-run
    pub commit: Option<String>,
    pub tagged: bool,
    pub pushed: bool,
}

/// Refuses to release from anywhere but a clean develop branch.
///
/// Does nothing when checks are disabled.
pub fn check_preconditions<R: Repository>(ctx: &ReleaseContext<R>) -> Result<()> {
    if ctx.disable_checks {
        log::warn!("branch and working tree checks are disabled");
        return Ok(());
    }

    let branch = ctx.active_branch()?;
    if !branch.eq_ignore_ascii_case(&ctx.branches.develop) {
        return Err(ReleaseError::precondition(format!(
            "You must be on the {} branch in order to do a release. You are on branch {}",
            ctx.branches.develop, branch
        )));
    }

    if ctx.is_dirty()? {
        return Err(ReleaseError::precondition(format!(
            "There are uncommitted changes on the {} branch.",
            ctx.branches.develop
        )));
    }

    log::debug!("on clean branch {}", branch);
    Ok(())
}

/// Cuts a release of the package in `ctx.project_root`.
///
/// Runs the gates in order (operator confirmation, branch, clean tree), then
/// settles the version, rewrites the manifest, builds and tests, and finally
/// commits, tags and pushes. Any failure stops the sequence where it is.
pub fn release<R, P>(ctx: &ReleaseContext<R>, prompter: &mut P) -> Result<ReleaseOutcome>
where
    R: Repository,
    P: Prompter,
{
    if !ctx.dry_run && !ctx.assume_yes {
        ui::display_release_warning();
        if !prompter.confirm("Confirm")? {
            return Err(ReleaseError::aborted("the release was not confirmed"));
        }
    }

    log::info!("starting {} release in {}", ctx.release_type, ctx.project_root.display());
    check_preconditions(ctx)?;

    if ctx.release_type == ReleaseType::TestFinal {
        ctx.reset_test_branch(&ctx.branches.test_develop)?;
    }

    let PackageInfo {
        name,
        version: starting,
    } = ctx.read_manifest()?;
    ui::display_status(&format!(
        "starting version = {}, package name = {}",
        starting, name
    ));

    let version = confirm_version(ctx, prompter, &starting)?;
    ui::display_status(&format!("Releasing {} version {}", name, version));

    ctx.update_version_in_files(&version)?;

    if ctx.run_build {
        build::build_and_test(&ctx.commands, ctx.project_root())?;
        ui::display_success("Build and tests completed successfully.");
    } else {
        log::warn!("skipping build and tests");
    }

    let commit = ctx.commit_release(&format!("Release commit for {}.", version))?;
    if let Some(id) = &commit {
        log::info!("release commit {}", id);
    }

    let tag = ctx.tag_pattern.format(&name, &version);
    let tagged = ctx.tag_release(&tag, &tag)?;
    if tagged {
        ui::display_success(&format!("Created tag {}", tag));
    }

    let pushed = ctx.push_to_origin()?;

    Ok(ReleaseOutcome {
        package_name: name,
        version,
        tag,
        commit,
        tagged,
        pushed,
    })
}
