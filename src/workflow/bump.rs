use semver::Version;

use crate::context::ReleaseContext;
use crate::domain::version;
use crate::error::Result;
use crate::git::Repository;
use crate::ui;

/// What the post-release bump produced
#[derive(Debug, Clone, PartialEq)]
pub struct BumpOutcome {
    /// The working version now in the manifest
    pub version: Version,
    pub commit: Option<String>,
    pub pushed: bool,
}

/// Moves the project on to its next working version.
///
/// A snapshot release only puts the `SNAPSHOT` label back. A final release
/// first merges develop into master, then bumps develop to the next patch
/// snapshot. Test-final releases do the same against testdevelop, with
/// testmaster recreated from HEAD instead of checked out.
pub fn bump_version<R: Repository>(ctx: &ReleaseContext<R>) -> Result<BumpOutcome> {
    let current = ctx.read_manifest()?.version;

    let (next, message) = match ctx.release_type.integration_branches(&ctx.branches) {
        None => (
            version::to_snapshot(&current),
            "Rewrite version to SNAPSHOT.".to_string(),
        ),
        Some(branches) => {
            let next = version::to_next_patch_snapshot(&current)?;

            if branches.ephemeral {
                ctx.reset_test_branch(branches.master)?;
            } else {
                ctx.checkout(branches.master)?;
            }
            ctx.merge(branches.develop)?;
            ui::display_success(&format!(
                "Merged {} into {}.",
                branches.develop, branches.master
            ));
            ctx.checkout(branches.develop)?;

            let message = format!("Bumped version to {}.", next);
            (next, message)
        }
    };

    log::info!("bumping {} to {}", current, next);
    ctx.update_version_in_files(&next)?;
    ui::display_success("Updated files with SNAPSHOT specifier.");

    let commit = ctx.commit_release(&message)?;
    let pushed = ctx.push_to_origin()?;

    Ok(BumpOutcome {
        version: next,
        commit,
        pushed,
    })
}
