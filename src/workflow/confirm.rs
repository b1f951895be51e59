use semver::Version;

use crate::context::ReleaseContext;
use crate::domain::{version, ReleaseType};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::ui::{self, Prompter};

/// Settles the version to release from `current` (the manifest version).
///
/// The operator confirms or replaces the proposed version, then the release
/// type's transformation is applied: snapshots get the commit hash, test
/// finals get the `TESTFINALRELEASE` label, finals are used as typed.
pub fn confirm_version<R, P>(
    ctx: &ReleaseContext<R>,
    prompter: &mut P,
    current: &Version,
) -> Result<Version>
where
    R: Repository,
    P: Prompter,
{
    let confirmed = match &ctx.version_override {
        Some(preset) => version::validate_proposed_version(ctx.release_type, preset)
            .map_err(|rejection| ReleaseError::version(rejection.to_string()))?,
        None => prompt_for_version(ctx.release_type, prompter, current)?,
    };

    match ctx.release_type {
        ReleaseType::Snapshot => ctx.to_snapshot_release(&confirmed),
        ReleaseType::TestFinal => Ok(version::to_test_final_release(&confirmed)),
        ReleaseType::Final => Ok(confirmed),
    }
}

/// Asks until the operator gives a version that suits `release_type`.
///
/// An empty answer accepts the offered default. Running out of input aborts.
pub fn prompt_for_version<P: Prompter>(
    release_type: ReleaseType,
    prompter: &mut P,
    current: &Version,
) -> Result<Version> {
    let offered = version::presentation_version(release_type, current);
    let prompt = format!("Set version [{}]: ", offered);

    loop {
        let Some(answer) = prompter.ask(&prompt)? else {
            return Err(ReleaseError::aborted("no version was confirmed"));
        };

        if answer.is_empty() {
            return Ok(offered);
        }

        match version::validate_proposed_version(release_type, &answer) {
            Ok(version) => return Ok(version),
            Err(rejection) => {
                log::debug!("rejected version {:?}: {:?}", answer, rejection);
                ui::display_error(&rejection.to_string());
            }
        }
    }
}
