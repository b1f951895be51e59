//! Version transformations for each release type.
//!
//! All helpers keep `major.minor.patch` (except the next-patch bump) and drop
//! any build metadata.

use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};

use crate::domain::release_type::ReleaseType;
use crate::error::{ReleaseError, Result};

/// Prerelease label carried by in-progress versions
pub const SNAPSHOT: &str = "SNAPSHOT";

/// Prerelease label carried by rehearsal final releases
pub const TEST_FINAL_RELEASE: &str = "TESTFINALRELEASE";

fn with_prerelease(version: &Version, pre: Prerelease) -> Version {
    Version {
        major: version.major,
        minor: version.minor,
        patch: version.patch,
        pre,
        build: BuildMetadata::EMPTY,
    }
}

// Only called with the label constants above, which are valid identifiers.
fn literal_label(label: &'static str) -> Prerelease {
    Prerelease::new(label).expect("release labels are valid prerelease identifiers")
}

/// `1.2.3` or `1.2.3-abc1234` -> `1.2.3-SNAPSHOT`
pub fn to_snapshot(version: &Version) -> Version {
    with_prerelease(version, literal_label(SNAPSHOT))
}

/// `1.2.3` -> `1.2.4-SNAPSHOT`
///
/// Fails when the patch number is already `u64::MAX`.
pub fn to_next_patch_snapshot(version: &Version) -> Result<Version> {
    let mut next = to_snapshot(version);
    next.patch = version.patch.checked_add(1).ok_or_else(|| {
        ReleaseError::version(format!(
            "Cannot bump {}: the patch number is at its maximum",
            version
        ))
    })?;
    Ok(next)
}

/// Replaces the prerelease with the short hash of the commit being released.
///
/// Fails only when the hash is not a legal prerelease identifier, which
/// happens for an all-digit hash with a leading zero.
pub fn to_snapshot_release(version: &Version, short_hash: &str) -> Result<Version> {
    let pre = Prerelease::new(short_hash).map_err(|e| {
        ReleaseError::version(format!(
            "Commit hash '{}' cannot be used as a prerelease label: {}",
            short_hash, e
        ))
    })?;
    Ok(with_prerelease(version, pre))
}

/// `1.2.3` -> `1.2.3-TESTFINALRELEASE`
pub fn to_test_final_release(version: &Version) -> Version {
    with_prerelease(version, literal_label(TEST_FINAL_RELEASE))
}

/// `1.2.3-SNAPSHOT` -> `1.2.3`
pub fn to_final_release(version: &Version) -> Version {
    with_prerelease(version, Prerelease::EMPTY)
}

/// The default offered at the version prompt for a release type
pub fn presentation_version(release_type: ReleaseType, version: &Version) -> Version {
    match release_type {
        ReleaseType::Snapshot => to_snapshot(version),
        ReleaseType::Final | ReleaseType::TestFinal => to_final_release(version),
    }
}

/// Whether the first prerelease segment is `SNAPSHOT`, ignoring case
pub fn is_snapshot(version: &Version) -> bool {
    version
        .pre
        .as_str()
        .split('.')
        .next()
        .is_some_and(|segment| segment.eq_ignore_ascii_case(SNAPSHOT))
}

/// Why a proposed version was refused at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRejection {
    /// Not a semantic version at all
    Malformed { input: String, reason: String },
    /// Valid semver, but the prerelease does not suit the release type
    WrongPrerelease {
        input: String,
        release_type: ReleaseType,
    },
}

impl fmt::Display for VersionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRejection::Malformed { input, reason } => write!(
                f,
                "{} does not fit the semantic versioning spec ({})",
                input, reason
            ),
            VersionRejection::WrongPrerelease {
                input,
                release_type,
            } => write!(
                f,
                "{} does not fit the semantic versioning spec or is not valid given the specified release type of {}.",
                input, release_type
            ),
        }
    }
}

/// Checks a version typed by the operator against the release type.
///
/// Snapshot releases need a `SNAPSHOT` prerelease; final and test-final
/// releases need no prerelease at all.
pub fn validate_proposed_version(
    release_type: ReleaseType,
    input: &str,
) -> std::result::Result<Version, VersionRejection> {
    let version = Version::parse(input.trim()).map_err(|e| VersionRejection::Malformed {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    let fits = match release_type {
        ReleaseType::Snapshot => is_snapshot(&version),
        ReleaseType::Final | ReleaseType::TestFinal => version.pre.is_empty(),
    };

    if fits {
        Ok(version)
    } else {
        Err(VersionRejection::WrongPrerelease {
            input: input.to_string(),
            release_type,
        })
    }
}
