use std::fmt;
use std::str::FromStr;

use crate::domain::branch::{BranchNames, IntegrationBranches};
use crate::error::{ReleaseError, Result};

/// The kind of release being cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseType {
    /// In-progress build labelled with the commit hash
    Snapshot,
    /// Stable release merged from develop into master
    Final,
    /// Final release rehearsed on throwaway branches
    TestFinal,
}

impl ReleaseType {
    pub const ALL: [ReleaseType; 3] = [
        ReleaseType::Snapshot,
        ReleaseType::Final,
        ReleaseType::TestFinal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Snapshot => "snapshot",
            ReleaseType::Final => "final",
            ReleaseType::TestFinal => "testfinal",
        }
    }

    /// Branches the post-release merge runs against.
    ///
    /// Snapshot releases stay on the working branch and return `None`.
    pub fn integration_branches<'a>(
        &self,
        names: &'a BranchNames,
    ) -> Option<IntegrationBranches<'a>> {
        match self {
            ReleaseType::Snapshot => None,
            ReleaseType::Final => Some(IntegrationBranches {
                develop: &names.develop,
                master: &names.master,
                ephemeral: false,
            }),
            ReleaseType::TestFinal => Some(IntegrationBranches {
                develop: &names.test_develop,
                master: &names.test_master,
                ephemeral: true,
            }),
        }
    }

    /// Whether artifacts of this release may be published to the registry
    pub fn is_publishable(&self) -> bool {
        match self {
            ReleaseType::Snapshot | ReleaseType::Final => true,
            ReleaseType::TestFinal => false,
        }
    }
}

impl FromStr for ReleaseType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "snapshot" => Ok(ReleaseType::Snapshot),
            "final" => Ok(ReleaseType::Final),
            "testfinal" | "test-final" | "test_final" => Ok(ReleaseType::TestFinal),
            _ => Err(ReleaseError::precondition(format!(
                "Unknown release type '{}'. You must specify the release type: [snapshot xor final xor testfinal]",
                s
            ))),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SNAPSHOT".parse::<ReleaseType>().unwrap(), ReleaseType::Snapshot);
        assert_eq!("Final".parse::<ReleaseType>().unwrap(), ReleaseType::Final);
        assert_eq!("testFinal".parse::<ReleaseType>().unwrap(), ReleaseType::TestFinal);
        assert_eq!("test-final".parse::<ReleaseType>().unwrap(), ReleaseType::TestFinal);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = "nightly".parse::<ReleaseType>().unwrap_err();
        assert!(err.to_string().contains("snapshot xor final xor testfinal"));
    }

    #[test]
    fn test_display_round_trips() {
        for release_type in ReleaseType::ALL {
            let parsed: ReleaseType = release_type.to_string().parse().unwrap();
            assert_eq!(parsed, release_type);
        }
    }

    #[test]
    fn test_integration_branches() {
        let names = BranchNames::default();

        assert!(ReleaseType::Snapshot.integration_branches(&names).is_none());

        let final_branches = ReleaseType::Final.integration_branches(&names).unwrap();
        assert_eq!(final_branches.develop, "develop");
        assert_eq!(final_branches.master, "master");
        assert!(!final_branches.ephemeral);

        let test_branches = ReleaseType::TestFinal.integration_branches(&names).unwrap();
        assert_eq!(test_branches.develop, "testdevelop");
        assert_eq!(test_branches.master, "testmaster");
        assert!(test_branches.ephemeral);
    }

    #[test]
    fn test_test_final_is_never_published() {
        assert!(ReleaseType::Snapshot.is_publishable());
        assert!(ReleaseType::Final.is_publishable());
        assert!(!ReleaseType::TestFinal.is_publishable());
    }
}
