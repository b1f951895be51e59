//! Domain logic - pure release rules independent of git and the filesystem

pub mod branch;
pub mod release_type;
pub mod tag;
pub mod version;

pub use branch::{BranchNames, IntegrationBranches};
pub use release_type::ReleaseType;
pub use tag::TagPattern;
pub use version::{VersionRejection, SNAPSHOT, TEST_FINAL_RELEASE};
