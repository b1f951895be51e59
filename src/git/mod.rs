//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations a
//! release needs, allowing the workflow to run against a real repository or
//! against an in-memory mock in tests.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: the real implementation using the `git2` crate
//! - [mock::MockRepository]: records calls and simulates branches for tests
//!
//! Workflow code depends on the [Repository] trait only. Dry-run handling
//! lives one level up, in [crate::context::ReleaseContext]; implementations
//! of this trait always perform the operation they are asked for.

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockRepository};
pub use repository::Git2Repository;

use crate::error::Result;

/// Git operations used by the release workflow
///
/// All methods return [crate::error::Result<T>]; implementations map
/// `git2::Error` and friends onto [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Name of the checked-out branch
    ///
    /// # Returns
    /// * `Ok(String)` - Short branch name (e.g., "develop")
    /// * `Err` - If HEAD is detached or unborn
    fn current_branch(&self) -> Result<String>;

    /// Whether tracked files have uncommitted changes
    ///
    /// Untracked and ignored files do not make the tree dirty.
    fn is_dirty(&self) -> Result<bool>;

    /// Abbreviated hash of the HEAD commit (usually 7 characters)
    fn short_head_hash(&self) -> Result<String>;

    /// Whether a local branch with this name exists
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Check out an existing local branch
    ///
    /// # Returns
    /// * `Ok(())` - HEAD now points at `refs/heads/{name}`
    /// * `Err` - If the branch doesn't exist or the checkout would overwrite changes
    fn checkout_branch(&self, name: &str) -> Result<()>;

    /// Force-delete `name` if present, create it at HEAD and check it out
    ///
    /// Any commits only reachable from the old branch are lost. Used for the
    /// ephemeral test branches.
    fn recreate_branch(&self, name: &str) -> Result<()>;

    /// Merge a local branch into the checked-out branch
    ///
    /// # Returns
    /// * `Ok(())` - Merged, fast-forwarded, or already up to date
    /// * `Err(ReleaseError::MergeConflict)` - Conflicts are left in the
    ///   working tree for manual resolution
    fn merge_branch(&self, name: &str) -> Result<()>;

    /// Stage every modified tracked file and commit
    ///
    /// # Returns
    /// * `Ok(String)` - Full hash of the new commit
    fn commit_tracked(&self, message: &str) -> Result<String>;

    /// Create an annotated tag on HEAD
    ///
    /// With `replace`, an existing tag of the same name is moved to HEAD.
    ///
    /// # Returns
    /// * `Err` - If the tag already exists and `replace` is false
    fn create_tag(&self, name: &str, message: &str, replace: bool) -> Result<()>;

    /// Push every local branch and every tag to `remote` in one push
    ///
    /// Refs matched by `forced` overwrite the remote copy; every other ref
    /// must fast-forward.
    fn push_all(&self, remote: &str, forced: &ForcedRefs) -> Result<()>;
}

/// Refs a push may overwrite instead of fast-forwarding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedRefs {
    /// Short names of branches that are recreated on every run
    pub branches: Vec<String>,
    /// Tags whose name contains this label are replaced on every run
    pub tag_label: Option<String>,
}

impl ForcedRefs {
    /// Whether the full ref name `refname` is force-pushed
    pub fn forces(&self, refname: &str) -> bool {
        if let Some(branch) = refname.strip_prefix("refs/heads/") {
            return self.branches.iter().any(|b| b == branch);
        }
        if let Some(tag) = refname.strip_prefix("refs/tags/") {
            return self
                .tag_label
                .as_deref()
                .is_some_and(|label| tag.contains(label));
        }
        false
    }
}
