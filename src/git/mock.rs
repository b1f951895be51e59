use crate::error::{ReleaseError, Result};
use crate::git::{ForcedRefs, Repository};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

/// A mutating call recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Checkout(String),
    Recreate(String),
    Merge { branch: String, into: String },
    Commit(String),
    Tag { name: String, message: String },
    Push(String),
}

#[derive(Debug)]
struct MockState {
    current: String,
    branches: BTreeSet<String>,
    tags: BTreeSet<String>,
    dirty: bool,
    short_hash: String,
    conflicting: BTreeSet<String>,
    calls: Vec<GitCall>,
}

/// Mock repository for testing the workflow without a real git repository
///
/// Tracks the checked-out branch and the set of branches and tags, and
/// records every mutating call in order.
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a mock on `develop` with `develop` and `master` branches
    pub fn new() -> Self {
        let branches = ["develop", "master"].iter().map(|b| b.to_string()).collect();
        MockRepository {
            state: Mutex::new(MockState {
                current: "develop".to_string(),
                branches,
                tags: BTreeSet::new(),
                dirty: false,
                short_hash: "a1b2c3d".to_string(),
                conflicting: BTreeSet::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check out `branch`, creating it if needed
    pub fn on_branch(self, branch: &str) -> Self {
        {
            let mut state = self.state();
            state.branches.insert(branch.to_string());
            state.current = branch.to_string();
        }
        self
    }

    pub fn with_dirty_tree(self) -> Self {
        self.state().dirty = true;
        self
    }

    pub fn with_short_hash(self, hash: &str) -> Self {
        self.state().short_hash = hash.to_string();
        self
    }

    /// Make merging `branch` fail with a conflict
    pub fn with_conflict_on(self, branch: &str) -> Self {
        self.state().conflicting.insert(branch.to_string());
        self
    }

    /// All mutating calls so far, oldest first
    pub fn calls(&self) -> Vec<GitCall> {
        self.state().calls.clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.state().tags.iter().cloned().collect()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.state().current.clone())
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.state().dirty)
    }

    fn short_head_hash(&self) -> Result<String> {
        Ok(self.state().short_hash.clone())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().branches.contains(name))
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if !state.branches.contains(name) {
            return Err(ReleaseError::branch(format!("Cannot find branch '{}'", name)));
        }
        state.current = name.to_string();
        state.calls.push(GitCall::Checkout(name.to_string()));
        Ok(())
    }

    fn recreate_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        state.branches.insert(name.to_string());
        state.current = name.to_string();
        state.calls.push(GitCall::Recreate(name.to_string()));
        Ok(())
    }

    fn merge_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if !state.branches.contains(name) {
            return Err(ReleaseError::branch(format!("Cannot find branch '{}'", name)));
        }
        let into = state.current.clone();
        if state.conflicting.contains(name) {
            return Err(ReleaseError::MergeConflict {
                branch: name.to_string(),
                into,
            });
        }
        state.calls.push(GitCall::Merge {
            branch: name.to_string(),
            into,
        });
        Ok(())
    }

    fn commit_tracked(&self, message: &str) -> Result<String> {
        let mut state = self.state();
        state.dirty = false;
        state.calls.push(GitCall::Commit(message.to_string()));
        Ok(format!("{:0>40}", state.calls.len()))
    }

    fn create_tag(&self, name: &str, message: &str, replace: bool) -> Result<()> {
        let mut state = self.state();
        if !state.tags.insert(name.to_string()) && !replace {
            return Err(ReleaseError::branch(format!("Tag '{}' already exists", name)));
        }
        state.calls.push(GitCall::Tag {
            name: name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_all(&self, remote: &str, _forced: &ForcedRefs) -> Result<()> {
        self.state().calls.push(GitCall::Push(remote.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_starts_on_develop() {
        let repo = MockRepository::new();
        assert_eq!(repo.current_branch().unwrap(), "develop");
        assert!(!repo.is_dirty().unwrap());
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_mock_records_calls_in_order() {
        let repo = MockRepository::new();
        repo.checkout_branch("master").unwrap();
        repo.merge_branch("develop").unwrap();
        repo.push_all("origin", &ForcedRefs::default()).unwrap();

        assert_eq!(
            repo.calls(),
            vec![
                GitCall::Checkout("master".to_string()),
                GitCall::Merge {
                    branch: "develop".to_string(),
                    into: "master".to_string()
                },
                GitCall::Push("origin".to_string()),
            ]
        );
    }

    #[test]
    fn test_mock_conflict() {
        let repo = MockRepository::new().with_conflict_on("develop");
        repo.checkout_branch("master").unwrap();
        assert!(matches!(
            repo.merge_branch("develop"),
            Err(ReleaseError::MergeConflict { .. })
        ));
    }

    #[test]
    fn test_mock_duplicate_tag() {
        let repo = MockRepository::new();
        repo.create_tag("pkg-1.0.0", "pkg-1.0.0", false).unwrap();
        assert!(repo.create_tag("pkg-1.0.0", "again", false).is_err());
        assert!(repo.create_tag("pkg-1.0.0", "again", true).is_ok());
        assert_eq!(repo.tags(), vec!["pkg-1.0.0".to_string()]);
    }

    #[test]
    fn test_mock_commit_cleans_tree() {
        let repo = MockRepository::new().with_dirty_tree();
        assert!(repo.is_dirty().unwrap());
        repo.commit_tracked("msg").unwrap();
        assert!(!repo.is_dirty().unwrap());
    }
}
