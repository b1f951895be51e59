use crate::error::{ReleaseError, Result};
use crate::git::ForcedRefs;
use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, ObjectType, Repository as Git2Repo};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    root: PathBuf,
}

impl Git2Repository {
    /// Open the repository containing `path`, searching parent directories
    ///
    /// # Returns
    /// * `Err` - If `path` is not inside a git repository or the repository is bare
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            ReleaseError::precondition(format!(
                "Not in a git repository ({}): {}",
                path.display(),
                e
            ))
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| {
                ReleaseError::precondition(format!(
                    "Repository at {} has no working tree",
                    path.display()
                ))
            })?
            .to_path_buf();

        Ok(Git2Repository { repo, root })
    }

    /// Working tree root of the repository
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn branch_ref(name: &str) -> String {
        format!("refs/heads/{}", name)
    }

    fn find_branch_ref(&self, name: &str) -> Result<git2::Reference<'_>> {
        self.repo
            .find_reference(&Self::branch_ref(name))
            .map_err(|e| ReleaseError::branch(format!("Cannot find branch '{}': {}", name, e)))
    }

    fn push_refspecs(&self, forced: &ForcedRefs) -> Result<Vec<String>> {
        let mut refnames = Vec::new();

        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(refname) = branch.get().name() {
                refnames.push(refname.to_string());
            }
        }

        let tags = self.repo.tag_names(None)?;
        for tag in tags.iter().flatten() {
            refnames.push(format!("refs/tags/{}", tag));
        }

        Ok(refnames
            .into_iter()
            .map(|refname| {
                let force = if forced.forces(&refname) { "+" } else { "" };
                format!("{0}{1}:{1}", force, refname)
            })
            .collect())
    }
}

fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();

    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

            // Try key files in order of preference
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        git2::Cred::default()
    });

    // A rejected ref is reported here rather than as a push error
    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if !head.is_branch() {
            return Err(ReleaseError::branch("HEAD is detached"));
        }

        head.shorthand()
            .map(String::from)
            .ok_or_else(|| ReleaseError::branch("HEAD has no readable branch name"))
    }

    fn is_dirty(&self) -> Result<bool> {
        let statuses = self.repo.statuses(Some(
            git2::StatusOptions::new()
                .include_untracked(false)
                .include_ignored(false),
        ))?;

        Ok(!statuses.is_empty())
    }

    fn short_head_hash(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        let short = commit.as_object().short_id()?;

        short
            .as_str()
            .map(String::from)
            .ok_or_else(|| ReleaseError::branch("HEAD commit id is not valid UTF-8"))
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        let target = self.find_branch_ref(name)?.peel(ObjectType::Commit)?;

        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&Self::branch_ref(name))?;

        log::debug!("Checked out {}", name);
        Ok(())
    }

    fn recreate_branch(&self, name: &str) -> Result<()> {
        let head_commit = self.repo.head()?.peel_to_commit()?;

        match self.repo.find_branch(name, BranchType::Local) {
            Ok(mut existing) => {
                // A checked-out branch cannot be deleted
                if existing.is_head() {
                    self.repo.set_head_detached(head_commit.id())?;
                }
                existing.delete()?;
                log::debug!("Deleted existing branch {}", name);
            }
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.repo.branch(name, &head_commit, false)?;
        self.repo.set_head(&Self::branch_ref(name))?;

        log::debug!("Recreated {} at {}", name, head_commit.id());
        Ok(())
    }

    fn merge_branch(&self, name: &str) -> Result<()> {
        let into = self.current_branch()?;
        let reference = self.find_branch_ref(name)?;
        let theirs = self.repo.reference_to_annotated_commit(&reference)?;
        let (analysis, _) = self.repo.merge_analysis(&[&theirs])?;

        if analysis.is_up_to_date() {
            log::debug!("{} is already up to date with {}", into, name);
            return Ok(());
        }

        let their_commit = self.repo.find_commit(theirs.id())?;

        if analysis.is_fast_forward() {
            self.repo.checkout_tree(
                their_commit.as_object(),
                Some(CheckoutBuilder::new().safe()),
            )?;
            let mut head = self.repo.head()?;
            head.set_target(theirs.id(), &format!("merge {}: Fast-forward", name))?;

            log::debug!("Fast-forwarded {} to {}", into, name);
            return Ok(());
        }

        let ours = self.repo.head()?.peel_to_commit()?;
        self.repo
            .merge(&[&theirs], None, Some(CheckoutBuilder::new().safe()))?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            // MERGE_HEAD stays in place so the operator can finish with plain git
            return Err(ReleaseError::MergeConflict {
                branch: name.to_string(),
                into,
            });
        }

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.repo.signature()?;
        let message = format!("Merge branch '{}' into {}", name, into);

        self.repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &message,
            &tree,
            &[&ours, &their_commit],
        )?;
        self.repo.cleanup_state()?;

        log::debug!("Merged {} into {}", name, into);
        Ok(())
    }

    fn commit_tracked(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;

        log::debug!("Committed {}: {}", oid, message);
        Ok(oid.to_string())
    }

    fn create_tag(&self, name: &str, message: &str, replace: bool) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let sig = self.repo.signature()?;

        self.repo
            .tag(name, head.as_object(), &sig, message, replace)
            .map_err(|e| ReleaseError::branch(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push_all(&self, remote_name: &str, forced: &ForcedRefs) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|_| {
            ReleaseError::remote(format!("No remote named '{}' found", remote_name))
        })?;

        let refspecs = self.push_refspecs(forced)?;
        log::debug!("Pushing {} refs to {}", refspecs.len(), remote_name);

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        remote
            .push(&refspecs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    ReleaseError::remote(format!("Network error during push: {}", e))
                }
                _ => ReleaseError::remote(format!(
                    "Failed to push to '{}': {}",
                    remote_name, e
                )),
            })
    }
}
