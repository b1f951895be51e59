//! The configuration value threaded through a release.
//!
//! [ReleaseContext] owns the repository handle and wraps every mutating git
//! and file operation, turning it into a logged no-op in dry-run mode.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::config::{CommandsConfig, Config};
use crate::domain::{version, BranchNames, ReleaseType, TagPattern};
use crate::error::Result;
use crate::git::{ForcedRefs, Repository};
use crate::manifest::{self, PackageInfo};
use crate::ui;

/// Per-invocation switches, usually taken from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    pub project_root: PathBuf,
    pub release_type: ReleaseType,
    /// Skip the branch and clean-tree checks. Only for exercising the tool itself.
    pub disable_checks: bool,
    /// Compute and print everything, change nothing
    pub dry_run: bool,
    pub run_build: bool,
    /// Skip the "are you sure" prompt
    pub assume_yes: bool,
    /// Use this version instead of prompting for one
    pub version_override: Option<String>,
}

impl ReleaseOptions {
    pub fn new(project_root: impl Into<PathBuf>, release_type: ReleaseType) -> Self {
        ReleaseOptions {
            project_root: project_root.into(),
            release_type,
            disable_checks: false,
            dry_run: false,
            run_build: true,
            assume_yes: false,
            version_override: None,
        }
    }
}

pub struct ReleaseContext<R: Repository> {
    pub project_root: PathBuf,
    pub release_type: ReleaseType,
    pub manifest_file: PathBuf,
    pub version_file: PathBuf,
    pub changelog_file: PathBuf,
    pub disable_checks: bool,
    pub dry_run: bool,
    pub run_build: bool,
    pub assume_yes: bool,
    pub version_override: Option<String>,
    pub remote: String,
    pub branches: BranchNames,
    pub commands: CommandsConfig,
    pub tag_pattern: TagPattern,
    repo: R,
}

impl<R: Repository> ReleaseContext<R> {
    pub fn new(options: ReleaseOptions, config: &Config, repo: R) -> Result<Self> {
        let root = options.project_root;
        let tag_pattern = config.tag_pattern()?;

        Ok(ReleaseContext {
            manifest_file: config.resolve(&root, &config.files.manifest),
            version_file: config.resolve(&root, &config.files.version_file),
            changelog_file: config.resolve(&root, &config.files.changelog),
            project_root: root,
            release_type: options.release_type,
            disable_checks: options.disable_checks,
            dry_run: options.dry_run,
            run_build: options.run_build,
            assume_yes: options.assume_yes,
            version_override: options.version_override,
            remote: config.remote.clone(),
            branches: config.branches.clone(),
            commands: config.commands.clone(),
            tag_pattern,
            repo,
        })
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn active_branch(&self) -> Result<String> {
        self.repo.current_branch()
    }

    pub fn is_dirty(&self) -> Result<bool> {
        self.repo.is_dirty()
    }

    /// Labels `version` with the hash of the commit being released
    pub fn to_snapshot_release(&self, version: &Version) -> Result<Version> {
        let hash = self.repo.short_head_hash()?;
        version::to_snapshot_release(version, &hash)
    }

    pub fn read_manifest(&self) -> Result<PackageInfo> {
        manifest::read_package(&self.manifest_file)
    }

    /// Writes `version` into the manifest; in dry-run only renders it.
    pub fn update_version_in_files(&self, version: &Version) -> Result<()> {
        let manifest = self.manifest_file.display();

        if self.dry_run {
            manifest::render_version(&self.manifest_file, version)?;
            ui::display_dry_run(&format!("would update {} to version {}", manifest, version));
            return Ok(());
        }

        manifest::write_version(&self.manifest_file, version)?;
        ui::display_status(&format!("Updated {} with version {}.", manifest, version));
        Ok(())
    }

    fn skip(&self, action: String) -> bool {
        if self.dry_run {
            log::info!("dry run: skipping {}", action);
            ui::display_dry_run(&format!("would {}", action));
        }
        self.dry_run
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        if self.skip(format!("check out {}", branch)) {
            return Ok(());
        }
        self.repo.checkout_branch(branch)
    }

    /// Throw away `branch` and recreate it at HEAD
    pub fn reset_test_branch(&self, branch: &str) -> Result<()> {
        if self.skip(format!("recreate branch {} from HEAD", branch)) {
            return Ok(());
        }
        self.repo.recreate_branch(branch)
    }

    pub fn merge(&self, branch: &str) -> Result<()> {
        if self.skip(format!("merge {} into the current branch", branch)) {
            return Ok(());
        }
        self.repo.merge_branch(branch)
    }

    /// Commits all tracked changes; `None` in dry-run
    pub fn commit_release(&self, message: &str) -> Result<Option<String>> {
        if self.skip(format!("commit \"{}\"", message)) {
            return Ok(None);
        }
        self.repo.commit_tracked(message).map(Some)
    }

    /// Tags HEAD. A test-final tag left by an earlier rehearsal is replaced.
    pub fn tag_release(&self, tag: &str, message: &str) -> Result<bool> {
        if self.skip(format!("create tag {}", tag)) {
            return Ok(false);
        }
        let replace = self.release_type == ReleaseType::TestFinal;
        self.repo.create_tag(tag, message, replace)?;
        Ok(true)
    }

    /// Refs every rehearsal rebuilds: the test branches and test-final tags.
    pub fn forced_refs(&self) -> ForcedRefs {
        ForcedRefs {
            branches: vec![
                self.branches.test_develop.clone(),
                self.branches.test_master.clone(),
            ],
            tag_label: Some(version::TEST_FINAL_RELEASE.to_string()),
        }
    }

    /// Pushes all branches and tags; returns whether anything was pushed
    pub fn push_to_origin(&self) -> Result<bool> {
        if self.skip(format!("push all branches and tags to {}", self.remote)) {
            return Ok(false);
        }
        ui::display_status(&format!("Pushing release to {}.", self.remote));
        self.repo.push_all(&self.remote, &self.forced_refs())?;
        Ok(true)
    }
}
