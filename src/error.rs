use std::path::PathBuf;

use thiserror::Error;

use crate::build::Stage;

/// Unified error type for release-flow operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Manifest error in {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("{0}")]
    Precondition(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Merging '{branch}' into '{into}' produced conflicts; resolve them manually")]
    MergeConflict { branch: String, into: String },

    #[error("{stage} failed: {message}")]
    Stage { stage: Stage, message: String },

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Release aborted: {0}")]
    Aborted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-flow
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a manifest error tied to the file it concerns
    pub fn manifest(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        ReleaseError::Manifest {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        ReleaseError::Precondition(msg.into())
    }

    pub fn branch(msg: impl Into<String>) -> Self {
        ReleaseError::Branch(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        ReleaseError::Aborted(msg.into())
    }

    /// Create a failure for one of the external command stages
    pub fn stage(stage: Stage, msg: impl Into<String>) -> Self {
        ReleaseError::Stage {
            stage,
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("bad tag_format");
        assert_eq!(err.to_string(), "Configuration error: bad tag_format");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_precondition_message_is_verbatim() {
        let err = ReleaseError::precondition("There are uncommitted changes on the develop branch.");
        assert_eq!(
            err.to_string(),
            "There are uncommitted changes on the develop branch."
        );
    }

    #[test]
    fn test_manifest_error_names_path() {
        let err = ReleaseError::manifest("/tmp/Cargo.toml", "missing package.version");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/Cargo.toml"));
        assert!(msg.contains("missing package.version"));
    }

    #[test]
    fn test_stage_error_names_stage() {
        let build = ReleaseError::stage(Stage::Build, "`cargo build` exited with status 1");
        let test = ReleaseError::stage(Stage::Test, "`cargo test` exited with status 101");

        assert!(build.to_string().starts_with("Build failed"));
        assert!(test.to_string().starts_with("Tests failed"));
        assert!(matches!(
            build,
            ReleaseError::Stage {
                stage: Stage::Build,
                ..
            }
        ));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaseError::config("x"), "Configuration error"),
            (ReleaseError::version("x"), "Version error"),
            (ReleaseError::branch("x"), "Branch error"),
            (ReleaseError::remote("x"), "Remote operation failed"),
            (ReleaseError::aborted("x"), "Release aborted"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_merge_conflict_message() {
        let err = ReleaseError::MergeConflict {
            branch: "develop".to_string(),
            into: "master".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'develop' into 'master'"));
    }
}
