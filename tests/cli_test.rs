// tests/cli_test.rs
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

const MANIFEST: &str = r#"[package]
name = "elb-logs"
version = "1.2.3-SNAPSHOT"
edition = "2021"
"#;

fn release_flow(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_release-flow"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute release-flow")
}

/// A repository on `develop` with the manifest committed and a `master` branch
fn fixture_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init_opts(dir.path(), RepositoryInitOptions::new().initial_head("develop"))
        .unwrap();

    fs::write(dir.path().join("Cargo.toml"), MANIFEST).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("Cargo.toml")).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();

    let commit_id = {
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap()
    };
    {
        let commit = repo.find_commit(commit_id).unwrap();
        repo.branch("master", &commit, false).unwrap();
    }

    (dir, repo)
}

#[test]
fn test_release_flow_help() {
    let output = release_flow(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("release-flow"));
    assert!(stdout.contains("bump-version"));
    assert!(stdout.contains("status"));
}

#[test]
fn test_release_flow_version() {
    let output = release_flow(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_release_type_is_usage_error() {
    let output = release_flow(&["release", "--type", "weekly"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("snapshot xor final xor testfinal"));
}

#[test]
fn test_status_in_fixture_repo() {
    let (dir, _repo) = fixture_repo();
    let root = dir.path().to_str().unwrap();

    let output = release_flow(&["-C", root, "status"]);

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("elb-logs"));
    assert!(stdout.contains("1.2.3-SNAPSHOT"));
    assert!(stdout.contains("develop"));
}

#[test]
fn test_dry_run_release_leaves_repository_untouched() {
    let (dir, repo) = fixture_repo();
    let root = dir.path().to_str().unwrap();
    let head_before = repo.head().unwrap().target().unwrap();

    let output = release_flow(&[
        "-C",
        root,
        "release",
        "--type",
        "final",
        "--dry-run",
        "--skip-build",
        "--set-version",
        "1.2.3",
    ]);

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("elb-logs-1.2.3"));

    assert_eq!(
        fs::read_to_string(dir.path().join("Cargo.toml")).unwrap(),
        MANIFEST
    );
    assert_eq!(repo.head().unwrap().target().unwrap(), head_before);
    assert_eq!(repo.head().unwrap().shorthand(), Some("develop"));
    assert!(repo.tag_names(None).unwrap().is_empty());
}

#[test]
fn test_release_from_wrong_branch_exits_with_error() {
    let (dir, repo) = fixture_repo();
    repo.set_head("refs/heads/master").unwrap();
    let root = dir.path().to_str().unwrap();

    let output = release_flow(&[
        "-C",
        root,
        "release",
        "--type",
        "final",
        "--yes",
        "--skip-build",
        "--set-version",
        "1.2.3",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERROR:"));
    assert!(stderr.contains("You must be on the develop branch"));
    assert_eq!(
        fs::read_to_string(dir.path().join("Cargo.toml")).unwrap(),
        MANIFEST
    );
}
