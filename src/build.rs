//! Runs the external build, test, package and publish commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Command;

use crate::config::CommandsConfig;
use crate::error::{ReleaseError, Result};

/// Pipeline stage backed by external commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Test,
    Package,
    Publish,
}

impl Stage {
    fn banner(&self) -> &'static str {
        match self {
            Stage::Build => "RUNNING THE BUILD",
            Stage::Test => "RUNNING TESTS",
            Stage::Package => "PACKAGING FOR THE REGISTRY",
            Stage::Publish => "PUBLISHING TO THE REGISTRY",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Build => "Build",
            Stage::Test => "Tests",
            Stage::Package => "Packaging",
            Stage::Publish => "Publishing",
        };
        f.write_str(name)
    }
}

/// One external command: program, argument vector and extra environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandSpec {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs every command of a stage in order, stopping at the first failure.
///
/// Commands run in `project_root` with stdout and stderr inherited, so their
/// output goes straight to the console. A non-zero exit status or a failure
/// to launch the program becomes a [`ReleaseError::Stage`] for `stage`.
pub fn run_stage(stage: Stage, commands: &[CommandSpec], project_root: &Path) -> Result<()> {
    println!("********** {} **********", stage.banner());

    for spec in commands {
        log::debug!("{}: running `{}` in {}", stage, spec, project_root.display());

        let status = Command::new(&spec.program)
            .args(&spec.args)
            .envs(&spec.env)
            .current_dir(project_root)
            .status()
            .map_err(|e| {
                ReleaseError::stage(stage, format!("Could not launch `{}`: {}", spec, e))
            })?;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "a signal".to_string(), |c| format!("status {}", c));
            return Err(ReleaseError::stage(
                stage,
                format!(
                    "`{}` exited with {}. See the output above for more information.",
                    spec, code
                ),
            ));
        }
    }

    log::info!("{} stage completed", stage);
    Ok(())
}

/// Runs the build, then the tests. Tests never run after a failed build.
pub fn build_and_test(commands: &CommandsConfig, project_root: &Path) -> Result<()> {
    run_stage(Stage::Build, &commands.build, project_root)?;
    run_stage(Stage::Test, &commands.test, project_root)
}

pub fn package(commands: &CommandsConfig, project_root: &Path) -> Result<()> {
    run_stage(Stage::Package, &commands.package, project_root)
}

pub fn publish(commands: &CommandsConfig, project_root: &Path) -> Result<()> {
    run_stage(Stage::Publish, &commands.publish, project_root)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    #[test]
    fn test_successful_stage() {
        let dir = TempDir::new().unwrap();
        let result = run_stage(Stage::Build, &[sh("exit 0")], dir.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_commands_run_in_project_root() {
        let dir = TempDir::new().unwrap();
        run_stage(Stage::Build, &[sh("touch built.marker")], dir.path()).unwrap();
        assert!(dir.path().join("built.marker").exists());
    }

    #[test]
    fn test_env_is_passed_to_command() {
        let dir = TempDir::new().unwrap();
        let mut env = BTreeMap::new();
        env.insert("UPDATE_BUILD_INFO".to_string(), "1".to_string());
        let spec = sh("test \"$UPDATE_BUILD_INFO\" = 1").with_env(env);

        assert!(run_stage(Stage::Build, &[spec], dir.path()).is_ok());
    }

    #[test]
    fn test_non_zero_exit_is_stage_failure() {
        let dir = TempDir::new().unwrap();
        let err = run_stage(Stage::Test, &[sh("exit 3")], dir.path()).unwrap_err();

        match err {
            ReleaseError::Stage { stage, message } => {
                assert_eq!(stage, Stage::Test);
                assert!(message.contains("exit 3"));
                assert!(message.contains("status 3"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_program_is_stage_failure() {
        let dir = TempDir::new().unwrap();
        let spec = CommandSpec::new("release-flow-no-such-program", Vec::<String>::new());
        let err = run_stage(Stage::Package, &[spec], dir.path()).unwrap_err();

        assert!(err.to_string().starts_with("Packaging failed"));
        assert!(err.to_string().contains("Could not launch"));
    }

    #[test]
    fn test_stage_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let commands = [sh("exit 1"), sh("touch second.marker")];

        assert!(run_stage(Stage::Build, &commands, dir.path()).is_err());
        assert!(!dir.path().join("second.marker").exists());
    }

    #[test]
    fn test_failed_build_skips_tests() {
        let dir = TempDir::new().unwrap();
        let commands = CommandsConfig {
            build: vec![sh("exit 1")],
            test: vec![sh("touch tested.marker")],
            ..CommandsConfig::default()
        };

        let err = build_and_test(&commands, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Stage {
                stage: Stage::Build,
                ..
            }
        ));
        assert!(!dir.path().join("tested.marker").exists());
    }
}
