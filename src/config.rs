use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::CommandSpec;
use crate::domain::{BranchNames, TagPattern};
use crate::error::{ReleaseError, Result};

/// File name looked up in the project root
pub const PROJECT_CONFIG_FILE: &str = "release.toml";

/// File name looked up in the user configuration directory
pub const USER_CONFIG_FILE: &str = "release-flow.toml";

/// Represents the complete configuration for release-flow.
///
/// Contains the files a release touches, the branch layout, the external
/// commands for each stage and the remote to push to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub branches: BranchNames,

    #[serde(default)]
    pub commands: CommandsConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_format() -> String {
    TagPattern::DEFAULT.to_string()
}

/// Paths of the files a release reads or rewrites, relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    #[serde(default = "default_changelog")]
    pub changelog: PathBuf,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

fn default_version_file() -> PathBuf {
    PathBuf::from("src/version.txt")
}

fn default_changelog() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            manifest: default_manifest(),
            version_file: default_version_file(),
            changelog: default_changelog(),
        }
    }
}

/// External commands run for each stage, in order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommandsConfig {
    #[serde(default = "default_build_commands")]
    pub build: Vec<CommandSpec>,

    #[serde(default = "default_test_commands")]
    pub test: Vec<CommandSpec>,

    #[serde(default = "default_package_commands")]
    pub package: Vec<CommandSpec>,

    #[serde(default = "default_publish_commands")]
    pub publish: Vec<CommandSpec>,
}

fn default_build_commands() -> Vec<CommandSpec> {
    let mut build_env = BTreeMap::new();
    build_env.insert("UPDATE_BUILD_INFO".to_string(), "1".to_string());

    vec![
        CommandSpec::new("cargo", ["clean"]),
        CommandSpec::new("cargo", ["build", "--release"]).with_env(build_env),
    ]
}

fn default_test_commands() -> Vec<CommandSpec> {
    vec![CommandSpec::new("cargo", ["test", "--release"])]
}

fn default_package_commands() -> Vec<CommandSpec> {
    vec![CommandSpec::new("cargo", ["package"])]
}

fn default_publish_commands() -> Vec<CommandSpec> {
    vec![CommandSpec::new("cargo", ["publish"])]
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig {
            build: default_build_commands(),
            test: default_test_commands(),
            package: default_package_commands(),
            publish: default_publish_commands(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            tag_format: default_tag_format(),
            files: FilesConfig::default(),
            branches: BranchNames::default(),
            commands: CommandsConfig::default(),
        }
    }
}

impl Config {
    /// The configured tag format, validated
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.tag_format.clone())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, project_root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in the project root
/// 3. `release-flow.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, project_root: &Path) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(project_root),
    };

    let Some(path) = path else {
        log::debug!("No configuration file found, using defaults");
        return Ok(Config::default());
    };

    log::debug!("Loading configuration from {}", path.display());
    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse {}: {}", path.display(), e)))?;

    config.tag_pattern()?;
    Ok(config)
}

fn discover_config(project_root: &Path) -> Option<PathBuf> {
    let project_config = project_root.join(PROJECT_CONFIG_FILE);
    if project_config.exists() {
        return Some(project_config);
    }

    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .filter(|path| path.exists())
}
