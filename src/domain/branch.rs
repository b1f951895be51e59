use serde::{Deserialize, Serialize};

/// Names of the branches a release moves between.
///
/// The test pair is ephemeral: both branches are deleted and recreated on
/// every test-final run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BranchNames {
    #[serde(default = "default_develop")]
    pub develop: String,

    #[serde(default = "default_master")]
    pub master: String,

    #[serde(default = "default_test_develop")]
    pub test_develop: String,

    #[serde(default = "default_test_master")]
    pub test_master: String,
}

fn default_develop() -> String {
    "develop".to_string()
}

fn default_master() -> String {
    "master".to_string()
}

fn default_test_develop() -> String {
    "testdevelop".to_string()
}

fn default_test_master() -> String {
    "testmaster".to_string()
}

impl Default for BranchNames {
    fn default() -> Self {
        BranchNames {
            develop: default_develop(),
            master: default_master(),
            test_develop: default_test_develop(),
            test_master: default_test_master(),
        }
    }
}

/// The working branch and the release branch it is merged into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationBranches<'a> {
    pub develop: &'a str,
    pub master: &'a str,
    /// Whether both branches are thrown away and recreated each run
    pub ephemeral: bool,
}
