use semver::Version;

use crate::error::{ReleaseError, Result};

/// Tag naming pattern (e.g., "{name}-{version}", "v{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    pub const DEFAULT: &'static str = "{name}-{version}";

    /// Create a tag pattern, rejecting patterns without a `{version}` placeholder
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains("{version}") {
            return Err(ReleaseError::config(format!(
                "tag_format '{}' must contain a {{version}} placeholder",
                pattern
            )));
        }
        Ok(TagPattern { pattern })
    }

    /// Format the tag for a package release.
    /// Example: pattern="{name}-{version}", name="foo", version="1.2.3" -> "foo-1.2.3"
    pub fn format(&self, package_name: &str, version: &Version) -> String {
        self.pattern
            .replace("{name}", package_name)
            .replace("{version}", &version.to_string())
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            pattern: Self::DEFAULT.to_string(),
        }
    }
}
