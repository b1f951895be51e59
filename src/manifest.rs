//! Reading and rewriting the package manifest.
//!
//! Edits go through `toml_edit`, so everything except the version string is
//! written back byte for byte.

use std::fs;
use std::path::Path;

use semver::Version;
use toml_edit::{DocumentMut, Value};

use crate::error::{ReleaseError, Result};

/// Name and version read from `[package]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: Version,
}

fn read_document(path: &Path) -> Result<DocumentMut> {
    let content = fs::read_to_string(path)
        .map_err(|e| ReleaseError::manifest(path, format!("cannot read file: {}", e)))?;

    content
        .parse::<DocumentMut>()
        .map_err(|e| ReleaseError::manifest(path, format!("invalid TOML: {}", e)))
}

fn package_str<'a>(doc: &'a DocumentMut, path: &Path, field: &str) -> Result<&'a str> {
    doc.get("package")
        .and_then(|package| package.as_table_like())
        .ok_or_else(|| ReleaseError::manifest(path, "missing [package] table"))?
        .get(field)
        .ok_or_else(|| ReleaseError::manifest(path, format!("missing package.{}", field)))?
        .as_str()
        .ok_or_else(|| ReleaseError::manifest(path, format!("package.{} is not a string", field)))
}

/// Reads `package.name` and `package.version`.
///
/// # Errors
/// Fails when the file is absent or malformed, either field is missing, or
/// the version is not valid semver.
pub fn read_package(path: &Path) -> Result<PackageInfo> {
    let doc = read_document(path)?;

    let name = package_str(&doc, path, "name")?.to_string();
    let raw_version = package_str(&doc, path, "version")?;
    let version = Version::parse(raw_version).map_err(|e| {
        ReleaseError::manifest(
            path,
            format!("package.version '{}' is not a semantic version: {}", raw_version, e),
        )
    })?;

    Ok(PackageInfo { name, version })
}

/// Returns the manifest text with `package.version` replaced, without writing it.
pub fn render_version(path: &Path, version: &Version) -> Result<String> {
    let mut doc = read_document(path)?;

    let current = doc
        .get_mut("package")
        .and_then(|package| package.as_table_like_mut())
        .ok_or_else(|| ReleaseError::manifest(path, "missing [package] table"))?
        .get_mut("version")
        .and_then(|item| item.as_value_mut())
        .ok_or_else(|| ReleaseError::manifest(path, "missing package.version"))?;

    if current.as_str().is_none() {
        return Err(ReleaseError::manifest(
            path,
            "package.version is not a string (inherited workspace versions cannot be rewritten)",
        ));
    }

    // Keep the whitespace and trailing comment around the old value.
    let decor = current.decor().clone();
    let mut replacement = Value::from(version.to_string());
    *replacement.decor_mut() = decor;
    *current = replacement;

    Ok(doc.to_string())
}

/// Rewrites `package.version` in place, leaving the rest of the file untouched.
pub fn write_version(path: &Path, version: &Version) -> Result<()> {
    let rendered = render_version(path, version)?;
    fs::write(path, rendered)
        .map_err(|e| ReleaseError::manifest(path, format!("cannot write file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"# Hand-maintained manifest
[package]
name = "elb-logs"   # crate name
version = "1.2.3" # bumped by release-flow
authors = ["Someone <someone@example.com>"]

[dependencies]
serde = { version = "1.0", features = ["derive"] }

[dev-dependencies]
# keep this comment
tempfile = "3"
"#;

    fn manifest_in(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_package() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, MANIFEST);

        let info = read_package(&path).unwrap();
        assert_eq!(info.name, "elb-logs");
        assert_eq!(info.version, Version::parse("1.2.3").unwrap());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, MANIFEST);
        let new_version = Version::parse("1.2.4-SNAPSHOT").unwrap();

        write_version(&path, &new_version).unwrap();

        assert_eq!(read_package(&path).unwrap().version, new_version);
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            MANIFEST.replace(
                r#"version = "1.2.3" # bumped"#,
                r#"version = "1.2.4-SNAPSHOT" # bumped"#
            )
        );
    }

    #[test]
    fn test_dependency_versions_untouched() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, MANIFEST);

        write_version(&path, &Version::parse("9.9.9").unwrap()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains(r#"serde = { version = "1.0", features = ["derive"] }"#));
    }

    #[test]
    fn test_render_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, MANIFEST);

        let rendered = render_version(&path, &Version::parse("2.0.0").unwrap()).unwrap();

        assert!(rendered.contains(r#"version = "2.0.0""#));
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_package(&dir.path().join("Cargo.toml")).unwrap_err();
        assert!(matches!(err, ReleaseError::Manifest { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, "[package\nname = ");
        assert!(read_package(&path).unwrap_err().to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_missing_version() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, "[package]\nname = \"x\"\n");
        let err = read_package(&path).unwrap_err();
        assert!(err.to_string().contains("missing package.version"));
    }

    #[test]
    fn test_non_semver_version() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(&dir, "[package]\nname = \"x\"\nversion = \"1.2\"\n");
        let err = read_package(&path).unwrap_err();
        assert!(err.to_string().contains("not a semantic version"));
    }

    #[test]
    fn test_workspace_inherited_version_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = manifest_in(
            &dir,
            "[package]\nname = \"x\"\nversion = { workspace = true }\n",
        );
        let err = write_version(&path, &Version::parse("1.0.0").unwrap()).unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }
}
