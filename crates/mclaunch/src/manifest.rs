//! The launcher's cached version manifest.
//!
//! `portablemc search` refreshes `portablemc_version_manifest.json` in the
//! main directory. We only read it: the `latest` aliases and the list of
//! known version ids.

use std::path::Path;

use serde::Deserialize;

use crate::ManifestError;

/// File name of the version manifest inside the launcher's main directory.
pub const MANIFEST_FILE_NAME: &str = "portablemc_version_manifest.json";

/// The subset of the version manifest the launcher cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

/// Targets of the `release` and `snapshot` aliases.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// One known version.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    /// `release`, `snapshot`, `old_beta`, ...
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl VersionManifest {
    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = std::fs::read(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Maps the `release`/`snapshot` aliases to concrete ids; anything
    /// else is returned as-is.
    pub fn resolve<'a>(&'a self, requested: &'a str) -> &'a str {
        match requested {
            "release" => &self.latest.release,
            "snapshot" => &self.latest.snapshot,
            other => other,
        }
    }

    /// Whether `id` is a known version.
    pub fn contains(&self, id: &str) -> bool {
        self.versions.iter().any(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "latest": { "release": "1.21.1", "snapshot": "24w33a" },
        "versions": [
            { "id": "24w33a", "type": "snapshot", "url": "https://example.invalid" },
            { "id": "1.21.1", "type": "release" },
            { "id": "1.20.4", "type": "release" }
        ]
    }"#;

    fn sample() -> VersionManifest {
        serde_json::from_str(SAMPLE).expect("should parse")
    }

    #[test]
    fn test_resolve_aliases() {
        let manifest = sample();
        assert_eq!(manifest.resolve("release"), "1.21.1");
        assert_eq!(manifest.resolve("snapshot"), "24w33a");
        assert_eq!(manifest.resolve("1.20.4"), "1.20.4");
    }

    #[test]
    fn test_contains() {
        let manifest = sample();
        assert!(manifest.contains("1.20.4"));
        assert!(!manifest.contains("1.99"));
        assert!(!manifest.contains("release"));
    }

    #[test]
    fn test_entry_kind_is_parsed() {
        let manifest = sample();
        assert_eq!(manifest.versions[0].kind.as_deref(), Some("snapshot"));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = VersionManifest::load(&dir.path().join(MANIFEST_FILE_NAME));
        assert!(matches!(result, Err(ManifestError::Read { .. })));
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let result = VersionManifest::load(&path);

        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }
}
