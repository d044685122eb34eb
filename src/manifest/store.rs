//! Manifest persistence.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{LinkEntry, LinkType, MANIFEST_FILE_NAME, Manifest};
use crate::config::toml_loader;
use crate::error::{IoResultExt as _, LnkrError, Result};

/// Loads and saves the manifest.  Engine operations only ever talk to the
/// manifest through this trait.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestStore {
    /// Load the manifest; a missing store yields an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or is invalid.
    fn load(&self) -> Result<Manifest>;

    /// Persist the manifest wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written.
    fn save(&self, manifest: &Manifest) -> Result<()>;
}

/// [`ManifestStore`] backed by a TOML file (`.lnkr.toml`).
#[derive(Debug, Clone)]
pub struct TomlManifestStore {
    path: PathBuf,
}

impl TomlManifestStore {
    /// Store at an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `dir/.lnkr.toml`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(MANIFEST_FILE_NAME))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    local: String,
    #[serde(default)]
    remote: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    link_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    git_exclude_path: String,
    #[serde(default)]
    links: Vec<LinkRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LinkRecord {
    path: String,
    #[serde(rename = "type", default)]
    link_type: String,
}

fn parse_optional_type(value: &str) -> Result<Option<LinkType>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        LinkType::parse(value).map(Some)
    }
}

impl TryFrom<ManifestFile> for Manifest {
    type Error = LnkrError;

    fn try_from(file: ManifestFile) -> Result<Self> {
        let entries = file
            .links
            .into_iter()
            .map(|record| {
                let link_type = parse_optional_type(&record.link_type)?.unwrap_or(LinkType::Symbolic);
                Ok(LinkEntry::new(record.path, link_type))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            local: file.local,
            remote: file.remote,
            link_type: parse_optional_type(&file.link_type)?,
            git_exclude_path: Some(file.git_exclude_path).filter(|p| !p.is_empty()),
            entries,
        })
    }
}

impl From<&Manifest> for ManifestFile {
    fn from(manifest: &Manifest) -> Self {
        Self {
            local: manifest.local.clone(),
            remote: manifest.remote.clone(),
            link_type: manifest
                .link_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            git_exclude_path: manifest.git_exclude_path.clone().unwrap_or_default(),
            links: manifest
                .entries
                .iter()
                .map(|e| LinkRecord {
                    path: e.path.clone(),
                    link_type: e.link_type.as_str().to_string(),
                })
                .collect(),
        }
    }
}

impl ManifestStore for TomlManifestStore {
    fn load(&self) -> Result<Manifest> {
        let file: ManifestFile = toml_loader::load_toml(&self.path)?;
        Manifest::try_from(file)
    }

    fn save(&self, manifest: &Manifest) -> Result<()> {
        let mut sorted = manifest.clone();
        sorted.sort_entries();
        let content = toml::to_string(&ManifestFile::from(&sorted)).map_err(|e| LnkrError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        // Writing through the path follows the symlink `init` leaves behind.
        std::fs::write(&self.path, content)
            .fs_context(|| format!("write {}", self.path.display()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), Manifest::default());
    }

    #[test]
    fn save_then_load_sorts_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        let manifest = Manifest {
            local: "$PWD".to_string(),
            remote: "$LNKR_REMOTE_ROOT/proj".to_string(),
            link_type: Some(LinkType::Hard),
            git_exclude_path: None,
            entries: vec![
                LinkEntry::new("z.txt", LinkType::Symbolic),
                LinkEntry::new("a.txt", LinkType::Hard),
            ],
        };
        store.save(&manifest).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.entry_paths(), vec!["a.txt", "z.txt"]);
        assert_eq!(loaded.link_type, Some(LinkType::Hard));
        assert_eq!(loaded.remote, "$LNKR_REMOTE_ROOT/proj");
    }

    #[test]
    fn saved_file_uses_persisted_type_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        let manifest = Manifest {
            local: "/l".to_string(),
            remote: "/r".to_string(),
            entries: vec![LinkEntry::new("notes.txt", LinkType::Symbolic)],
            ..Manifest::default()
        };
        store.save(&manifest).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("[[links]]"));
        assert!(raw.contains("type = \"sym\""));
        assert!(!raw.contains("git_exclude_path"));
    }

    #[test]
    fn empty_entry_type_defaults_to_symbolic() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        std::fs::write(
            store.path(),
            "local = \"/l\"\nremote = \"/r\"\n[[links]]\npath = \"a\"\n",
        )
        .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.entries[0].link_type, LinkType::Symbolic);
        assert_eq!(loaded.link_type, None);
    }

    #[test]
    fn symbolic_alias_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        std::fs::write(store.path(), "link_type = \"symbolic\"\n").unwrap();
        assert_eq!(store.load().unwrap().link_type, Some(LinkType::Symbolic));
    }

    #[test]
    fn invalid_link_type_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        std::fs::write(store.path(), "link_type = \"junction\"\n").unwrap();
        assert!(matches!(
            store.load(),
            Err(LnkrError::ValidationError(_))
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlManifestStore::in_dir(dir.path());
        std::fs::write(store.path(), "local = [").unwrap();
        assert!(matches!(store.load(), Err(LnkrError::Parse { .. })));
    }
}
