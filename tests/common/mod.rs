// Shared helpers for integration tests.
//
// Provides a temporary local root, a temporary remote root and a manifest
// store so each integration test can drive the engine through the public
// API without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lnkr::config::Settings;
use lnkr::engine::Context;
use lnkr::logging::Logger;
use lnkr::manifest::{Manifest, ManifestStore, TomlManifestStore};

/// An isolated local/remote pair backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestEnv {
    /// Temporary directory holding `local/`, `remote/` and `home/`.
    pub root: tempfile::TempDir,
    /// Working tree whose paths get linked.
    pub local: PathBuf,
    /// Directory the tracked data is moved to.
    pub remote: PathBuf,
    /// Manifest store at `local/.lnkr.toml`.
    pub store: TomlManifestStore,
    /// Settings with an empty environment.
    pub settings: Settings,
    /// Logger without a subscriber; output is discarded.
    pub log: Logger,
}

impl TestEnv {
    /// Create the roots and a manifest pointing at them.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let local = root.path().join("local");
        let remote = root.path().join("remote");
        std::fs::create_dir_all(&local).expect("create local root");
        std::fs::create_dir_all(&remote).expect("create remote root");

        let store = TomlManifestStore::in_dir(&local);
        store
            .save(&Manifest {
                local: local.to_string_lossy().into_owned(),
                remote: remote.to_string_lossy().into_owned(),
                ..Manifest::default()
            })
            .expect("write manifest");

        let settings = Settings::isolated(root.path().join("home"), &local);
        Self {
            root,
            local,
            remote,
            store,
            settings,
            log: Logger::new(),
        }
    }

    /// Engine context borrowing this environment.
    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.store, &self.settings, &self.log)
    }

    /// Current manifest.
    pub fn manifest(&self) -> Manifest {
        self.store.load().expect("load manifest")
    }

    /// Raw manifest text.
    pub fn manifest_text(&self) -> String {
        std::fs::read_to_string(self.store.path()).expect("read manifest")
    }

    /// Write `content` to `local/rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.local.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Read `local/rel` through any link.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.local.join(rel)).expect("read file")
    }

    /// Contents of the default exclude file, or empty.
    pub fn exclude(&self) -> String {
        std::fs::read_to_string(self.local.join(".git/info/exclude")).unwrap_or_default()
    }

    /// Every regular file below `dir`, relative and sorted.
    pub fn files_under(dir: &Path) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        files.sort();
        files
    }

    /// Whether `path` itself is a symbolic link.
    pub fn is_symlink(path: &Path) -> bool {
        path.symlink_metadata()
            .is_ok_and(|m| m.file_type().is_symlink())
    }
}

/// Inode number of `path`, following links.
#[cfg(unix)]
pub fn inode(path: &Path) -> u64 {
    use std::os::unix::fs::MetadataExt as _;
    std::fs::metadata(path).expect("stat").ino()
}
