//! Subcommand handlers.
pub mod add;
pub mod clean;
pub mod init;
pub mod link;
pub mod remove;
pub mod status;
pub mod switch;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::engine::Context;
use crate::logging::Logger;
use crate::manifest::TomlManifestStore;

/// Shared state produced by the common command setup sequence.
///
/// Resolves the global settings, the working directory and the manifest
/// location so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved global settings.
    pub settings: Settings,
    /// Working directory of the invocation.
    pub cwd: PathBuf,
    /// Manifest store for this invocation.
    pub store: TomlManifestStore,
}

impl CommandSetup {
    /// Read settings from the environment and the global config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or the
    /// global config file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);
        let settings = Settings::from_env().context("failed to load global settings")?;
        Ok(Self::with_settings(global, settings, cwd, log))
    }

    /// Build the setup from already resolved settings.
    #[must_use]
    pub fn with_settings(global: &GlobalOpts, settings: Settings, cwd: PathBuf, log: &Logger) -> Self {
        let store = TomlManifestStore::new(manifest_path(global.manifest.as_deref(), &cwd));
        log.debug(&format!("manifest: {}", store.path().display()));
        Self {
            settings,
            cwd,
            store,
        }
    }

    /// Engine context borrowing this setup.
    #[must_use]
    pub fn ctx<'a>(&'a self, log: &'a Logger) -> Context<'a> {
        Context::new(&self.store, &self.settings, log)
    }

    /// Location of the manifest file.
    #[must_use]
    pub fn manifest_file(&self) -> &Path {
        self.store.path()
    }
}

/// Manifest location: `--manifest` (relative to `cwd`) or `cwd/.lnkr.toml`.
fn manifest_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => cwd.join(crate::manifest::MANIFEST_FILE_NAME),
    }
}
