//! Link lifecycle operations.
//!
//! Every operation takes a [`Context`] carrying the manifest store, the
//! resolved settings and a logger.  Operations that change the entry set
//! load the manifest, mutate the filesystem, persist the manifest and then
//! refresh the git exclude block on a best-effort basis.
pub mod add;
pub mod clean;
pub mod init;
pub mod reconcile;
pub mod remove;
pub mod status;
pub mod switch;
pub mod undo;

pub use add::{AddOutcome, add};
pub use clean::{CleanOutcome, clean};
pub use init::{InitOptions, init};
pub use reconcile::{BatchReport, create_links, unlink};
pub use remove::{RemoveOutcome, remove};
pub use status::{StatusRow, render_table, status};
pub use switch::{SwitchOutcome, collapse, explode, switch};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{Settings, pathvar};
use crate::error::{LnkrError, Result};
use crate::logging::Log;
use crate::manifest::{MANIFEST_FILE_NAME, Manifest, ManifestStore};
use crate::resources::ExcludeFile;

/// Collaborators shared by every engine operation.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Where the manifest is loaded from and saved to.
    pub store: &'a dyn ManifestStore,
    /// Resolved global settings.
    pub settings: &'a Settings,
    /// Progress and warning output.
    pub log: &'a dyn Log,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("settings", self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    /// Bundle the collaborators.
    #[must_use]
    pub fn new(store: &'a dyn ManifestStore, settings: &'a Settings, log: &'a dyn Log) -> Self {
        Self {
            store,
            settings,
            log,
        }
    }
}

/// Expanded absolute local and remote roots of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// Directory holding the link artifacts.
    pub local: PathBuf,
    /// Directory holding the authoritative data.
    pub remote: PathBuf,
}

impl Roots {
    /// Expand the roots stored in `manifest`.
    ///
    /// # Errors
    ///
    /// Returns [`LnkrError::ConfigurationMissing`] if either root is unset
    /// or references an undefined variable.
    pub fn resolve(manifest: &Manifest, settings: &Settings) -> Result<Self> {
        if manifest.local.trim().is_empty() {
            return Err(LnkrError::ConfigurationMissing(
                "local directory not configured; run 'lnkr init' first".to_string(),
            ));
        }
        if manifest.remote.trim().is_empty() {
            return Err(LnkrError::ConfigurationMissing(
                "remote directory not configured; run 'lnkr init' first".to_string(),
            ));
        }
        Ok(Self {
            local: pathvar::expand(&manifest.local, settings)?,
            remote: pathvar::expand(&manifest.remote, settings)?,
        })
    }

    /// Absolute local path of a relative entry path.
    #[must_use]
    pub fn local_path(&self, rel: &str) -> PathBuf {
        self.local.join(rel)
    }

    /// Absolute remote path of a relative entry path.
    #[must_use]
    pub fn remote_path(&self, rel: &str) -> PathBuf {
        self.remote.join(rel)
    }
}

/// Sort and save the manifest.
pub(crate) fn persist(ctx: &Context<'_>, manifest: &mut Manifest) -> Result<()> {
    manifest.sort_entries();
    ctx.store.save(manifest)
}

/// Exclude file for `manifest`: its own override, else the setting.
/// Relative paths resolve against `local_root`.
///
/// # Errors
///
/// Returns an error if the configured path references an undefined
/// variable.
pub fn exclude_file(manifest: &Manifest, settings: &Settings, local_root: &Path) -> Result<ExcludeFile> {
    let raw = manifest
        .git_exclude_path
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| settings.git_exclude_path());
    let path = pathvar::expand(&raw, settings)?;
    Ok(ExcludeFile::new(if path.is_absolute() {
        path
    } else {
        local_root.join(path)
    }))
}

/// Paths written to the exclude block for `manifest`.
#[must_use]
pub fn exclusion_set(manifest: &Manifest) -> Vec<String> {
    std::iter::once(MANIFEST_FILE_NAME.to_string())
        .chain(manifest.entry_paths())
        .collect()
}

/// Rewrite the exclude block with the manifest file and every entry.
/// Failures are reported as warnings.
pub(crate) fn refresh_exclusions(ctx: &Context<'_>, manifest: &Manifest, local_root: &Path) {
    let result = exclude_file(manifest, ctx.settings, local_root)
        .and_then(|file| file.rewrite(&exclusion_set(manifest)).map(|()| file));
    match result {
        Ok(file) => ctx
            .log
            .debug(&format!("updated exclusions in {}", file.path().display())),
        Err(e) => ctx
            .log
            .warn(&format!("failed to update git exclude file: {e}")),
    }
}
