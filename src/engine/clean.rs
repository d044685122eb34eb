//! Clean: undo what init set up in the working directory.
use std::path::{Path, PathBuf};

use crate::config::pathvar;
use crate::error::{IoResultExt as _, Result};
use crate::manifest::Manifest;
use crate::resources::fs;
use crate::resources::link::remove_symlink;

use super::{Context, exclude_file};

/// What [`clean`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOutcome {
    /// The local manifest file or link was deleted.
    pub manifest_removed: bool,
    /// The managed exclude block was deleted.
    pub exclusions_removed: bool,
}

/// Remove the local manifest file (or link) and the managed exclude block.
///
/// Remote data, including the remote copy of the manifest, is never
/// touched.  Missing pieces are skipped.
///
/// # Errors
///
/// Returns an error if the exclude file or the manifest file exists but
/// cannot be rewritten or removed.
pub fn clean(ctx: &Context<'_>, manifest_file: &Path) -> Result<CleanOutcome> {
    let manifest = ctx.store.load().unwrap_or_else(|e| {
        ctx.log
            .warn(&format!("could not read manifest, using defaults: {e}"));
        Manifest::default()
    });
    let local_root = local_root(&manifest, ctx, manifest_file);

    let mut outcome = CleanOutcome::default();
    let exclude = exclude_file(&manifest, ctx.settings, &local_root)?;
    outcome.exclusions_removed = exclude.clear()?;
    if outcome.exclusions_removed {
        ctx.log
            .info(&format!("Removed lnkr section from {}", exclude.path().display()));
    }

    match manifest_file.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => {
            remove_symlink(manifest_file)?;
            outcome.manifest_removed = true;
        }
        Ok(_) => {
            std::fs::remove_file(manifest_file)
                .fs_context(|| format!("remove {}", manifest_file.display()))?;
            outcome.manifest_removed = true;
        }
        Err(_) => ctx.log.info(&format!(
            "Path does not exist, skipping: {}",
            manifest_file.display()
        )),
    }
    if outcome.manifest_removed {
        ctx.log
            .info(&format!("Removed {}", manifest_file.display()));
    }
    Ok(outcome)
}

/// Local root recorded in the manifest, else the manifest's directory.
fn local_root(manifest: &Manifest, ctx: &Context<'_>, manifest_file: &Path) -> PathBuf {
    let fallback = || {
        manifest_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    };
    if manifest.local.trim().is_empty() {
        return fallback();
    }
    pathvar::expand(&manifest.local, ctx.settings)
        .ok()
        .filter(|p| fs::exists_no_follow(p))
        .unwrap_or_else(fallback)
}
