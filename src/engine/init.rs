//! Init: bind a working directory to a remote directory.
use std::path::{Path, PathBuf};

use crate::config::pathvar;
use crate::config::settings::default_remote_path;
use crate::error::{IoResultExt as _, LnkrError, Result};
use crate::manifest::{LinkType, MANIFEST_FILE_NAME};
use crate::resources::{create_link, fs};

use super::undo::{UndoAction, UndoJournal};
use super::{Context, exclude_file, exclusion_set};

/// Optional overrides for [`init`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Remote directory; relative values are joined onto the remote root.
    pub remote: Option<String>,
    /// Exclude file to record in the manifest.
    pub git_exclude_path: Option<String>,
}

/// Create or update the manifest at `manifest_file` for the working
/// directory `cwd`.
///
/// The manifest file is moved into the remote directory and replaced by a
/// symbolic link; when the remote already holds a manifest that copy wins.
/// Existing `link_type` and `git_exclude_path` values are kept.
///
/// # Errors
///
/// Returns [`LnkrError::PathNotFound`] if the remote root does not exist,
/// [`LnkrError::ValidationError`] if the remote root or remote directory is
/// not a directory, and any failure to move, link, save or write the
/// exclude file.
pub fn init(ctx: &Context<'_>, manifest_file: &Path, cwd: &Path, opts: &InitOptions) -> Result<()> {
    let base = remote_base(ctx)?;
    let remote = match opts.remote.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(raw) => {
            let expanded = pathvar::expand(raw, ctx.settings)?;
            if expanded.is_absolute() {
                expanded
            } else {
                pathvar::clean(&base.join(expanded))
            }
        }
        None => default_remote_path(cwd, &base, ctx.settings.remote_depth()),
    };
    ensure_directory(&remote)?;

    let existed = fs::exists_no_follow(manifest_file);
    link_manifest(ctx, manifest_file, &remote.join(MANIFEST_FILE_NAME))?;

    let mut manifest = ctx.store.load()?;
    manifest.local = portable(cwd, ctx);
    manifest.remote = portable(&remote, ctx);
    if manifest.link_type.is_none() {
        manifest.link_type = Some(ctx.settings.link_type()?);
    }
    if let Some(path) = opts.git_exclude_path.as_deref().filter(|p| !p.trim().is_empty()) {
        manifest.git_exclude_path = Some(path.to_string());
    }
    manifest.sort_entries();
    ctx.store.save(&manifest)?;
    ctx.log.info(&if existed {
        format!("Updated local and remote in {MANIFEST_FILE_NAME}")
    } else {
        format!("Created {MANIFEST_FILE_NAME} with local and remote directories")
    });

    let exclude = exclude_file(&manifest, ctx.settings, cwd)?;
    exclude.rewrite(&exclusion_set(&manifest))?;
    ctx.log
        .debug(&format!("updated exclusions in {}", exclude.path().display()));

    ctx.log.info("Project initialized successfully!");
    Ok(())
}

/// Expanded remote root setting, which must be an existing directory.
fn remote_base(ctx: &Context<'_>) -> Result<PathBuf> {
    let raw = ctx.settings.remote_root().ok_or_else(|| {
        LnkrError::ConfigurationMissing("remote_root is not set and no home directory is known".to_string())
    })?;
    let base = pathvar::expand(&raw.to_string_lossy(), ctx.settings)?;
    match std::fs::metadata(&base) {
        Ok(meta) if meta.is_dir() => Ok(base),
        Ok(_) => Err(LnkrError::ValidationError(format!(
            "base path is not a directory: {}",
            base.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LnkrError::PathNotFound(base)),
        Err(e) => Err(LnkrError::fs(format!("stat {}", base.display()), e)),
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LnkrError::ValidationError(format!(
            "remote path exists but is not a directory: {}",
            path.display()
        ))),
        Err(_) => std::fs::create_dir_all(path)
            .fs_context(|| format!("create remote directory {}", path.display())),
    }
}

/// Put the manifest at `remote_file` and link `local_file` to it.
fn link_manifest(ctx: &Context<'_>, local_file: &Path, remote_file: &Path) -> Result<()> {
    if let Ok(meta) = local_file.symlink_metadata()
        && meta.file_type().is_symlink()
    {
        if std::fs::read_link(local_file).is_ok_and(|t| t == remote_file) {
            ctx.log.debug("manifest link already in place");
            return Ok(());
        }
        crate::resources::link::remove_symlink(local_file)?;
    }

    let mut journal = UndoJournal::new();
    if remote_file.exists() {
        if fs::exists_no_follow(local_file) {
            std::fs::remove_file(local_file)
                .fs_context(|| format!("remove {}", local_file.display()))?;
        }
    } else if fs::exists_no_follow(local_file) {
        fs::move_path(local_file, remote_file)?;
        ctx.log.info(&format!(
            "Moved: {} -> {}",
            local_file.display(),
            remote_file.display()
        ));
        journal.record(UndoAction::MoveBack {
            from: remote_file.to_path_buf(),
            to: local_file.to_path_buf(),
        });
    } else {
        std::fs::write(remote_file, b"").fs_context(|| format!("write {}", remote_file.display()))?;
        journal.record(UndoAction::RemoveArtifact {
            path: remote_file.to_path_buf(),
        });
    }

    if let Err(e) = fs::ensure_parent_dir(local_file)
        .and_then(|()| create_link(remote_file, local_file, LinkType::Symbolic, ctx.log))
    {
        journal.rollback(ctx.log);
        return Err(e);
    }
    journal.commit();
    Ok(())
}

/// Contracted form of `path`, unless that would tie it to the working
/// directory.
fn portable(path: &Path, ctx: &Context<'_>) -> String {
    let contracted = pathvar::contract(path, ctx.settings);
    if contracted.starts_with("$PWD") {
        pathvar::clean(path).to_string_lossy().into_owned()
    } else {
        contracted
    }
}
