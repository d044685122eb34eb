//! Switch: convert tracked entries between hard and symbolic links in place.
//!
//! A file changes link kind directly.  A directory changes shape as well: a
//! single symbolic entry is exploded into one hard entry per file, and a set
//! of hard entries under a directory is collapsed back into one symbolic
//! entry.
use std::path::Path;

use crate::error::{IoResultExt as _, LnkrError, Result};
use crate::manifest::{LinkEntry, LinkType, Manifest, is_same_or_nested, relpath};
use crate::resources::{LinkResource, create_link, fs};

use super::undo::{UndoAction, UndoJournal};
use super::{Context, Roots, persist, refresh_exclusions};

/// Result of [`switch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The entry already had the requested type.
    Unchanged(LinkType),
    /// The entry was converted.
    Switched {
        /// Previous type.
        from: LinkType,
        /// New type.
        to: LinkType,
    },
}

/// Replace a symbolic directory entry by one hard entry per file below it.
///
/// `files` are root-relative paths; anything not nested under `dir` is
/// ignored.  The result is sorted by path.
///
/// ```
/// use lnkr::engine::explode;
/// use lnkr::manifest::{LinkEntry, LinkType};
///
/// let dir = LinkEntry::new("proj", LinkType::Symbolic);
/// let files = vec!["proj/b".to_string(), "proj/a".to_string()];
/// let entries = explode(&dir, &files);
/// assert_eq!(entries[0], LinkEntry::new("proj/a", LinkType::Hard));
/// assert_eq!(entries.len(), 2);
/// ```
#[must_use]
pub fn explode(dir: &LinkEntry, files: &[String]) -> Vec<LinkEntry> {
    let mut entries: Vec<LinkEntry> = files
        .iter()
        .filter(|f| f.as_str() != dir.path && is_same_or_nested(f, &dir.path))
        .map(|f| LinkEntry::new(f.clone(), LinkType::Hard))
        .collect();
    entries.sort();
    entries.dedup();
    entries
}

/// Fold every entry equal to or nested under `dir` into one symbolic entry.
///
/// Returns the directory entry and the entries that were not folded.
#[must_use]
pub fn collapse(dir: &str, entries: &[LinkEntry]) -> (LinkEntry, Vec<LinkEntry>) {
    let remaining = entries
        .iter()
        .filter(|e| !is_same_or_nested(&e.path, dir))
        .cloned()
        .collect();
    (LinkEntry::new(dir, LinkType::Symbolic), remaining)
}

/// Change the link type of `path`.
///
/// Without `new_type` the current type is toggled.  A path with no exact
/// entry but with nested entries is treated as an exploded hard-link
/// directory.
///
/// # Errors
///
/// Returns [`LnkrError::ValidationError`] for an unknown `new_type` (before
/// touching the filesystem), [`LnkrError::PathNotFound`] if `path` is not
/// tracked, and the first filesystem failure after rolling back.
pub fn switch(ctx: &Context<'_>, path: &str, new_type: Option<&str>) -> Result<SwitchOutcome> {
    let requested = new_type.map(LinkType::parse).transpose()?;
    let rel = relpath::normalize(path)?;
    let mut manifest = ctx.store.load()?;
    let roots = Roots::resolve(&manifest, ctx.settings)?;

    let exact = manifest.find(&rel).map(|e| e.link_type);
    let current = match exact {
        Some(t) => t,
        None if !manifest.nested_under(&rel).is_empty() => LinkType::Hard,
        None => return Err(LnkrError::PathNotFound(roots.local_path(&rel))),
    };
    let target = requested.unwrap_or_else(|| current.toggled());

    if target == current {
        ctx.log
            .info(&format!("Link type is already {target}: {rel}"));
        return Ok(SwitchOutcome::Unchanged(current));
    }

    // A symlink inside the remote root is a leaf object, as in `walk_files`.
    let remote = roots.remote_path(&rel);
    let is_dir = exact.is_none()
        || std::fs::symlink_metadata(&remote)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LnkrError::PathNotFound(remote.clone())
                } else {
                    LnkrError::fs(format!("stat {}", remote.display()), e)
                }
            })?
            .is_dir();

    if is_dir {
        match target {
            LinkType::Hard => explode_directory(ctx, &roots, &mut manifest, &rel)?,
            LinkType::Symbolic => collapse_directory(ctx, &roots, &mut manifest, &rel)?,
        }
    } else {
        switch_file(ctx, &roots, &mut manifest, &rel, current, target)?;
    }

    persist(ctx, &mut manifest)?;
    refresh_exclusions(ctx, &manifest, &roots.local);
    ctx.log.info(&format!(
        "Switched link type: {current} -> {target} for {rel}{}",
        if is_dir { " (recursive)" } else { "" }
    ));
    Ok(SwitchOutcome::Switched {
        from: current,
        to: target,
    })
}

fn switch_file(
    ctx: &Context<'_>,
    roots: &Roots,
    manifest: &mut Manifest,
    rel: &str,
    current: LinkType,
    target: LinkType,
) -> Result<()> {
    let old = LinkResource::new(roots.remote_path(rel), roots.local_path(rel), current);
    let mut journal = UndoJournal::new();

    if fs::exists_no_follow(&old.target) {
        old.remove_artifact(ctx.log)?;
        journal.record(UndoAction::Relink {
            source: old.source.clone(),
            target: old.target.clone(),
            link_type: current,
        });
    }

    let created = fs::ensure_parent_dir(&old.target)
        .and_then(|()| create_link(&old.source, &old.target, target, ctx.log));
    if let Err(e) = created {
        journal.rollback(ctx.log);
        return Err(e);
    }
    journal.commit();

    if let Some(entry) = manifest.entries.iter_mut().find(|e| e.path == rel) {
        entry.link_type = target;
    }
    Ok(())
}

fn explode_directory(
    ctx: &Context<'_>,
    roots: &Roots,
    manifest: &mut Manifest,
    rel: &str,
) -> Result<()> {
    let mut journal = UndoJournal::new();
    let files = match explode_on_disk(ctx, roots, rel, &mut journal) {
        Ok(files) => files,
        Err(e) => {
            journal.rollback(ctx.log);
            return Err(e);
        }
    };
    journal.commit();

    let dir = LinkEntry::new(rel, LinkType::Symbolic);
    manifest.entries.retain(|e| e.path != rel);
    manifest.entries.extend(explode(&dir, &files));
    Ok(())
}

/// Replace the directory symlink by a real directory of hard links.
/// Returns the root-relative paths of the linked files.
fn explode_on_disk(
    ctx: &Context<'_>,
    roots: &Roots,
    rel: &str,
    journal: &mut UndoJournal,
) -> Result<Vec<String>> {
    let local = roots.local_path(rel);
    let remote = roots.remote_path(rel);

    if fs::exists_no_follow(&local) {
        LinkResource::new(remote.clone(), local.clone(), LinkType::Symbolic)
            .remove_artifact(ctx.log)?;
        journal.record(UndoAction::Relink {
            source: remote.clone(),
            target: local.clone(),
            link_type: LinkType::Symbolic,
        });
    }

    std::fs::create_dir_all(&local).fs_context(|| format!("create {}", local.display()))?;
    journal.record(UndoAction::RemoveTree {
        path: local.clone(),
    });

    for dir in fs::walk_dirs(&remote)? {
        let sub = mirror(&dir, &remote, &local);
        std::fs::create_dir_all(&sub).fs_context(|| format!("create {}", sub.display()))?;
    }

    let mut files = Vec::new();
    for file in fs::walk_files(&remote)? {
        let file_rel = relpath::relative_to(&file, &roots.remote)?;
        create_link(&file, &roots.local_path(&file_rel), LinkType::Hard, ctx.log)?;
        files.push(file_rel);
    }
    Ok(files)
}

fn mirror(path: &Path, from_root: &Path, to_root: &Path) -> std::path::PathBuf {
    path.strip_prefix(from_root)
        .map_or_else(|_| to_root.to_path_buf(), |rest| to_root.join(rest))
}

fn collapse_directory(
    ctx: &Context<'_>,
    roots: &Roots,
    manifest: &mut Manifest,
    rel: &str,
) -> Result<()> {
    let mut journal = UndoJournal::new();
    if let Err(e) = collapse_on_disk(ctx, roots, manifest, rel, &mut journal) {
        journal.rollback(ctx.log);
        return Err(e);
    }
    journal.commit();

    let (dir, mut remaining) = collapse(rel, &manifest.entries);
    remaining.push(dir);
    manifest.entries = remaining;
    Ok(())
}

/// Replace the directory of hard links by one directory symlink.
fn collapse_on_disk(
    ctx: &Context<'_>,
    roots: &Roots,
    manifest: &Manifest,
    rel: &str,
    journal: &mut UndoJournal,
) -> Result<()> {
    for entry in manifest
        .entries
        .iter()
        .filter(|e| is_same_or_nested(&e.path, rel))
    {
        let res = LinkResource::new(
            roots.remote_path(&entry.path),
            roots.local_path(&entry.path),
            entry.link_type,
        );
        let Ok(meta) = res.target.symlink_metadata() else {
            continue;
        };
        // A hard entry naming a directory was linked file by file; the tree
        // is removed as a whole below.
        if meta.is_dir() {
            continue;
        }
        res.remove_artifact(ctx.log)?;
        journal.record(UndoAction::Relink {
            source: res.source.clone(),
            target: res.target.clone(),
            link_type: res.link_type,
        });
    }

    let local = roots.local_path(rel);
    if let Ok(meta) = local.symlink_metadata() {
        if meta.is_dir() {
            std::fs::remove_dir_all(&local)
        } else {
            std::fs::remove_file(&local)
        }
        .fs_context(|| format!("remove {}", local.display()))?;
    }

    fs::ensure_parent_dir(&local)?;
    create_link(&roots.remote_path(rel), &local, LinkType::Symbolic, ctx.log)
}
