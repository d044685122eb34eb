//! Add: move a local object to the remote root and link it back.
use crate::error::{LnkrError, Result};
use crate::manifest::{LinkEntry, LinkType, relpath};
use crate::resources::{create_link, fs};

use super::undo::{UndoAction, UndoJournal};
use super::{Context, Roots, persist, refresh_exclusions};

/// Result of [`add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// These entries were moved, linked and recorded.
    Added(Vec<LinkEntry>),
    /// Every candidate was already tracked.
    NothingNew,
}

/// Track `path` (relative to the local root).
///
/// The link type is `link_type` if given, otherwise the manifest default,
/// otherwise the `link_type` setting.  Directories under the hard policy
/// require `recursive` and are expanded into one entry per file.
///
/// # Errors
///
/// Returns [`LnkrError::AbsolutePathRejected`] for absolute paths,
/// [`LnkrError::ConfigurationMissing`] without configured roots,
/// [`LnkrError::PathNotFound`] if the local object does not exist,
/// [`LnkrError::InvalidCombination`] for disallowed flag combinations and
/// the first move or link failure.
pub fn add(
    ctx: &Context<'_>,
    path: &str,
    recursive: bool,
    link_type: Option<LinkType>,
) -> Result<AddOutcome> {
    let rel = relpath::normalize(path)?;
    let mut manifest = ctx.store.load()?;
    let roots = Roots::resolve(&manifest, ctx.settings)?;
    let link_type = match link_type.or(manifest.link_type) {
        Some(t) => t,
        None => ctx.settings.link_type()?,
    };

    let local_abs = roots.local_path(&rel);
    let meta = match std::fs::metadata(&local_abs) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LnkrError::PathNotFound(local_abs));
        }
        Err(e) => return Err(LnkrError::fs(format!("stat {}", local_abs.display()), e)),
    };

    if recursive && link_type == LinkType::Symbolic {
        return Err(LnkrError::InvalidCombination(
            "recursive option cannot be used with symbolic links".to_string(),
        ));
    }
    if meta.is_dir() && link_type == LinkType::Hard && !recursive {
        return Err(LnkrError::InvalidCombination(
            "recursive option must be set when adding a directory with hard links".to_string(),
        ));
    }

    let candidates = if meta.is_dir() && link_type == LinkType::Hard {
        fs::walk_files(&local_abs)?
            .iter()
            .map(|file| relpath::relative_to(file, &roots.local))
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![rel]
    };
    let candidates: Vec<String> = candidates
        .into_iter()
        .filter(|c| !manifest.contains(c))
        .collect();

    if candidates.is_empty() {
        ctx.log.info("No new paths to add.");
        return Ok(AddOutcome::NothingNew);
    }

    let mut added = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Err(e) = relocate(ctx, &roots, &candidate, link_type) {
            if !added.is_empty() {
                // Keep the manifest in step with the entries already moved.
                if let Err(save_err) = persist(ctx, &mut manifest) {
                    ctx.log
                        .warn(&format!("failed to save partial progress: {save_err}"));
                } else {
                    refresh_exclusions(ctx, &manifest, &roots.local);
                }
            }
            return Err(e);
        }
        let entry = LinkEntry::new(candidate, link_type);
        manifest.entries.push(entry.clone());
        added.push(entry);
    }

    persist(ctx, &mut manifest)?;
    refresh_exclusions(ctx, &manifest, &roots.local);
    Ok(AddOutcome::Added(added))
}

/// Move one object to the remote root and link it back, undoing the move
/// if the link cannot be created.
fn relocate(ctx: &Context<'_>, roots: &Roots, rel: &str, link_type: LinkType) -> Result<()> {
    let local = roots.local_path(rel);
    let remote = roots.remote_path(rel);
    let mut journal = UndoJournal::new();

    fs::ensure_parent_dir(&remote)?;
    fs::move_path(&local, &remote)?;
    ctx.log
        .info(&format!("Moved: {} -> {}", local.display(), remote.display()));
    journal.record(UndoAction::MoveBack {
        from: remote.clone(),
        to: local.clone(),
    });

    if let Err(e) = create_link(&remote, &local, link_type, ctx.log) {
        journal.rollback(ctx.log);
        return Err(e);
    }
    journal.commit();
    Ok(())
}
