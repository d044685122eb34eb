//! Remove: delete local links and move tracked objects back from remote.
use crate::error::{LnkrError, Result};
use crate::manifest::{LinkEntry, is_same_or_nested, relpath};
use crate::resources::{LinkResource, fs};

use super::undo::{UndoAction, UndoJournal};
use super::{Context, Roots, persist, refresh_exclusions};

/// Result of [`remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// These entries were restored and dropped from the manifest.
    Removed(Vec<LinkEntry>),
    /// No entry matched the path.
    NothingToRemove,
}

/// Stop tracking `path` and every entry nested under it.
///
/// Matched entries are processed deepest path first: the local link is
/// removed, the object moved back from the remote root and empty remote
/// parent directories pruned.
///
/// # Errors
///
/// Returns [`LnkrError::PathNotFound`] if a remote object is missing,
/// [`LnkrError::IntegrityError`] if the local artifact is not the expected
/// kind of link, or the first filesystem failure.  Entries restored before
/// the failure are dropped from the manifest.
pub fn remove(ctx: &Context<'_>, path: &str) -> Result<RemoveOutcome> {
    let rel = relpath::normalize(path)?;
    let mut manifest = ctx.store.load()?;
    let roots = Roots::resolve(&manifest, ctx.settings)?;

    let (mut matched, kept): (Vec<LinkEntry>, Vec<LinkEntry>) = manifest
        .entries
        .iter()
        .cloned()
        .partition(|e| is_same_or_nested(&e.path, &rel));

    if matched.is_empty() {
        ctx.log.info("No matching links found to remove.");
        return Ok(RemoveOutcome::NothingToRemove);
    }

    // Reverse path order puts children before their parents.
    matched.sort_by(|a, b| b.path.cmp(&a.path));

    let mut restored = Vec::with_capacity(matched.len());
    for entry in &matched {
        if let Err(e) = restore(ctx, &roots, entry) {
            if !restored.is_empty() {
                manifest
                    .entries
                    .retain(|e| !restored.contains(e));
                if let Err(save_err) = persist(ctx, &mut manifest) {
                    ctx.log
                        .warn(&format!("failed to save partial progress: {save_err}"));
                } else {
                    refresh_exclusions(ctx, &manifest, &roots.local);
                }
            }
            return Err(e);
        }
        ctx.log.info(&format!("Removed link: {}", entry.path));
        restored.push(entry.clone());
    }

    manifest.entries = kept;
    persist(ctx, &mut manifest)?;
    refresh_exclusions(ctx, &manifest, &roots.local);
    Ok(RemoveOutcome::Removed(restored))
}

/// Replace the local link of `entry` with the remote object.
fn restore(ctx: &Context<'_>, roots: &Roots, entry: &LinkEntry) -> Result<()> {
    let resource = LinkResource::for_entry(entry, &roots.local, &roots.remote);
    if !fs::exists_no_follow(&resource.source) {
        return Err(LnkrError::PathNotFound(resource.source));
    }

    let mut journal = UndoJournal::new();
    let had_artifact = fs::exists_no_follow(&resource.target);
    resource.remove_artifact(ctx.log)?;
    if had_artifact {
        journal.record(UndoAction::Relink {
            source: resource.source.clone(),
            target: resource.target.clone(),
            link_type: resource.link_type,
        });
    }

    let moved = fs::ensure_parent_dir(&resource.target)
        .and_then(|()| fs::move_path(&resource.source, &resource.target));
    if let Err(e) = moved {
        journal.rollback(ctx.log);
        return Err(e);
    }
    journal.commit();
    ctx.log.info(&format!(
        "Restored: {} -> {}",
        resource.source.display(),
        resource.target.display()
    ));

    fs::remove_empty_parents(&resource.source, &roots.remote);
    Ok(())
}
