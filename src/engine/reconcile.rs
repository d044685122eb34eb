//! Reconciler: rebuild or tear down every link artifact from the manifest.
//!
//! Neither operation moves data or changes the manifest.  Entries are
//! handled independently; the batch only fails when every entry failed.
use std::path::Path;

use crate::error::{IoResultExt as _, LnkrError, Result};
use crate::logging::EntryStatus;
use crate::manifest::{LinkEntry, LinkType, MANIFEST_FILE_NAME};
use crate::resources::link::remove_symlink;
use crate::resources::{LinkResource, create_link, fs};

use super::{Context, Roots, exclude_file, refresh_exclusions};

/// Per-entry outcome counts of a batch operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Entries processed successfully.
    pub succeeded: usize,
    /// Entries left alone.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
}

impl BatchReport {
    /// Number of entries seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

enum EntryResult {
    Done,
    Skipped(String),
}

/// Tally each entry result, logging failures, and keep the last error.
fn run_batch<F>(ctx: &Context<'_>, entries: &[LinkEntry], verb: &str, mut op: F) -> (BatchReport, Option<LnkrError>)
where
    F: FnMut(&LinkEntry) -> Result<EntryResult>,
{
    let mut report = BatchReport::default();
    let mut last_error = None;
    for entry in entries {
        match op(entry) {
            Ok(EntryResult::Done) => {
                report.succeeded += 1;
                ctx.log.record(&entry.path, EntryStatus::Ok, None);
            }
            Ok(EntryResult::Skipped(reason)) => {
                report.skipped += 1;
                ctx.log.record(&entry.path, EntryStatus::Skipped, Some(reason.as_str()));
            }
            Err(e) => {
                report.failed += 1;
                ctx.log
                    .error(&format!("Error {verb} link for {}: {e}", entry.path));
                ctx.log
                    .record(&entry.path, EntryStatus::Failed, Some(e.to_string().as_str()));
                last_error = Some(e);
            }
        }
    }
    (report, last_error)
}

fn finish(report: BatchReport, last_error: Option<LnkrError>) -> Result<BatchReport> {
    match last_error {
        Some(e) if report.failed == report.total() => Err(e),
        _ => Ok(report),
    }
}

/// Create every link listed in the manifest.
///
/// Entries whose remote object is missing or whose local path is occupied
/// are skipped with a warning.
///
/// # Errors
///
/// Returns the last entry error if every entry failed.
pub fn create_links(ctx: &Context<'_>) -> Result<BatchReport> {
    let manifest = ctx.store.load()?;
    if manifest.entries.is_empty() {
        ctx.log.info(&format!("No links found in {MANIFEST_FILE_NAME}"));
        return Ok(BatchReport::default());
    }
    let roots = Roots::resolve(&manifest, ctx.settings)?;

    let (report, last_error) = run_batch(ctx, &manifest.entries, "creating", |entry| {
        create_entry(ctx, &roots, entry)
    });

    refresh_exclusions(ctx, &manifest, &roots.local);
    ctx.log.info("Link creation completed.");
    finish(report, last_error)
}

fn create_entry(ctx: &Context<'_>, roots: &Roots, entry: &LinkEntry) -> Result<EntryResult> {
    let res = LinkResource::for_entry(entry, &roots.local, &roots.remote);

    let Ok(source_meta) = std::fs::metadata(&res.source) else {
        let reason = format!("source path does not exist: {}", res.source.display());
        ctx.log.warn(&reason);
        return Ok(EntryResult::Skipped(reason));
    };
    if fs::exists_no_follow(&res.target) {
        let reason = format!("target already exists: {}", res.target.display());
        ctx.log.warn(&reason);
        return Ok(EntryResult::Skipped(reason));
    }

    fs::ensure_parent_dir(&res.target)?;
    if entry.link_type == LinkType::Hard && source_meta.is_dir() {
        link_tree(ctx, &res.source, &res.target)?;
    } else {
        res.create(ctx.log)?;
    }
    Ok(EntryResult::Done)
}

/// Hard-link every file below `source` into the same layout below `target`.
fn link_tree(ctx: &Context<'_>, source: &Path, target: &Path) -> Result<()> {
    std::fs::create_dir_all(target).fs_context(|| format!("create {}", target.display()))?;
    for dir in fs::walk_dirs(source)? {
        if let Ok(rest) = dir.strip_prefix(source) {
            let sub = target.join(rest);
            std::fs::create_dir_all(&sub).fs_context(|| format!("create {}", sub.display()))?;
        }
    }
    for file in fs::walk_files(source)? {
        if let Ok(rest) = file.strip_prefix(source) {
            create_link(&file, &target.join(rest), LinkType::Hard, ctx.log)?;
        }
    }
    Ok(())
}

/// Remove every local link artifact listed in the manifest and drop the
/// exclude block.
///
/// # Errors
///
/// Returns the last entry error if every entry failed.
pub fn unlink(ctx: &Context<'_>) -> Result<BatchReport> {
    let manifest = ctx.store.load()?;
    if manifest.entries.is_empty() {
        ctx.log.info(&format!("No links found in {MANIFEST_FILE_NAME}"));
        return Ok(BatchReport::default());
    }
    let roots = Roots::resolve(&manifest, ctx.settings)?;

    let (report, last_error) = run_batch(ctx, &manifest.entries, "removing", |entry| {
        unlink_entry(ctx, &roots, entry)
    });

    match exclude_file(&manifest, ctx.settings, &roots.local).and_then(|f| f.clear()) {
        Ok(true) => ctx.log.debug("removed exclusion block"),
        Ok(false) => {}
        Err(e) => ctx
            .log
            .warn(&format!("failed to remove link paths from git exclude file: {e}")),
    }
    ctx.log.info("Link removal completed.");
    finish(report, last_error)
}

fn unlink_entry(ctx: &Context<'_>, roots: &Roots, entry: &LinkEntry) -> Result<EntryResult> {
    let target = roots.local_path(&entry.path);
    let Ok(meta) = target.symlink_metadata() else {
        let reason = format!("Path does not exist, skipping: {}", target.display());
        ctx.log.info(&reason);
        return Ok(EntryResult::Skipped(reason));
    };

    match entry.link_type {
        LinkType::Hard if meta.is_dir() => {
            std::fs::remove_dir_all(&target)
                .fs_context(|| format!("remove directory {}", target.display()))?;
            ctx.log
                .info(&format!("Removed directory: {}", target.display()));
        }
        LinkType::Hard => {
            std::fs::remove_file(&target)
                .fs_context(|| format!("remove hard link {}", target.display()))?;
            ctx.log
                .info(&format!("Removed hard link: {}", target.display()));
        }
        LinkType::Symbolic => {
            if !meta.file_type().is_symlink() {
                return Err(LnkrError::IntegrityError(format!(
                    "expected symbolic link at {} but found regular file",
                    target.display()
                )));
            }
            remove_symlink(&target)?;
            ctx.log
                .info(&format!("Removed symbolic link: {}", target.display()));
        }
    }
    Ok(EntryResult::Done)
}
