//! Managed block inside a git exclude file.
//!
//! Only the lines between [`SECTION_START`] and [`SECTION_END`] belong to
//! lnkr; everything else in the file is preserved as-is.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt as _, Result};
use crate::resources::fs::ensure_parent_dir;

/// First line of the managed block.
pub const SECTION_START: &str = "### LNKR STA";
/// Last line of the managed block.
pub const SECTION_END: &str = "### LNKR END";

/// A line-oriented exclude file containing at most one managed block.
#[derive(Debug, Clone)]
pub struct ExcludeFile {
    path: PathBuf,
}

impl ExcludeFile {
    /// Exclude file at `path` (need not exist yet).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge `paths` into the managed block, keeping entries already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn sync<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        let content = self.read()?;
        self.write(&render_with_block(&content, paths, true))
    }

    /// Replace the managed block with exactly `paths`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn rewrite<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        let content = self.read()?;
        self.write(&render_with_block(&content, paths, false))
    }

    /// Delete the managed block.  Returns `false` when there was nothing to
    /// remove.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or written.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let content = self.read()?;
        if split_block(&content).is_none() {
            return Ok(false);
        }
        self.write(&strip_block(&content))?;
        Ok(true)
    }

    fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&self.path).fs_context(|| format!("read {}", self.path.display()))
    }

    fn write(&self, content: &str) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, content).fs_context(|| format!("write {}", self.path.display()))
    }
}

/// A file split around its first complete managed block.  `before` and
/// `after` are byte-exact slices of the original content.
struct Block<'a> {
    before: &'a str,
    body: &'a str,
    after: &'a str,
}

fn split_block(content: &str) -> Option<Block<'_>> {
    let mut offset = 0;
    let mut start: Option<(usize, usize)> = None;
    for line in content.split_inclusive('\n') {
        let next = offset + line.len();
        match start {
            None if line.trim() == SECTION_START => start = Some((offset, next)),
            Some((head_end, body_start)) if line.trim() == SECTION_END => {
                return Some(Block {
                    before: content.get(..head_end)?,
                    body: content.get(body_start..offset)?,
                    after: content.get(next..)?,
                });
            }
            _ => {}
        }
        offset = next;
    }
    None
}

fn normalize_entry(entry: &str) -> Option<String> {
    let trimmed = entry.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    })
}

/// Render `content` with a fresh managed block.
///
/// An existing block is replaced in place; otherwise the block is appended.
/// Content outside the block is kept byte for byte.  With `merge_existing`,
/// entries of the current block are kept alongside `paths`.  Entries are
/// normalized to a leading `/`, sorted and deduplicated.
#[must_use]
pub fn render_with_block<S: AsRef<str>>(content: &str, paths: &[S], merge_existing: bool) -> String {
    let block = split_block(content);
    let mut entries: BTreeSet<String> = BTreeSet::new();
    if merge_existing && let Some(b) = &block {
        entries.extend(b.body.lines().filter_map(normalize_entry));
    }
    entries.extend(paths.iter().filter_map(|p| normalize_entry(p.as_ref())));

    let (before, after) = block.map_or((content, ""), |b| (b.before, b.after));
    let mut out = String::from(before);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(SECTION_START);
    out.push('\n');
    for entry in &entries {
        out.push_str(entry);
        out.push('\n');
    }
    out.push_str(SECTION_END);
    out.push('\n');
    out.push_str(after);
    out
}

/// Render `content` without its managed block.
#[must_use]
pub fn strip_block(content: &str) -> String {
    split_block(content).map_or_else(|| content.to_string(), |b| format!("{}{}", b.before, b.after))
}
