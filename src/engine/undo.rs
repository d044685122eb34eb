//! Undo journal for multi-step filesystem changes.
//!
//! Each step that succeeds records how to reverse itself.  If a later step
//! fails the journal is rolled back in reverse order; rollback failures are
//! logged and never replace the original error.
use std::path::PathBuf;

use crate::error::{IoResultExt as _, Result};
use crate::logging::Log;
use crate::manifest::LinkType;
use crate::resources::{create_link, fs};

/// Reversal of one applied step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Move an object back from `from` to `to`.
    MoveBack {
        /// Current location.
        from: PathBuf,
        /// Original location.
        to: PathBuf,
    },
    /// Recreate a link that was removed.
    Relink {
        /// Link destination.
        source: PathBuf,
        /// Link location.
        target: PathBuf,
        /// Link kind.
        link_type: LinkType,
    },
    /// Delete a file or link that was created.
    RemoveArtifact {
        /// Created object.
        path: PathBuf,
    },
    /// Delete a directory tree that was created.
    RemoveTree {
        /// Created directory.
        path: PathBuf,
    },
}

impl UndoAction {
    fn apply(&self, log: &dyn Log) -> Result<()> {
        match self {
            Self::MoveBack { from, to } => {
                fs::ensure_parent_dir(to)?;
                fs::move_path(from, to)?;
                log.info(&format!("Restored: {} -> {}", from.display(), to.display()));
                Ok(())
            }
            Self::Relink {
                source,
                target,
                link_type,
            } => {
                fs::ensure_parent_dir(target)?;
                create_link(source, target, *link_type, log)
            }
            Self::RemoveArtifact { path } => {
                if fs::exists_no_follow(path) {
                    std::fs::remove_file(path)
                        .fs_context(|| format!("remove {}", path.display()))?;
                }
                Ok(())
            }
            Self::RemoveTree { path } => {
                if path.exists() {
                    std::fs::remove_dir_all(path)
                        .fs_context(|| format!("remove {}", path.display()))?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered record of applied steps.
#[derive(Debug, Default)]
pub struct UndoJournal {
    actions: Vec<UndoAction>,
}

impl UndoJournal {
    /// Empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reversal of a step that just succeeded.
    pub fn record(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Forget every recorded step.
    pub fn commit(&mut self) {
        self.actions.clear();
    }

    /// Undo every recorded step, newest first.  Returns the number of steps
    /// that could not be undone.
    pub fn rollback(&mut self, log: &dyn Log) -> usize {
        let mut failures = 0;
        while let Some(action) = self.actions.pop() {
            if let Err(e) = action.apply(log) {
                failures += 1;
                log.warn(&format!("rollback step failed: {e}"));
            }
        }
        failures
    }
}
