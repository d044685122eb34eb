//! Core logging types: per-entry outcomes and the [`Log`] trait.

/// Outcome of one manifest entry inside a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Relative path of the entry.
    pub path: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of an entry processed by a batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The entry was processed successfully.
    Ok,
    /// The entry was left alone (source missing, target already present).
    Skipped,
    /// Processing the entry failed; the batch continued.
    Failed,
}

/// Abstraction over logging backends.
///
/// Engine operations log through this trait so they stay independent of the
/// global `tracing` subscriber; [`Logger`](super::logger::Logger) is the
/// production implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational (progress) message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record the outcome of one entry for the batch summary.
    fn record(&self, path: &str, status: EntryStatus, message: Option<&str>);
}
