//! Structured logger with per-entry summary collection.
use std::sync::Mutex;

use super::types::{EntryRecord, EntryStatus, Log};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that forwards messages to `tracing` and collects entry outcomes
/// for the batch summary printed by `link` and `unlink`.
#[derive(Debug, Default)]
pub struct Logger {
    entries: Mutex<Vec<EntryRecord>>,
}

impl Logger {
    /// Create a new logger with no recorded entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "lnkr::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (shown on console only with `--verbose`).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record an entry outcome for the summary.
    pub fn record(&self, path: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(EntryRecord {
                path: path.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the entries recorded with `status`.
    #[must_use]
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries
            .lock()
            .map_or(0, |guard| guard.iter().filter(|e| e.status == status).count())
    }

    /// Print the summary of all recorded entries under a `title` stage.
    pub fn print_summary(&self, title: &str) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage(title);
        for entry in entries.iter().filter(|e| e.status != EntryStatus::Ok) {
            let (icon, color) = match entry.status {
                EntryStatus::Skipped => ("○", "\x1b[33m"),
                _ => ("✗", "\x1b[31m"),
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.path));
        }

        let ok = self.count(EntryStatus::Ok);
        let skipped = self.count(EntryStatus::Skipped);
        let failed = self.count(EntryStatus::Failed);
        self.info(&format!(
            "{} entries: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m",
            entries.len()
        ));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record(&self, path: &str, status: EntryStatus, message: Option<&str>) {
        self.record(path, status, message);
    }
}
