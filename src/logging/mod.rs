//! Logging infrastructure: the [`Log`] trait used by the engine, the
//! [`Logger`] that forwards to `tracing`, and console subscriber setup.

mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{EntryRecord, EntryStatus, Log};

/// In-memory [`Log`] that keeps every message, for asserting on warnings in
/// unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    lines: std::sync::Mutex<Vec<(&'static str, String)>>,
    records: std::sync::Mutex<Vec<EntryRecord>>,
}

#[cfg(test)]
impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push((level, msg.to_string()));
        }
    }

    /// Messages logged at `level` (`"info"`, `"warn"`, ...).
    pub(crate) fn messages(&self, level: &str) -> Vec<String> {
        self.lines.lock().map_or_else(
            |_| Vec::new(),
            |g| {
                g.iter()
                    .filter(|(l, _)| *l == level)
                    .map(|(_, m)| m.clone())
                    .collect()
            },
        )
    }

    /// Entry outcomes recorded so far.
    pub(crate) fn records(&self) -> Vec<EntryRecord> {
        self.records.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record(&self, path: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(EntryRecord {
                path: path.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
