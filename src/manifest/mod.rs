//! Manifest data model: link types, link entries and the manifest itself.
pub mod relpath;
pub mod store;

pub use store::{ManifestStore, TomlManifestStore};

use std::fmt;
use std::str::FromStr;

use crate::error::{LnkrError, Result};

/// File name of the per-directory manifest.
pub const MANIFEST_FILE_NAME: &str = ".lnkr.toml";

/// Kind of filesystem link used for an entry.
///
/// # Examples
///
/// ```
/// use lnkr::manifest::LinkType;
///
/// assert_eq!(LinkType::parse("symbolic").unwrap(), LinkType::Symbolic);
/// assert_eq!(LinkType::Hard.toggled(), LinkType::Symbolic);
/// assert_eq!(LinkType::Symbolic.to_string(), "sym");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkType {
    /// Hard link sharing the inode of the remote file. Files only.
    Hard,
    /// Symbolic link storing the absolute remote path.
    Symbolic,
}

impl LinkType {
    /// Parse a user or manifest value.  Accepts `hard`, `sym` and
    /// `symbolic`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`LnkrError::ValidationError`] for any other value.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "sym" | "symbolic" => Ok(Self::Symbolic),
            _ => Err(LnkrError::invalid_link_type(value)),
        }
    }

    /// Persisted form (`"hard"` or `"sym"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Symbolic => "sym",
        }
    }

    /// The other link type.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Hard => Self::Symbolic,
            Self::Symbolic => Self::Hard,
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = LnkrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One tracked path and the kind of link that represents it locally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkEntry {
    /// POSIX-style path relative to both roots.
    pub path: String,
    /// Link kind.
    pub link_type: LinkType,
}

impl LinkEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(path: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            path: path.into(),
            link_type,
        }
    }
}

/// In-memory manifest.
///
/// Roots are kept exactly as stored (possibly containing `$VAR`
/// references); callers expand them through
/// [`config::pathvar`](crate::config::pathvar).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Local root, unexpanded.
    pub local: String,
    /// Remote root, unexpanded.
    pub remote: String,
    /// Default link type for new entries, if set.
    pub link_type: Option<LinkType>,
    /// Exclusion file override, if set.
    pub git_exclude_path: Option<String>,
    /// Tracked entries.
    pub entries: Vec<LinkEntry>,
}

impl Manifest {
    /// Sort entries by path and drop duplicate paths (first occurrence wins).
    pub fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
        self.entries.dedup_by(|later, earlier| later.path == earlier.path);
    }

    /// Entry with exactly `path`, if tracked.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&LinkEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Whether `path` is tracked exactly.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Index of the entry with exactly `path`.
    #[must_use]
    pub fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    /// Entries strictly nested under `path`.
    #[must_use]
    pub fn nested_under(&self, path: &str) -> Vec<&LinkEntry> {
        self.entries
            .iter()
            .filter(|e| e.path != path && is_same_or_nested(&e.path, path))
            .collect()
    }

    /// All tracked paths in stored order.
    #[must_use]
    pub fn entry_paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

/// Whether `candidate` equals `path` or lies below it on a `/` boundary.
///
/// ```
/// use lnkr::manifest::is_same_or_nested;
///
/// assert!(is_same_or_nested("proj/a.txt", "proj"));
/// assert!(!is_same_or_nested("project/a.txt", "proj"));
/// ```
#[must_use]
pub fn is_same_or_nested(candidate: &str, path: &str) -> bool {
    candidate == path
        || candidate
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}
