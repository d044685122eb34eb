//! Domain-specific error types for the link lifecycle engine.
//!
//! Engine code returns [`LnkrError`] through the [`Result`] alias.  Command
//! handlers at the CLI boundary convert it to [`anyhow::Error`] via the
//! standard `?` operator and attach command-level context there.
//!
//! # Taxonomy
//!
//! ```text
//! LnkrError
//! ├── ConfigurationMissing  a required root or variable is unset
//! ├── PathNotFound          expected filesystem object absent
//! ├── AbsolutePathRejected  relative path required
//! ├── InvalidCombination    disallowed flag/type combination
//! ├── ValidationError       malformed user or manifest value
//! ├── FileSystemError       underlying OS operation failed
//! ├── IntegrityError        filesystem contradicts the manifest
//! ├── UnsupportedOperation  primitive cannot act on this object
//! └── Parse                 manifest or settings file is not valid TOML
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T, E = LnkrError> = std::result::Result<T, E>;

/// Errors raised by the link lifecycle engine.
#[derive(Error, Debug)]
pub enum LnkrError {
    /// A required root path or variable has no value.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// An expected filesystem object does not exist.
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The user supplied an absolute path where a relative one is required.
    #[error("absolute path is not allowed: {0}. Please use a relative path")]
    AbsolutePathRejected(String),

    /// A flag or link-type combination is not allowed.
    #[error("invalid combination: {0}")]
    InvalidCombination(String),

    /// A value could not be interpreted (unknown link type, malformed path).
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// An underlying OS operation failed.
    #[error("{context}: {source}")]
    FileSystemError {
        /// What the engine was doing when the operation failed.
        context: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The filesystem state contradicts what the manifest expects.
    #[error("integrity error: {0}")]
    IntegrityError(String),

    /// The link primitive cannot be applied to this kind of object.
    #[error("operation '{operation}' is not supported for '{}'", path.display())]
    UnsupportedOperation {
        /// Name of the rejected operation (e.g. `"hard link"`).
        operation: String,
        /// Object the operation was attempted on.
        path: PathBuf,
    },

    /// A TOML document could not be read or written.
    #[error("invalid TOML in {}: {message}", path.display())]
    Parse {
        /// File being parsed or written.
        path: PathBuf,
        /// Parser or serializer message.
        message: String,
    },
}

impl LnkrError {
    /// Build a [`LnkrError::FileSystemError`] from an I/O error.
    pub fn fs(context: impl Into<String>, source: io::Error) -> Self {
        Self::FileSystemError {
            context: context.into(),
            source,
        }
    }

    /// Build a [`LnkrError::ValidationError`] for an unrecognised link type.
    pub fn invalid_link_type(value: &str) -> Self {
        Self::ValidationError(format!(
            "invalid link type \"{value}\": expected \"hard\" or \"sym\""
        ))
    }
}

/// Attach a human-readable context to an [`io::Result`], turning it into a
/// [`LnkrError::FileSystemError`].
pub trait IoResultExt<T> {
    /// Convert the error side, computing the context lazily.
    ///
    /// # Errors
    ///
    /// Returns [`LnkrError::FileSystemError`] when `self` is an error.
    fn fs_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn fs_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| LnkrError::fs(context(), source))
    }
}
