//! Link primitive: create, remove and inspect a single hard or symbolic link.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt as _, LnkrError, Result};
use crate::logging::Log;
use crate::manifest::{LinkEntry, LinkType};

/// Create a link at `target` pointing to `source`.
///
/// Symbolic links store `source` verbatim, so callers pass an absolute
/// path.  Hard links are rejected for directories.
///
/// # Errors
///
/// Returns [`LnkrError::UnsupportedOperation`] for a hard link to a
/// directory and [`LnkrError::FileSystemError`] if the OS call fails.
pub fn create_link(source: &Path, target: &Path, link_type: LinkType, log: &dyn Log) -> Result<()> {
    match link_type {
        LinkType::Hard => {
            if source.is_dir() {
                return Err(LnkrError::UnsupportedOperation {
                    operation: "hard link".to_string(),
                    path: source.to_path_buf(),
                });
            }
            std::fs::hard_link(source, target).fs_context(|| {
                format!(
                    "create hard link {} -> {}",
                    target.display(),
                    source.display()
                )
            })?;
            log.info(&format!(
                "Created hard link: {} -> {}",
                target.display(),
                source.display()
            ));
        }
        LinkType::Symbolic => {
            create_symlink(source, target).fs_context(|| {
                format!(
                    "create symbolic link {} -> {}",
                    target.display(),
                    source.display()
                )
            })?;
            log.info(&format!(
                "Created symbolic link: {} -> {}",
                target.display(),
                source.display()
            ));
        }
    }
    Ok(())
}

pub(super) fn create_symlink(source: &Path, target: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, target)
    }

    #[cfg(windows)]
    {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(source, target)
        } else {
            std::os::windows::fs::symlink_file(source, target)
        }
    }
}

/// Remove a symbolic link (file or directory link) without following it.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read or the link cannot be
/// removed.
pub fn remove_symlink(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .fs_context(|| format!("reading metadata: {}", path.display()))?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
    .fs_context(|| format!("remove symbolic link: {}", path.display()))
}

/// Check if metadata represents a directory-like entry.
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory symlinks,
/// so we check the raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Result of checking one link against the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// The link exists and points at the expected remote object.
    Linked,
    /// Nothing exists at the local path.
    LinkNotFound,
    /// Symbolic entry, but the local object is not a symlink.
    NotSymlink,
    /// The remote object (or link destination) is missing.
    TargetNotFound,
    /// The symlink points somewhere else.
    WrongTarget {
        /// Stored link destination.
        actual: PathBuf,
        /// Expected remote path.
        expected: PathBuf,
    },
    /// Hard entry, but the local object is a directory.
    HardLinkDirectory,
    /// Hard entry whose local and remote inodes differ.
    DifferentInodes,
    /// Inspection failed for another reason.
    Unknown(String),
}

impl LinkState {
    /// Whether the link is healthy.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        matches!(self, Self::Linked)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked => f.write_str("LINKED"),
            Self::LinkNotFound => f.write_str("LINK NOT FOUND"),
            Self::NotSymlink => f.write_str("Not a symbolic link"),
            Self::TargetNotFound => f.write_str("TARGET NOT FOUND"),
            Self::WrongTarget { actual, expected } => write!(
                f,
                "Wrong target: {} (expected: {})",
                actual.display(),
                expected.display()
            ),
            Self::HardLinkDirectory => f.write_str("Hard links cannot be created for directories"),
            Self::DifferentInodes => f.write_str("Not a hard link (different inodes)"),
            Self::Unknown(reason) => f.write_str(reason),
        }
    }
}

/// One manifest entry resolved to absolute paths.
#[derive(Debug, Clone)]
pub struct LinkResource {
    /// Remote object (what the link points to).
    pub source: PathBuf,
    /// Local link location.
    pub target: PathBuf,
    /// Link kind.
    pub link_type: LinkType,
}

impl LinkResource {
    /// Create a link resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, link_type: LinkType) -> Self {
        Self {
            source,
            target,
            link_type,
        }
    }

    /// Resolve `entry` against the local and remote roots.
    #[must_use]
    pub fn for_entry(entry: &LinkEntry, local_root: &Path, remote_root: &Path) -> Self {
        Self::new(
            remote_root.join(&entry.path),
            local_root.join(&entry.path),
            entry.link_type,
        )
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    /// Create the link.
    ///
    /// # Errors
    ///
    /// See [`create_link`].
    pub fn create(&self, log: &dyn Log) -> Result<()> {
        create_link(&self.source, &self.target, self.link_type, log)
    }

    /// Remove the local artifact.  A missing artifact is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`LnkrError::IntegrityError`] if the local object is not the
    /// kind of artifact the entry expects, and
    /// [`LnkrError::FileSystemError`] if removal fails.
    pub fn remove_artifact(&self, log: &dyn Log) -> Result<()> {
        let Ok(meta) = self.target.symlink_metadata() else {
            return Ok(());
        };
        match self.link_type {
            LinkType::Hard => {
                if meta.is_dir() {
                    return Err(LnkrError::IntegrityError(format!(
                        "expected hard link at {} but found directory",
                        self.target.display()
                    )));
                }
                std::fs::remove_file(&self.target)
                    .fs_context(|| format!("remove hard link at {}", self.target.display()))?;
            }
            LinkType::Symbolic => {
                if !meta.file_type().is_symlink() {
                    return Err(LnkrError::IntegrityError(format!(
                        "expected symbolic link at {} but found regular file",
                        self.target.display()
                    )));
                }
                remove_symlink(&self.target)?;
            }
        }
        log.debug(&format!("removed link: {}", self.target.display()));
        Ok(())
    }

    /// Compare the local artifact with what the entry expects.
    #[must_use]
    pub fn state(&self) -> LinkState {
        let Ok(local_meta) = self.target.symlink_metadata() else {
            return LinkState::LinkNotFound;
        };

        match self.link_type {
            LinkType::Symbolic => {
                if !local_meta.file_type().is_symlink() {
                    return LinkState::NotSymlink;
                }
                let Ok(actual) = std::fs::read_link(&self.target) else {
                    return LinkState::TargetNotFound;
                };
                if !actual.exists() {
                    return LinkState::TargetNotFound;
                }
                if actual != self.source {
                    return LinkState::WrongTarget {
                        actual,
                        expected: self.source.clone(),
                    };
                }
                LinkState::Linked
            }
            LinkType::Hard => {
                if local_meta.is_dir() {
                    return LinkState::HardLinkDirectory;
                }
                let remote_meta = match std::fs::metadata(&self.source) {
                    Ok(meta) => meta,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return LinkState::TargetNotFound;
                    }
                    Err(e) => return LinkState::Unknown(format!("Cannot access target file: {e}")),
                };
                match (inode(&local_meta), inode(&remote_meta)) {
                    (Some(a), Some(b)) if a == b => LinkState::Linked,
                    (Some(_), Some(_)) => LinkState::DifferentInodes,
                    _ => LinkState::Unknown("Cannot determine inode numbers".to_string()),
                }
            }
        }
    }
}

#[cfg(unix)]
fn inode(meta: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
const fn inode(_meta: &std::fs::Metadata) -> Option<u64> {
    None
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local");
        let remote = dir.path().join("remote");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::create_dir_all(&remote).unwrap();
        (dir, local, remote)
    }

    #[test]
    fn symbolic_link_stores_absolute_source() {
        let (_dir, local, remote) = setup();
        std::fs::write(remote.join("a.txt"), b"x").unwrap();
        let log = RecordingLog::default();

        create_link(&remote.join("a.txt"), &local.join("a.txt"), LinkType::Symbolic, &log).unwrap();

        assert_eq!(std::fs::read_link(local.join("a.txt")).unwrap(), remote.join("a.txt"));
        assert!(log.messages("info")[0].starts_with("Created symbolic link: "));
    }

    #[test]
    fn hard_link_shares_inode() {
        use std::os::unix::fs::MetadataExt;
        let (_dir, local, remote) = setup();
        std::fs::write(remote.join("a.txt"), b"x").unwrap();
        let log = RecordingLog::default();

        create_link(&remote.join("a.txt"), &local.join("a.txt"), LinkType::Hard, &log).unwrap();

        let a = std::fs::metadata(local.join("a.txt")).unwrap().ino();
        let b = std::fs::metadata(remote.join("a.txt")).unwrap().ino();
        assert_eq!(a, b);
        assert!(log.messages("info")[0].starts_with("Created hard link: "));
    }

    #[test]
    fn hard_link_to_directory_is_unsupported() {
        let (_dir, local, remote) = setup();
        std::fs::create_dir(remote.join("d")).unwrap();
        let err = create_link(
            &remote.join("d"),
            &local.join("d"),
            LinkType::Hard,
            &RecordingLog::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LnkrError::UnsupportedOperation { .. }));
    }

    #[test]
    fn existing_target_is_fs_error() {
        let (_dir, local, remote) = setup();
        std::fs::write(remote.join("a.txt"), b"x").unwrap();
        std::fs::write(local.join("a.txt"), b"y").unwrap();
        let err = create_link(
            &remote.join("a.txt"),
            &local.join("a.txt"),
            LinkType::Symbolic,
            &RecordingLog::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LnkrError::FileSystemError { .. }));
    }

    #[test]
    fn state_reports_each_condition() {
        let (_dir, local, remote) = setup();
        let entry = LinkEntry::new("a.txt", LinkType::Symbolic);
        let res = LinkResource::for_entry(&entry, &local, &remote);
        assert_eq!(res.state(), LinkState::LinkNotFound);

        std::fs::write(local.join("a.txt"), b"plain").unwrap();
        assert_eq!(res.state(), LinkState::NotSymlink);
        std::fs::remove_file(local.join("a.txt")).unwrap();

        std::os::unix::fs::symlink(remote.join("a.txt"), local.join("a.txt")).unwrap();
        assert_eq!(res.state(), LinkState::TargetNotFound);

        std::fs::write(remote.join("a.txt"), b"x").unwrap();
        assert_eq!(res.state(), LinkState::Linked);
    }

    #[test]
    fn state_reports_wrong_target() {
        let (_dir, local, remote) = setup();
        std::fs::write(remote.join("other.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(remote.join("other.txt"), local.join("a.txt")).unwrap();

        let res = LinkResource::for_entry(&LinkEntry::new("a.txt", LinkType::Symbolic), &local, &remote);
        let state = res.state();
        assert_eq!(
            state.to_string(),
            format!(
                "Wrong target: {} (expected: {})",
                remote.join("other.txt").display(),
                remote.join("a.txt").display()
            )
        );
    }

    #[test]
    fn hard_state_compares_inodes() {
        let (_dir, local, remote) = setup();
        std::fs::write(remote.join("a.txt"), b"x").unwrap();
        std::fs::write(local.join("a.txt"), b"x").unwrap();
        let res = LinkResource::for_entry(&LinkEntry::new("a.txt", LinkType::Hard), &local, &remote);
        assert_eq!(res.state(), LinkState::DifferentInodes);

        std::fs::remove_file(local.join("a.txt")).unwrap();
        std::fs::hard_link(remote.join("a.txt"), local.join("a.txt")).unwrap();
        assert_eq!(res.state(), LinkState::Linked);
    }

    #[test]
    fn hard_state_rejects_directory() {
        let (_dir, local, remote) = setup();
        std::fs::create_dir(local.join("d")).unwrap();
        let res = LinkResource::for_entry(&LinkEntry::new("d", LinkType::Hard), &local, &remote);
        assert_eq!(res.state(), LinkState::HardLinkDirectory);
    }

    #[test]
    fn remove_artifact_rejects_regular_file_for_symbolic() {
        let (_dir, local, remote) = setup();
        std::fs::write(local.join("a.txt"), b"x").unwrap();
        let res = LinkResource::for_entry(&LinkEntry::new("a.txt", LinkType::Symbolic), &local, &remote);
        let err = res.remove_artifact(&RecordingLog::default()).unwrap_err();
        assert!(matches!(err, LnkrError::IntegrityError(_)));
        assert!(local.join("a.txt").exists());
    }

    #[test]
    fn remove_artifact_tolerates_missing() {
        let (_dir, local, remote) = setup();
        let res = LinkResource::for_entry(&LinkEntry::new("a.txt", LinkType::Hard), &local, &remote);
        res.remove_artifact(&RecordingLog::default()).unwrap();
    }

    #[test]
    fn remove_artifact_removes_directory_symlink_only() {
        let (_dir, local, remote) = setup();
        std::fs::create_dir(remote.join("d")).unwrap();
        std::fs::write(remote.join("d/f"), b"x").unwrap();
        std::os::unix::fs::symlink(remote.join("d"), local.join("d")).unwrap();

        let res = LinkResource::for_entry(&LinkEntry::new("d", LinkType::Symbolic), &local, &remote);
        res.remove_artifact(&RecordingLog::default()).unwrap();

        assert!(local.join("d").symlink_metadata().is_err());
        assert!(remote.join("d/f").exists());
    }
}
