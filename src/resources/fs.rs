//! File-system helpers shared by the link primitive and the engine.
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IoResultExt as _, LnkrError, Result};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .fs_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether anything (including a dangling symlink) exists at `path`.
#[must_use]
pub fn exists_no_follow(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Move `from` to `to`.
///
/// Tries a rename first and falls back to copy-then-delete when the two
/// paths are on different filesystems.
///
/// # Errors
///
/// Returns [`LnkrError::FileSystemError`] if the move fails.
pub fn move_path(from: &Path, to: &Path) -> Result<()> {
    let context = || format!("move {} to {}", from.display(), to.display());
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            let meta = from.symlink_metadata().fs_context(context)?;
            if meta.is_dir() {
                copy_dir_recursive(from, to)?;
                std::fs::remove_dir_all(from).fs_context(context)
            } else if meta.file_type().is_symlink() {
                copy_symlink(from, to)?;
                std::fs::remove_file(from).fs_context(context)
            } else {
                std::fs::copy(from, to).fs_context(context)?;
                std::fs::remove_file(from).fs_context(context)
            }
        }
        Err(e) => Err(LnkrError::fs(context(), e)),
    }
}

/// Recursively copy a directory tree.  Symlinks are recreated, not
/// followed.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or an entry cannot be
/// copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(src, e))?;
        let Ok(rest) = entry.path().strip_prefix(src) else {
            continue;
        };
        let to = dst.join(rest);
        let kind = entry.file_type();
        if kind.is_dir() {
            std::fs::create_dir_all(&to)
                .fs_context(|| format!("creating directory {}", to.display()))?;
        } else if kind.is_symlink() {
            copy_symlink(entry.path(), &to)?;
        } else {
            std::fs::copy(entry.path(), &to).fs_context(|| {
                format!("copying {} to {}", entry.path().display(), to.display())
            })?;
        }
    }
    Ok(())
}

/// Recreate the symlink `from` at `to` with the same stored destination.
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let dest = std::fs::read_link(from).fs_context(|| format!("read link {}", from.display()))?;
    super::link::create_symlink(&dest, to)
        .fs_context(|| format!("copying link {} to {}", from.display(), to.display()))
}

fn walk_error(root: &Path, e: walkdir::Error) -> LnkrError {
    LnkrError::fs(format!("walk {}", root.display()), e.into())
}

/// Remove empty directories from the parent of `start` upwards, stopping at
/// (and never removing) `stop_at`.
///
/// Stops silently at the first directory that is not empty or cannot be
/// removed.
pub fn remove_empty_parents(start: &Path, stop_at: &Path) {
    let mut current = start.parent();
    while let Some(dir) = current {
        if dir == stop_at || !dir.starts_with(stop_at) {
            break;
        }
        let is_empty = std::fs::read_dir(dir).is_ok_and(|mut it| it.next().is_none());
        if !is_empty || std::fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}

/// Every non-directory below `root`, in file-name order.
///
/// # Errors
///
/// Returns [`LnkrError::FileSystemError`] if the tree cannot be walked.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Every directory strictly below `root`, parents before children.
///
/// # Errors
///
/// Returns [`LnkrError::FileSystemError`] if the tree cannot be walked.
pub fn walk_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("a.txt"), b"aaa").unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub/b.txt"), b"bbb").unwrap();

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(std::fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
    }

    #[cfg(unix)]
    #[test]
    fn copies_symlinks_as_symlinks() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        std::fs::write(elsewhere.path().join("big"), b"payload").unwrap();
        std::os::unix::fs::symlink(elsewhere.path(), src.path().join("dir-link")).unwrap();
        std::os::unix::fs::symlink("missing", src.path().join("dangling")).unwrap();

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(
            std::fs::read_link(target.join("dir-link")).unwrap(),
            elsewhere.path()
        );
        assert_eq!(
            std::fs::read_link(target.join("dangling")).unwrap(),
            PathBuf::from("missing")
        );
        assert!(!target.join("dir-link").symlink_metadata().unwrap().is_dir());
    }

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").exists());
    }

    #[test]
    fn move_path_moves_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), b"x").unwrap();
        std::fs::create_dir_all(dir.path().join("d/sub")).unwrap();

        move_path(&dir.path().join("f"), &dir.path().join("g")).unwrap();
        move_path(&dir.path().join("d"), &dir.path().join("e")).unwrap();

        assert!(!dir.path().join("f").exists());
        assert_eq!(std::fs::read(dir.path().join("g")).unwrap(), b"x");
        assert!(dir.path().join("e/sub").is_dir());
    }

    #[test]
    fn move_path_missing_source_is_fs_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_path(&dir.path().join("nope"), &dir.path().join("x")).unwrap_err();
        assert!(matches!(err, LnkrError::FileSystemError { .. }));
    }

    #[test]
    fn remove_empty_parents_stops_at_root_and_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("keep/a/b")).unwrap();
        std::fs::write(root.join("keep/other.txt"), b"x").unwrap();

        remove_empty_parents(&root.join("keep/a/b/file.txt"), &root);

        assert!(!root.join("keep/a").exists());
        assert!(root.join("keep").is_dir());
        assert!(root.is_dir());
    }

    #[test]
    fn remove_empty_parents_never_removes_stop_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("a")).unwrap();
        remove_empty_parents(&root.join("a/file.txt"), &root);
        assert!(!root.join("a").exists());
        assert!(root.is_dir());
    }

    #[test]
    fn walk_files_lists_only_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), b"").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), b"").unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub/c.txt")
            ]
        );
    }

    #[test]
    fn walk_dirs_lists_parents_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let dirs = walk_dirs(dir.path()).unwrap();
        assert_eq!(dirs, vec![dir.path().join("a"), dir.path().join("a/b")]);
    }

    #[test]
    fn exists_no_follow_sees_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir.path().join("missing"), &link).unwrap();
        #[cfg(unix)]
        assert!(exists_no_follow(&link));
        assert!(!exists_no_follow(&dir.path().join("nothing")));
    }
}
