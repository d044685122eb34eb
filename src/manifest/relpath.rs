//! Normalization of user-supplied relative paths into manifest form.
use std::path::{Component, Path};

use crate::error::{LnkrError, Result};

/// Normalize a user-supplied path into the manifest's POSIX relative form.
///
/// `./a//b/` becomes `a/b`.  Absolute paths, `..` segments and paths that
/// are empty after normalization are rejected.
///
/// # Errors
///
/// Returns [`LnkrError::AbsolutePathRejected`] for absolute input and
/// [`LnkrError::ValidationError`] for `..` segments or an empty path.
pub fn normalize(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if Path::new(trimmed).is_absolute() || trimmed.starts_with('/') {
        return Err(LnkrError::AbsolutePathRejected(trimmed.to_string()));
    }

    let mut parts = Vec::new();
    for segment in trimmed.split(['/', std::path::MAIN_SEPARATOR]) {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(LnkrError::ValidationError(format!(
                    "path must not contain '..': {trimmed}"
                )));
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return Err(LnkrError::ValidationError(format!(
            "path is empty: \"{input}\""
        )));
    }
    Ok(parts.join("/"))
}

/// Express `path` relative to `base` in manifest form.
///
/// # Errors
///
/// Returns [`LnkrError::ValidationError`] if `path` is not below `base`.
pub fn relative_to(path: &Path, base: &Path) -> Result<String> {
    let rest = path.strip_prefix(base).map_err(|_| {
        LnkrError::ValidationError(format!(
            "{} is not inside {}",
            path.display(),
            base.display()
        ))
    })?;
    let parts: Vec<_> = rest
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}
