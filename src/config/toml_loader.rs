//! TOML file loading shared by the global settings file and the manifest.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{IoResultExt as _, LnkrError, Result};

/// Deserialize a TOML file into `T`.
///
/// A missing or blank file yields `T::default()` so first runs work without
/// any file on disk.
///
/// # Errors
///
/// Returns [`LnkrError::FileSystemError`] if the file exists but cannot be
/// read, and [`LnkrError::Parse`] if it is not valid TOML for `T`.
pub fn load_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .fs_context(|| format!("read {}", path.display()))?;
    parse_toml(&content, path)
}

/// Deserialize TOML `content`; `origin` is only used for error messages.
///
/// # Errors
///
/// Returns [`LnkrError::Parse`] if `content` is not valid TOML for `T`.
pub fn parse_toml<T: DeserializeOwned + Default>(content: &str, origin: &Path) -> Result<T> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    toml::from_str(content).map_err(|e| LnkrError::Parse {
        path: origin.to_path_buf(),
        message: e.message().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    struct Sample {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Sample = load_toml(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn blank_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.toml");
        std::fs::write(&path, "\n  \n").unwrap();
        let loaded: Sample = load_toml(&path).unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn parses_fields() {
        let loaded: Sample = parse_toml("name = \"x\"", Path::new("inline")).unwrap();
        assert_eq!(loaded.name, "x");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = parse_toml::<Sample>("name = ", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, LnkrError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
