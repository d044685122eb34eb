//! Path variable expansion and contraction for manifest root paths.
//!
//! Roots are stored in the manifest in contracted form (`$HOME/...`,
//! `$LNKR_REMOTE_ROOT/...`) so the file stays portable between machines,
//! and are expanded again when loaded.
use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use super::settings::{SettingKey, Settings};
use crate::error::{LnkrError, Result};

const VAR_HOME: &str = "$HOME";
const VAR_REMOTE_ROOT: &str = "$LNKR_REMOTE_ROOT";
const VAR_LOCAL_ROOT: &str = "$LNKR_LOCAL_ROOT";
const VAR_PWD: &str = "$PWD";

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

#[allow(clippy::expect_used)]
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("variable pattern is valid")
});

/// Expand `{{key}}` placeholders and `$VAR` / `${VAR}` references in `path`,
/// then clean the result lexically.
///
/// Placeholders name a [`SettingKey`] and resolve through `settings`;
/// unknown placeholders are left untouched.  `$PWD`, `$HOME`,
/// `$LNKR_REMOTE_ROOT` and `$LNKR_LOCAL_ROOT` resolve through `settings`
/// as well, any other variable through its environment.
///
/// # Errors
///
/// Returns [`LnkrError::ConfigurationMissing`] if a referenced variable has
/// no value.
pub fn expand(path: &str, settings: &Settings) -> Result<PathBuf> {
    if path.is_empty() {
        return Ok(PathBuf::new());
    }

    let with_placeholders = PLACEHOLDER.replace_all(path, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        caps.get(1)
            .and_then(|m| SettingKey::from_name(m.as_str()))
            .and_then(|key| settings.resolve(key))
            .unwrap_or_else(|| whole.to_string())
    });

    let mut missing: Option<String> = None;
    let expanded = VARIABLE.replace_all(&with_placeholders, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        lookup_variable(name, settings).unwrap_or_else(|| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });

    if let Some(name) = missing {
        return Err(LnkrError::ConfigurationMissing(if name == "LNKR_LOCAL_ROOT" {
            "LNKR_LOCAL_ROOT is not set in environment or config file".to_string()
        } else {
            format!("environment variable \"{name}\" is not set")
        }));
    }

    Ok(clean(Path::new(expanded.as_ref())))
}

fn lookup_variable(name: &str, settings: &Settings) -> Option<String> {
    let value = match name {
        "PWD" => settings
            .cwd()
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| settings.env_var(name)),
        "HOME" => settings
            .env_var(name)
            .or_else(|| settings.home().map(|p| p.to_string_lossy().into_owned())),
        "LNKR_REMOTE_ROOT" => settings.resolve(SettingKey::RemoteRoot),
        "LNKR_LOCAL_ROOT" => settings.resolve(SettingKey::LocalRoot),
        other => settings.env_var(other),
    };
    value.filter(|v| !v.is_empty())
}

/// Replace the longest known prefix of `path` with its variable.
///
/// Candidates are the remote root, the local root, the home directory and
/// the working directory.  A prefix only matches on a whole-component
/// boundary.  Paths that already contain `$` are returned unchanged.
#[must_use]
pub fn contract(path: &Path, settings: &Settings) -> String {
    let raw = path.to_string_lossy();
    if raw.is_empty() || raw.contains('$') {
        return raw.into_owned();
    }

    let candidates = [
        (settings.remote_root(), VAR_REMOTE_ROOT),
        (settings.local_root(), VAR_LOCAL_ROOT),
        (settings.home().map(Path::to_path_buf), VAR_HOME),
        (settings.cwd().map(Path::to_path_buf), VAR_PWD),
    ];

    let target = clean(path);
    let best = candidates
        .iter()
        .filter_map(|(prefix, var)| prefix.as_ref().map(|p| (clean(p), *var)))
        .filter(|(prefix, _)| !prefix.as_os_str().is_empty() && target.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.components().count());

    match best {
        Some((prefix, var)) => match target.strip_prefix(&prefix) {
            Ok(rest) if rest.as_os_str().is_empty() => var.to_string(),
            Ok(rest) => {
                let suffix = rest
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                format!("{var}/{suffix}")
            }
            Err(_) => raw.into_owned(),
        },
        None => raw.into_owned(),
    }
}

/// Lexically normalize `path`: drop `.` components and resolve `..` against
/// preceding normal components, without touching the filesystem.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
