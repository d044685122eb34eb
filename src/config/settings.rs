//! Global settings with `environment > global config file > default`
//! precedence.
//!
//! The engine never reads the process environment directly: a [`Settings`]
//! value is built once at startup (or in a test with an injected
//! environment) and consulted through [`Settings::resolve`].
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::toml_loader;
use crate::error::Result;
use crate::manifest::LinkType;

/// Default exclusion file, relative to the local root.
pub const DEFAULT_GIT_EXCLUDE_PATH: &str = ".git/info/exclude";

/// Default number of trailing working-directory components used to derive
/// the remote directory during `init`.
pub const DEFAULT_REMOTE_DEPTH: usize = 2;

/// A global setting understood by lnkr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Base directory under which remote trees live.
    RemoteRoot,
    /// Base directory used when contracting local paths.
    LocalRoot,
    /// Default link type for `add`.
    LinkType,
    /// Default exclusion file path.
    GitExcludePath,
    /// Number of working-directory components kept for the default remote.
    RemoteDepth,
}

impl SettingKey {
    /// All keys, in documentation order.
    pub const ALL: [Self; 5] = [
        Self::RemoteRoot,
        Self::LocalRoot,
        Self::LinkType,
        Self::GitExcludePath,
        Self::RemoteDepth,
    ];

    /// Key name as used in the global config file and `{{placeholders}}`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RemoteRoot => "remote_root",
            Self::LocalRoot => "local_root",
            Self::LinkType => "link_type",
            Self::GitExcludePath => "git_exclude_path",
            Self::RemoteDepth => "remote_depth",
        }
    }

    /// Environment variable overriding this key.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::RemoteRoot => "LNKR_REMOTE_ROOT",
            Self::LocalRoot => "LNKR_LOCAL_ROOT",
            Self::LinkType => "LNKR_LINK_TYPE",
            Self::GitExcludePath => "LNKR_GIT_EXCLUDE_PATH",
            Self::RemoteDepth => "LNKR_REMOTE_DEPTH",
        }
    }

    /// Look a key up by its file/placeholder name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Contents of `~/.config/lnkr/config.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
struct GlobalFile {
    remote_root: Option<String>,
    local_root: Option<String>,
    link_type: Option<String>,
    git_exclude_path: Option<String>,
    remote_depth: Option<usize>,
}

impl GlobalFile {
    fn get(&self, key: SettingKey) -> Option<String> {
        match key {
            SettingKey::RemoteRoot => self.remote_root.clone(),
            SettingKey::LocalRoot => self.local_root.clone(),
            SettingKey::LinkType => self.link_type.clone(),
            SettingKey::GitExcludePath => self.git_exclude_path.clone(),
            SettingKey::RemoteDepth => self.remote_depth.map(|d| d.to_string()),
        }
        .filter(|v| !v.trim().is_empty())
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolved global settings.
pub struct Settings {
    env: EnvLookup,
    file: GlobalFile,
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("file", &self.file)
            .field("home", &self.home)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Build settings from the real process environment, the global config
    /// file and the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the global config file exists but cannot be read
    /// or parsed.
    pub fn from_env() -> Result<Self> {
        let env: EnvLookup = Box::new(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
        let home = env("HOME")
            .or_else(|| env("USERPROFILE"))
            .map(PathBuf::from);
        let file = match global_config_path(&*env) {
            Some(path) => toml_loader::load_toml(&path)?,
            None => GlobalFile::default(),
        };
        Ok(Self {
            env,
            file,
            home,
            cwd: std::env::current_dir().ok(),
        })
    }

    /// Build settings from an injected environment lookup and optional
    /// global config file contents.
    ///
    /// # Errors
    ///
    /// Returns an error if `file_contents` is not valid TOML.
    pub fn new<F>(
        env: F,
        file_contents: Option<&str>,
        home: Option<PathBuf>,
        cwd: Option<PathBuf>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let file = match file_contents {
            Some(content) => toml_loader::parse_toml(content, Path::new("config.toml"))?,
            None => GlobalFile::default(),
        };
        Ok(Self {
            env: Box::new(env),
            file,
            home,
            cwd,
        })
    }

    /// Settings with an empty environment and no config file, rooted at
    /// `home` and `cwd`.  Handy for tests and embedding.
    #[must_use]
    pub fn isolated(home: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            env: Box::new(|_| None),
            file: GlobalFile::default(),
            home: Some(home.into()),
            cwd: Some(cwd.into()),
        }
    }

    /// Resolve `key`: environment variable, then global config file, then
    /// built-in default.
    #[must_use]
    pub fn resolve(&self, key: SettingKey) -> Option<String> {
        (self.env)(key.env_var())
            .or_else(|| self.file.get(key))
            .or_else(|| self.default_value(key))
    }

    /// Look up an arbitrary environment variable through the injected
    /// environment.
    #[must_use]
    pub fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    fn default_value(&self, key: SettingKey) -> Option<String> {
        match key {
            SettingKey::RemoteRoot => self
                .home
                .as_ref()
                .map(|h| h.join(".config").join("lnkr").to_string_lossy().into_owned()),
            SettingKey::LocalRoot => None,
            SettingKey::LinkType => Some(LinkType::Symbolic.as_str().to_string()),
            SettingKey::GitExcludePath => Some(DEFAULT_GIT_EXCLUDE_PATH.to_string()),
            SettingKey::RemoteDepth => Some(DEFAULT_REMOTE_DEPTH.to_string()),
        }
    }

    /// Base directory for remote trees.
    #[must_use]
    pub fn remote_root(&self) -> Option<PathBuf> {
        self.resolve(SettingKey::RemoteRoot).map(PathBuf::from)
    }

    /// Local root, if configured.
    #[must_use]
    pub fn local_root(&self) -> Option<PathBuf> {
        self.resolve(SettingKey::LocalRoot).map(PathBuf::from)
    }

    /// Default link type.
    ///
    /// # Errors
    ///
    /// Returns [`LnkrError::ValidationError`](crate::error::LnkrError::ValidationError)
    /// if the configured value is not a known link type.
    pub fn link_type(&self) -> Result<LinkType> {
        self.resolve(SettingKey::LinkType)
            .map_or(Ok(LinkType::Symbolic), |v| LinkType::parse(&v))
    }

    /// Default exclusion file path (unexpanded).
    #[must_use]
    pub fn git_exclude_path(&self) -> String {
        self.resolve(SettingKey::GitExcludePath)
            .unwrap_or_else(|| DEFAULT_GIT_EXCLUDE_PATH.to_string())
    }

    /// Remote depth; non-numeric or zero values fall back to the default.
    #[must_use]
    pub fn remote_depth(&self) -> usize {
        self.resolve(SettingKey::RemoteDepth)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&d| d > 0)
            .unwrap_or(DEFAULT_REMOTE_DEPTH)
    }

    /// Home directory, if known.
    #[must_use]
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Working directory captured when the settings were built.
    #[must_use]
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

/// Location of the global config file: `$XDG_CONFIG_HOME/lnkr/config.toml`,
/// falling back to `~/.config/lnkr/config.toml`.
fn global_config_path(env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let base = env("XDG_CONFIG_HOME").map(PathBuf::from).or_else(|| {
        env("HOME")
            .or_else(|| env("USERPROFILE"))
            .map(|h| PathBuf::from(h).join(".config"))
    })?;
    Some(base.join("lnkr").join("config.toml"))
}

/// Derive the default remote directory: the last `depth` components of
/// `cwd` joined onto `base`.
///
/// `depth` is clamped to the number of components available, so
/// `/work/proj` with depth 3 yields `base/work/proj`.
#[must_use]
pub fn default_remote_path(cwd: &Path, base: &Path, depth: usize) -> PathBuf {
    let components: Vec<_> = cwd
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    let start = components.len().saturating_sub(depth);
    components
        .into_iter()
        .skip(start)
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}
