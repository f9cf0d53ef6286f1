//! Configuration sources and targets.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// The merged configuration mapping.
pub type ConfigTree = Map<String, Value>;

/// Target string that stands for the process environment.
pub const ENV_MARKER: &str = "@env";

/// File name stems tried by default, lowest precedence first.
pub const DEFAULT_STEMS: [&str; 5] = ["config", "conf", "setting", "settings", "configuration"];

/// Extensions combined with [`DEFAULT_STEMS`].
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["json", "yaml", "ini", "cfg", "env"];

/// A user-supplied description of where configuration comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The process environment, snapshotted when resolved.
    Env,
    /// An in-memory mapping.
    Dict(ConfigTree),
    /// A file name, name fragment, or path to look for.
    File(String),
}

impl Target {
    /// Label used when matching against exclusion lists and in logs.
    pub fn label(&self) -> String {
        match self {
            Target::Env => ENV_MARKER.to_string(),
            Target::Dict(map) => format!("<mapping with {} keys>", map.len()),
            Target::File(pattern) => pattern.clone(),
        }
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        if value == ENV_MARKER {
            Target::Env
        } else {
            Target::File(value.to_string())
        }
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Target::from(value.as_str())
    }
}

impl From<&Path> for Target {
    fn from(value: &Path) -> Self {
        Target::File(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Target {
    fn from(value: PathBuf) -> Self {
        Target::from(value.as_path())
    }
}

impl From<ConfigTree> for Target {
    fn from(value: ConfigTree) -> Self {
        Target::Dict(value)
    }
}

/// Tag of a resolved [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Env,
    File,
    Dict,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Env => write!(f, "env"),
            SourceKind::File => write!(f, "file"),
            SourceKind::Dict => write!(f, "dict"),
        }
    }
}

/// A concrete configuration input produced by resolving a [`Target`].
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Env,
    /// Absolute path of an existing file.
    File(PathBuf),
    Dict(ConfigTree),
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Env => SourceKind::Env,
            Source::File(_) => SourceKind::File,
            Source::Dict(_) => SourceKind::Dict,
        }
    }

    /// File path for file sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::File(path) => Some(path),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Env => write!(f, "env"),
            Source::File(path) => write!(f, "file {}", path.display()),
            Source::Dict(map) => write!(f, "dict ({} keys)", map.len()),
        }
    }
}

/// Default targets placed before caller targets: every stem with every extension.
pub fn default_begin_targets() -> Vec<String> {
    DEFAULT_STEMS
        .iter()
        .flat_map(|stem| DEFAULT_EXTENSIONS.iter().map(move |ext| format!("{stem}.{ext}")))
        .collect()
}

/// Default targets placed after caller targets, highest precedence last.
pub fn default_end_targets() -> Vec<String> {
    vec![".env".to_string(), "env_file".to_string(), ENV_MARKER.to_string()]
}
