//! Format parsers for configuration files.
//!
//! Every parser fulfils one contract: raw bytes in, a [`ConfigTree`] out.
//! The [`FormatRegistry`] picks a parser from a file's extension, or from
//! its whole name for conventional extensionless files such as `.env`.

mod dotenv;
mod ini;
mod json;
mod yaml;

pub use dotenv::DotenvFormat;
pub use ini::IniFormat;
pub use json::JsonFormat;
pub use yaml::YamlFormat;

use crate::config::ConfigTree;
use std::path::Path;
use thiserror::Error;

/// Error returned when a parser cannot decode its input.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid INI at line {line}: {message}")]
    Ini { line: usize, message: String },

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("top-level value must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// A configuration file format.
pub trait ConfigFormat: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// File extensions handled by this format, without the leading dot.
    fn extensions(&self) -> &[&'static str];

    /// Whole file names handled by this format regardless of extension.
    fn file_names(&self) -> &[&'static str] {
        &[]
    }

    /// Decode raw file contents.
    fn parse(&self, raw: &[u8]) -> Result<ConfigTree, ParseError>;
}

/// Lookup table from file names and extensions to parsers.
pub struct FormatRegistry {
    formats: Vec<Box<dyn ConfigFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
            .with(JsonFormat)
            .with(YamlFormat)
            .with(IniFormat)
            .with(DotenvFormat)
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.formats.iter().map(|fmt| fmt.name()).collect();
        f.debug_struct("FormatRegistry").field("formats", &names).finish()
    }
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Register a format. Later registrations win on conflicting extensions.
    pub fn with(mut self, format: impl ConfigFormat + 'static) -> Self {
        self.formats.push(Box::new(format));
        self
    }

    /// Find the parser responsible for `path`.
    ///
    /// Whole-name aliases are checked before the extension so that `.env`
    /// and `env_file` resolve even though they have no usable extension.
    pub fn for_path(&self, path: &Path) -> Option<&dyn ConfigFormat> {
        let file_name = path.file_name().and_then(|n| n.to_str())?;

        if let Some(format) = self
            .formats
            .iter()
            .rev()
            .find(|f| f.file_names().contains(&file_name))
        {
            return Some(format.as_ref());
        }

        let extension = path.extension().and_then(|e| e.to_str())?.to_lowercase();
        self.formats
            .iter()
            .rev()
            .find(|f| f.extensions().contains(&extension.as_str()))
            .map(|f| f.as_ref())
    }

    /// All extensions known to this registry.
    pub fn extensions(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect()
    }
}

/// Name of a JSON value's type, for diagnostics.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_by_extension() {
        let registry = FormatRegistry::default();
        let cases = [
            ("config.json", "json"),
            ("/a/b/settings.yaml", "yaml"),
            ("conf.yml", "yaml"),
            ("setting.ini", "ini"),
            ("configuration.cfg", "ini"),
            ("config.env", "dotenv"),
            ("CONFIG.JSON", "json"),
        ];
        for (path, expected) in cases {
            let format = registry.for_path(Path::new(path)).unwrap();
            assert_eq!(format.name(), expected, "{path}");
        }
    }

    #[test]
    fn test_registry_by_alias() {
        let registry = FormatRegistry::default();
        assert_eq!(
            registry.for_path(Path::new("/project/.env")).unwrap().name(),
            "dotenv"
        );
        assert_eq!(
            registry.for_path(Path::new("env_file")).unwrap().name(),
            "dotenv"
        );
    }

    #[test]
    fn test_registry_unknown() {
        let registry = FormatRegistry::default();
        assert!(registry.for_path(Path::new("config.toml")).is_none());
        assert!(registry.for_path(Path::new("Makefile")).is_none());
        assert!(FormatRegistry::new().for_path(Path::new("a.json")).is_none());
    }
}
