//! Turning resolved sources into one merged mapping.

use super::merge::merge_into;
use super::types::{ConfigTree, Source};
use crate::error::{ConfigError, Result};
use crate::formats::FormatRegistry;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Reads sources and merges them with last-wins precedence.
#[derive(Debug, Clone, Default)]
pub struct ConfigAggregator {
    registry: Arc<FormatRegistry>,
}

impl ConfigAggregator {
    pub fn new(registry: Arc<FormatRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// The mapping a single source contributes.
    pub fn extract(&self, source: &Source) -> Result<ConfigTree> {
        match source {
            Source::Env => Ok(env_snapshot()),
            Source::Dict(map) => Ok(map.clone()),
            Source::File(path) => self.read_file(path),
        }
    }

    /// Merge all sources in order. Later sources overwrite earlier ones
    /// key by key at the top level.
    pub fn combine(&self, sources: &[Source]) -> Result<ConfigTree> {
        let mut merged = ConfigTree::new();
        for source in sources {
            let tree = self.extract(source)?;
            debug!(source = %source, keys = tree.len(), "merging configuration source");
            merge_into(&mut merged, tree);
        }
        Ok(merged)
    }

    fn read_file(&self, path: &Path) -> Result<ConfigTree> {
        let format = self
            .registry
            .for_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let raw = std::fs::read(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        format
            .parse(&raw)
            .map_err(|e| ConfigError::malformed(path, e))
    }
}

/// Current process environment as a flat mapping of strings.
///
/// Variables whose name or value is not valid Unicode are left out.
pub fn env_snapshot() -> ConfigTree {
    std::env::vars_os()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let value = value.into_string().ok()?;
            Some((key, Value::String(value)))
        })
        .collect()
}
