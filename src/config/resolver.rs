//! Resolving targets into sources.

use super::aggregate::ConfigAggregator;
use super::files::FileLocator;
use super::types::{ConfigTree, Source, Target};
use crate::error::Result;
use crate::formats::FormatRegistry;
use std::sync::Arc;
use tracing::debug;

/// Turns [`Target`]s into [`Source`]s and merged mappings.
///
/// Nothing is cached: every call looks at the filesystem and environment
/// as they are at that moment.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    locator: FileLocator,
    aggregator: ConfigAggregator,
}

impl SourceResolver {
    pub fn new(locator: FileLocator) -> Self {
        Self {
            locator,
            aggregator: ConfigAggregator::default(),
        }
    }

    /// Use a custom set of format parsers.
    pub fn with_registry(mut self, registry: Arc<FormatRegistry>) -> Self {
        self.aggregator = ConfigAggregator::new(registry);
        self
    }

    pub fn locator(&self) -> &FileLocator {
        &self.locator
    }

    pub fn aggregator(&self) -> &ConfigAggregator {
        &self.aggregator
    }

    /// Sources for one target. A file target that matches nothing has no
    /// sources.
    pub fn resolve(&self, target: &Target) -> Vec<Source> {
        let sources: Vec<Source> = match target {
            Target::Env => vec![Source::Env],
            Target::Dict(map) => vec![Source::Dict(map.clone())],
            Target::File(pattern) => self
                .locator
                .find(pattern)
                .into_iter()
                .map(Source::File)
                .collect(),
        };
        debug!(target = %target.label(), count = sources.len(), "resolved target");
        sources
    }

    /// Sources for all targets, in precedence order (lowest first).
    pub fn resolve_sources(&self, targets: &[Target]) -> Vec<Source> {
        targets.iter().flat_map(|t| self.resolve(t)).collect()
    }

    /// Resolve every target in order and merge the result.
    ///
    /// Later targets win over earlier ones; within one file target the file
    /// nearest to the start directory wins.
    pub fn resolve_all(&self, targets: &[Target]) -> Result<ConfigTree> {
        self.aggregator.combine(&self.resolve_sources(targets))
    }
}
