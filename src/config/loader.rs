//! Configuration loader with default targets and precedence ordering.
//!
//! Target order, lowest precedence first:
//! 1. **Begin defaults** - every stem in `config, conf, setting, settings,
//!    configuration` with every extension in `json, yaml, ini, cfg, env`
//! 2. **Caller targets** - in the order given
//! 3. **End defaults** - `.env`, `env_file`, then the process environment

use super::files::{DEFAULT_DEPTH_LIMIT, FileLocator};
use super::resolver::SourceResolver;
use super::types::{Source, Target, default_begin_targets, default_end_targets};
use crate::error::Result;
use crate::formats::FormatRegistry;
use crate::provider::ConfigProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Directories the file search works within.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Directory the upward search begins in
    pub start_dir: PathBuf,
    /// Directory the search does not climb above
    pub root_dir: PathBuf,
    /// Maximum number of directories examined
    pub depth_limit: usize,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover paths from the environment and the working directory.
    ///
    /// - `CONFSTACK_START_DIR` - start directory (default: working directory)
    /// - `CONFSTACK_ROOT_DIR` - root directory (default: working directory)
    /// - `CONFSTACK_DEPTH_LIMIT` - directories examined (default: 4)
    pub fn discover() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let start_dir = std::env::var("CONFSTACK_START_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.clone());

        let root_dir = std::env::var("CONFSTACK_ROOT_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(cwd);

        let depth_limit = match std::env::var("CONFSTACK_DEPTH_LIMIT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring invalid CONFSTACK_DEPTH_LIMIT");
                DEFAULT_DEPTH_LIMIT
            }),
            Err(_) => DEFAULT_DEPTH_LIMIT,
        };

        Self {
            start_dir,
            root_dir,
            depth_limit,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(start_dir: impl Into<PathBuf>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            root_dir: root_dir.into(),
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// File locator bounded by these paths.
    pub fn locator(&self) -> FileLocator {
        FileLocator::new(&self.start_dir, &self.root_dir).with_depth_limit(self.depth_limit)
    }
}

/// Builds a [`ConfigProvider`] from targets and the default target lists.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Search bounds for file targets
    pub paths: ConfigPaths,
    targets: Vec<Target>,
    exclude_defaults: bool,
    exclude: Vec<String>,
    raise_on_absent: bool,
    registry: Arc<FormatRegistry>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader with discovered paths and no caller targets.
    pub fn new() -> Self {
        Self::with_paths(ConfigPaths::discover())
    }

    /// Loader with explicit paths.
    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self {
            paths,
            targets: Vec::new(),
            exclude_defaults: false,
            exclude: Vec::new(),
            raise_on_absent: false,
            registry: Arc::new(FormatRegistry::default()),
        }
    }

    /// Replace the search paths.
    pub fn paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Append one caller target.
    pub fn target(mut self, target: impl Into<Target>) -> Self {
        self.targets.push(target.into());
        self
    }

    /// Append caller targets in order.
    pub fn targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Target>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Skip both default target lists.
    pub fn exclude_defaults(mut self, exclude_defaults: bool) -> Self {
        self.exclude_defaults = exclude_defaults;
        self
    }

    /// Leave these entries out of the default target lists.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Make plain `get` lookups fail on absent keys.
    pub fn raise_on_absent(mut self, raise_on_absent: bool) -> Self {
        self.raise_on_absent = raise_on_absent;
        self
    }

    /// Replace the format parsers.
    pub fn registry(mut self, registry: FormatRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Complete target list in precedence order, lowest first.
    pub fn all_targets(&self) -> Vec<Target> {
        if self.exclude_defaults {
            return self.targets.clone();
        }

        let keep = |name: &String| !self.exclude.contains(name);
        let begin = default_begin_targets().into_iter().filter(keep).map(Target::from);
        let end = default_end_targets().into_iter().filter(keep).map(Target::from);

        begin.chain(self.targets.iter().cloned()).chain(end).collect()
    }

    /// Resolver bound to these paths and parsers.
    pub fn resolver(&self) -> SourceResolver {
        SourceResolver::new(self.paths.locator()).with_registry(Arc::clone(&self.registry))
    }

    /// Sources the current filesystem and environment resolve to.
    pub fn sources(&self) -> Vec<Source> {
        self.resolver().resolve_sources(&self.all_targets())
    }

    /// Resolve, read and merge every target.
    pub fn load(&self) -> Result<ConfigProvider> {
        let resolver = self.resolver();
        let targets = self.all_targets();
        debug!(
            targets = targets.len(),
            start_dir = %self.paths.start_dir.display(),
            "loading configuration"
        );
        let tree = resolver.resolve_all(&targets)?;
        Ok(ConfigProvider::with_resolver(tree, resolver).raise_on_absent(self.raise_on_absent))
    }
}

/// Load configuration from `targets` plus the defaults, searching from the
/// working directory.
pub fn build_config<I, T>(targets: I) -> Result<ConfigProvider>
where
    I: IntoIterator<Item = T>,
    T: Into<Target>,
{
    ConfigLoader::new().targets(targets).load()
}
