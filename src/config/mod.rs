//! Layered configuration resolution.
//!
//! Combines configuration from targets in precedence order, lowest first:
//! 1. **Begin defaults** - `config.json`, `conf.yaml`, `settings.ini`, ...
//! 2. **Caller targets** - file names or patterns, mappings, `@env`
//! 3. **End defaults** - `.env`, `env_file`, then the process environment
//!
//! ## Merge Strategy
//! - Shallow, last-wins per top-level key; nested mappings are replaced whole
//! - Within one file target, the file nearest the start directory wins
//!
//! ## Environment Variables
//! - `CONFSTACK_START_DIR` - Directory the upward search begins in
//! - `CONFSTACK_ROOT_DIR` - Directory the search stops at
//! - `CONFSTACK_DEPTH_LIMIT` - Number of directories examined (default: 4)

mod aggregate;
mod files;
mod loader;
mod merge;
mod resolver;
mod types;

pub use aggregate::{ConfigAggregator, env_snapshot};
pub use files::{DEFAULT_DEPTH_LIMIT, FileLocator, find_files};
pub use loader::{ConfigLoader, ConfigPaths, build_config};
pub use merge::{merge_all, merge_into};
pub use resolver::SourceResolver;
pub use types::*;
