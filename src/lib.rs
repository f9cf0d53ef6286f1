//! Layered configuration library.
//!
//! Finds configuration files across a project's directory tree, reads them
//! together with the process environment, merges everything under an
//! explicit precedence order and serves values through dotted paths.
//!
//! ```no_run
//! let config = confstack::build_config(["app.yaml"])?;
//! let port = config.as_int("server.port")?.unwrap_or(8080);
//! # Ok::<(), confstack::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod formats;
pub mod logging;
pub mod paths;
pub mod provider;

pub use config::{ConfigLoader, ConfigPaths, ConfigTree, ENV_MARKER, Source, Target, build_config};
pub use error::{ConfigError, ErrorCode, Result};
pub use provider::{ConfigProvider, Entry, GetOptions};
