//! CLI command definitions for confstack
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{ConfigLoader, ConfigPaths};
use crate::format::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Locate, merge and inspect layered configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration target: file name or pattern, or `@env` for the environment.
    /// Repeatable; later targets take precedence.
    #[arg(short = 't', long = "target", global = true)]
    pub targets: Vec<String>,

    /// Do not add the default targets around the given ones
    #[arg(long, global = true)]
    pub no_defaults: bool,

    /// Leave an entry out of the default targets (repeatable)
    #[arg(long, global = true)]
    pub exclude: Vec<String>,

    /// Directory the upward file search begins in (default: working directory)
    #[arg(long, global = true)]
    pub start_dir: Option<PathBuf>,

    /// Directory the file search does not climb above (default: working directory)
    #[arg(long, global = true)]
    pub root_dir: Option<PathBuf>,

    /// Maximum number of directories examined (default: 4)
    #[arg(long, global = true)]
    pub depth: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at a key or dotted path
    Get(GetArgs),

    /// Print the whole merged configuration
    Dump(DumpArgs),

    /// List resolved sources, lowest precedence first
    Sources(SourcesArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Key or dotted path
    pub key: String,

    /// Print the stored value without conversion
    #[arg(long)]
    pub raw: bool,

    /// Output format for mappings and sequences
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct SourcesArgs {
    /// Output format (json or markdown)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

impl Cli {
    /// Search paths from the environment, overridden by command-line options.
    pub fn paths(&self) -> ConfigPaths {
        let mut paths = ConfigPaths::discover();
        if let Some(start) = &self.start_dir {
            paths.start_dir = start.clone();
        }
        if let Some(root) = &self.root_dir {
            paths.root_dir = root.clone();
        }
        if let Some(depth) = self.depth {
            paths.depth_limit = depth;
        }
        paths
    }

    /// Loader for the targets and options given on the command line.
    pub fn loader(&self) -> ConfigLoader {
        ConfigLoader::with_paths(self.paths())
            .targets(self.targets.iter().map(String::as_str))
            .exclude_defaults(self.no_defaults)
            .exclude(self.exclude.iter().cloned())
    }
}
