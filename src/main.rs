//! confstack
//!
//! Command-line front end for locating, merging and inspecting layered
//! configuration.

use anyhow::Result;
use clap::Parser;
use confstack::cli::{Cli, Command, DumpArgs, GetArgs, SourcesArgs};
use confstack::format::{
    OutputFormat, format_sources_json, format_sources_markdown, format_tree, format_value,
};
use confstack::logging::{self, LogTarget};
use confstack::provider::GetOptions;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = cli.loader();
    debug!(
        start_dir = %loader.paths.start_dir.display(),
        root_dir = %loader.paths.root_dir.display(),
        depth_limit = loader.paths.depth_limit,
        "search paths"
    );

    match &cli.command {
        Command::Get(GetArgs { key, raw, format }) => {
            let config = loader.load()?;
            let options = if *raw {
                GetOptions::new().raw()
            } else {
                GetOptions::new()
            };
            let entry = config.get_with(key, options.raise_if_absent(true))?;
            let value = entry.map(|e| e.into_value()).unwrap_or_default();
            println!("{}", format_value(&value, *format)?);
        }
        Command::Dump(DumpArgs { format }) => {
            let config = loader.load()?;
            println!("{}", format_tree(config.as_map(), *format)?);
        }
        Command::Sources(SourcesArgs { format }) => {
            let sources = loader.sources();
            let output = match format {
                OutputFormat::Markdown => format_sources_markdown(&sources),
                _ => format_sources_json(&sources)?,
            };
            println!("{output}");
        }
    }

    Ok(())
}
