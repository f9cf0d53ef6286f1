//! Output formatting for configuration trees and source lists.

use crate::config::{ConfigTree, Source};
use crate::convert::render;
use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
}

/// Render a whole configuration tree.
pub fn format_tree(tree: &ConfigTree, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tree)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(tree)?),
        OutputFormat::Markdown => Ok(format_tree_markdown(tree)),
    }
}

/// Render a single looked-up value. Scalars print as plain text.
pub fn format_value(value: &Value, format: OutputFormat) -> Result<String> {
    match value {
        Value::Object(map) => format_tree(map, format),
        Value::Array(_) => match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Markdown => {
                let mut md = String::new();
                push_markdown_value(&mut md, value, 0);
                Ok(md)
            }
        },
        scalar => Ok(render(scalar)),
    }
}

/// Format a configuration tree as a nested markdown list.
pub fn format_tree_markdown(tree: &ConfigTree) -> String {
    let mut md = format!("# Configuration ({} keys)\n\n", tree.len());
    for (key, value) in tree {
        push_markdown_entry(&mut md, key, value, 0);
    }
    md
}

fn push_markdown_entry(md: &mut String, key: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(_) | Value::Array(_) => {
            md.push_str(&format!("{indent}- **{key}**:\n"));
            push_markdown_value(md, value, depth + 1);
        }
        scalar => md.push_str(&format!("{indent}- **{key}**: `{}`\n", render(scalar))),
    }
}

fn push_markdown_value(md: &mut String, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                push_markdown_entry(md, key, child, depth);
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        md.push_str(&format!("{indent}-\n"));
                        push_markdown_value(md, item, depth + 1);
                    }
                    scalar => md.push_str(&format!("{indent}- `{}`\n", render(scalar))),
                }
            }
        }
        scalar => md.push_str(&format!("{indent}- `{}`\n", render(scalar))),
    }
}

/// Format resolved sources as markdown, lowest precedence first.
pub fn format_sources_markdown(sources: &[Source]) -> String {
    let mut md = format!("# Sources ({})\n\n", sources.len());
    for (i, source) in sources.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, source));
    }
    md
}

/// Format resolved sources as JSON objects with `kind` and `path`.
pub fn format_sources_json(sources: &[Source]) -> Result<String> {
    let items: Vec<Value> = sources
        .iter()
        .map(|source| {
            let mut obj = serde_json::Map::new();
            obj.insert("kind".to_string(), Value::String(source.kind().to_string()));
            if let Some(path) = source.path() {
                obj.insert(
                    "path".to_string(),
                    Value::String(path.to_string_lossy().into_owned()),
                );
            }
            Value::Object(obj)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}
