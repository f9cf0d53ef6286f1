use super::{ConfigFormat, ParseError};
use crate::config::ConfigTree;
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::trace;

static BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?([^\s#=]+)=(.*)$").expect("dotenv pattern is valid")
});

/// `KEY=VALUE` files such as `.env`.
///
/// Surrounding whitespace and one matching pair of quotes are stripped from
/// values, so `KEY=""` is the empty string. Lines that are not bindings
/// (comments, blanks, `KEY=` with nothing after it) are skipped. All values
/// are strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotenvFormat;

impl ConfigFormat for DotenvFormat {
    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn extensions(&self) -> &[&'static str] {
        &["env"]
    }

    fn file_names(&self) -> &[&'static str] {
        &[".env", "env_file"]
    }

    fn parse(&self, raw: &[u8]) -> Result<ConfigTree, ParseError> {
        let text = std::str::from_utf8(raw)?;
        let mut tree = Map::new();
        for (index, line) in text.lines().enumerate() {
            let binding = BINDING
                .captures(line)
                .and_then(|caps| Some((caps.get(1)?.as_str(), unquote(caps.get(2)?.as_str())?)));
            match binding {
                Some((key, value)) => {
                    tree.insert(key.to_string(), Value::String(value.to_string()));
                }
                None => trace!(line = index + 1, "skipping non-binding dotenv line"),
            }
        }
        Ok(tree)
    }
}

/// Trimmed value with one matching pair of quotes removed. A bare empty
/// value is not a binding.
fn unquote(raw: &str) -> Option<&str> {
    let value = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Some(inner);
        }
    }
    (!value.is_empty()).then_some(value)
}
