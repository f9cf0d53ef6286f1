use super::{ConfigFormat, ParseError, kind_of};
use crate::config::ConfigTree;
use serde_json::Value;

/// Strict JSON. The document must be an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl ConfigFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn parse(&self, raw: &[u8]) -> Result<ConfigTree, ParseError> {
        match serde_json::from_slice::<Value>(raw)? {
            Value::Object(map) => Ok(map),
            other => Err(ParseError::NotAMapping(kind_of(&other))),
        }
    }
}
