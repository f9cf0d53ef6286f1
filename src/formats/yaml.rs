use super::{ConfigFormat, ParseError};
use crate::config::ConfigTree;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use tracing::{debug, warn};

/// YAML documents. A non-mapping top level is tolerated and read as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl ConfigFormat for YamlFormat {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extensions(&self) -> &[&'static str] {
        &["yaml", "yml"]
    }

    fn parse(&self, raw: &[u8]) -> Result<ConfigTree, ParseError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        let document: YamlValue = serde_yaml::from_slice(raw)?;
        match yaml_to_json(document) {
            Value::Object(map) => Ok(map),
            Value::Null => {
                debug!("YAML document is empty");
                Ok(Map::new())
            }
            other => {
                warn!(
                    kind = super::kind_of(&other),
                    "YAML top level is not a mapping, ignoring its contents"
                );
                Ok(Map::new())
            }
        }
    }
}

/// Convert a YAML value into the JSON value tree.
///
/// Non-string mapping keys are rendered to strings; tags are dropped.
fn yaml_to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string()))
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(key_to_string(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        other => yaml_to_json(other).to_string(),
    }
}
