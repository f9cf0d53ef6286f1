use super::{ConfigFormat, ParseError};
use crate::config::ConfigTree;
use serde_json::{Map, Value};

const DEFAULT_SECTION: &str = "DEFAULT";

/// INI and CFG files, keyed by section.
///
/// Each section becomes a mapping of its string values. Keys keep their
/// case. Values declared under `[DEFAULT]` are inherited by every other
/// section unless the section sets the key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniFormat;

impl ConfigFormat for IniFormat {
    fn name(&self) -> &'static str {
        "ini"
    }

    fn extensions(&self) -> &[&'static str] {
        &["ini", "cfg"]
    }

    fn parse(&self, raw: &[u8]) -> Result<ConfigTree, ParseError> {
        let text = std::str::from_utf8(raw)?;
        let sections = parse_sections(text)?;

        let defaults = sections
            .iter()
            .find(|(name, _)| name == DEFAULT_SECTION)
            .map(|(_, values)| values.clone())
            .unwrap_or_default();

        let mut tree = Map::new();
        for (name, values) in sections {
            let mut merged = if name == DEFAULT_SECTION {
                Map::new()
            } else {
                defaults.clone()
            };
            merged.extend(values);
            tree.insert(name, Value::Object(merged));
        }
        Ok(tree)
    }
}

fn parse_sections(text: &str) -> Result<Vec<(String, Map<String, Value>)>, ParseError> {
    let mut sections: Vec<(String, Map<String, Value>)> = Vec::new();
    let mut last_key: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Indented line extends the previous value
        if line.starts_with(char::is_whitespace)
            && let Some(key) = &last_key
            && let Some((_, values)) = sections.last_mut()
            && let Some(Value::String(existing)) = values.get_mut(key)
        {
            existing.push('\n');
            existing.push_str(trimmed);
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.strip_suffix(']').ok_or_else(|| ParseError::Ini {
                line: line_no,
                message: format!("unterminated section header: {trimmed}"),
            })?;
            let name = name.trim().to_string();
            if sections.iter().any(|(existing, _)| *existing == name) {
                return Err(ParseError::Ini {
                    line: line_no,
                    message: format!("duplicate section: {name}"),
                });
            }
            sections.push((name, Map::new()));
            last_key = None;
            continue;
        }

        let Some((_, values)) = sections.last_mut() else {
            return Err(ParseError::Ini {
                line: line_no,
                message: "key defined before any section header".to_string(),
            });
        };

        let split_at = trimmed.find(['=', ':']).ok_or_else(|| ParseError::Ini {
            line: line_no,
            message: format!("expected `key = value`, found: {trimmed}"),
        })?;
        let key = trimmed[..split_at].trim();
        if key.is_empty() {
            return Err(ParseError::Ini {
                line: line_no,
                message: "empty key".to_string(),
            });
        }
        let value = trimmed[split_at + 1..].trim();
        values.insert(key.to_string(), Value::String(value.to_string()));
        last_key = Some(key.to_string());
    }

    Ok(sections)
}
