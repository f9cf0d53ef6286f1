//! Value coercion strategies.
//!
//! A [`Converter`] turns a raw configuration value into another value. In
//! safe mode a failed conversion yields `null`; in strict mode it returns a
//! [`ConversionError`].

pub mod literal;

use crate::error::ConversionError;
use serde_json::{Map, Number, Value};

/// Coerces raw configuration values.
pub trait Converter: Send + Sync {
    /// Convert `value`. With `safe` set, failures produce `Value::Null`
    /// instead of an error.
    fn cast(&self, value: &Value, safe: bool) -> Result<Value, ConversionError>;
}

/// Target of a [`SimpleConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Bool,
    Str,
    List,
    Dict,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Str => "string",
            ValueType::List => "list",
            ValueType::Dict => "dict",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ValueType::Int => value.is_i64() || value.is_u64(),
            ValueType::Float => value.is_f64(),
            ValueType::Bool => value.is_boolean(),
            ValueType::Str => value.is_string(),
            ValueType::List => value.is_array(),
            ValueType::Dict => value.is_object(),
        }
    }
}

/// Identity for values already of the target type, otherwise the target
/// type's constructor semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleConverter {
    target: ValueType,
}

impl SimpleConverter {
    pub fn new(target: ValueType) -> Self {
        Self { target }
    }

    pub fn target(&self) -> ValueType {
        self.target
    }

    fn construct(&self, value: &Value) -> Result<Value, String> {
        match self.target {
            ValueType::Int => to_int(value).map(Value::from),
            ValueType::Float => to_float(value).and_then(|f| {
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| "not a finite number".to_string())
            }),
            ValueType::Bool => Ok(Value::Bool(truthy(value))),
            ValueType::Str => Ok(Value::String(render(value))),
            ValueType::List => to_list(value).map(Value::Array),
            ValueType::Dict => to_dict(value).map(Value::Object),
        }
    }
}

impl Converter for SimpleConverter {
    fn cast(&self, value: &Value, safe: bool) -> Result<Value, ConversionError> {
        if self.target.matches(value) {
            return Ok(value.clone());
        }
        match self.construct(value) {
            Ok(converted) => Ok(converted),
            Err(_) if safe => Ok(Value::Null),
            Err(reason) => Err(ConversionError::new(value.to_string(), self.target.name(), reason)),
        }
    }
}

/// Interprets strings with the literal grammar in [`literal`].
///
/// Non-string values pass through unchanged. With `empty_as` set, the empty
/// string maps to that value instead of being parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PythonicConverter {
    empty_as: Option<Value>,
}

impl PythonicConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty_as(value: Value) -> Self {
        Self {
            empty_as: Some(value),
        }
    }
}

impl Converter for PythonicConverter {
    fn cast(&self, value: &Value, safe: bool) -> Result<Value, ConversionError> {
        let Value::String(text) = value else {
            return Ok(value.clone());
        };
        if text.is_empty()
            && let Some(empty) = &self.empty_as
        {
            return Ok(empty.clone());
        }
        match literal::parse(text) {
            Ok(parsed) => Ok(parsed.into_value()),
            Err(_) if safe => Ok(Value::Null),
            Err(err) => Err(ConversionError::new(value.to_string(), "literal", err.to_string())),
        }
    }
}

/// Default accessor conversion.
///
/// Strings that parse as literals become the parsed value; any other
/// string is returned unchanged. Non-string values pass through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniversalConverter;

impl Converter for UniversalConverter {
    fn cast(&self, value: &Value, safe: bool) -> Result<Value, ConversionError> {
        if !value.is_string() {
            return Ok(value.clone());
        }
        match PythonicConverter::new().cast(value, false) {
            Ok(parsed) => Ok(parsed),
            Err(_) if safe => Ok(value.clone()),
            Err(err) => Err(err),
        }
    }
}

/// Word-table boolean conversion.
///
/// `yes`, `true`, `1`, `on` are true and `no`, `false`, `0`, `off` are
/// false, ignoring case and surrounding whitespace. Other non-empty strings
/// are true, the empty string is false, and non-strings use truthiness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolConverter;

impl BoolConverter {
    pub fn word(text: &str) -> bool {
        let normalized = text.trim().to_lowercase();
        match normalized.as_str() {
            "yes" | "true" | "1" | "on" => true,
            "no" | "false" | "0" | "off" => false,
            other => !other.is_empty(),
        }
    }
}

impl Converter for BoolConverter {
    fn cast(&self, value: &Value, _safe: bool) -> Result<Value, ConversionError> {
        Ok(Value::Bool(match value {
            Value::String(text) => BoolConverter::word(text),
            other => truthy(other),
        }))
    }
}

/// Generic truthiness: null, false, zero and empty containers are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Plain text form of a value: strings as-is, everything else as JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_int(value: &Value) -> Result<i64, String> {
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            let f = n.as_f64().unwrap_or(f64::NAN);
            if f.is_finite() && f.abs() < i64::MAX as f64 {
                Ok(f.trunc() as i64)
            } else {
                Err(format!("{n} is out of range"))
            }
        }
        Value::String(s) => {
            let digits = s.trim().replace('_', "");
            digits
                .parse::<i64>()
                .map_err(|e| format!("invalid integer {s:?}: {e}"))
        }
        other => Err(format!("{} has no integer form", crate::formats::kind_of(other))),
    }
}

fn to_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is out of range")),
        Value::String(s) => s
            .trim()
            .replace('_', "")
            .parse::<f64>()
            .map_err(|e| format!("invalid float {s:?}: {e}")),
        other => Err(format!("{} has no float form", crate::formats::kind_of(other))),
    }
}

fn to_list(value: &Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::Object(map) => Ok(map.keys().cloned().map(Value::String).collect()),
        Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
        other => Err(format!("{} is not iterable", crate::formats::kind_of(other))),
    }
}

fn to_dict(value: &Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Array(items) => {
            let mut map = Map::new();
            for item in items {
                match item.as_array().map(Vec::as_slice) {
                    Some([key, value]) => {
                        map.insert(render(key), value.clone());
                    }
                    _ => return Err("sequence elements must be key/value pairs".to_string()),
                }
            }
            Ok(map)
        }
        other => Err(format!("{} has no mapping form", crate::formats::kind_of(other))),
    }
}
