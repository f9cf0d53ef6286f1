//! Access to a merged configuration.
//!
//! [`ConfigProvider`] looks keys up directly first and then as dotted paths
//! through nested mappings. Values come back as an [`Entry`]; nested
//! mappings are wrapped in their own provider so lookups can continue on
//! the sub-tree.

use crate::config::{ConfigPaths, ConfigTree, SourceResolver, Target, merge_into};
use crate::convert::{
    BoolConverter, Converter, PythonicConverter, SimpleConverter, UniversalConverter, ValueType,
};
use crate::error::{ConfigError, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::ops::Index;
use tracing::debug;

static UNIVERSAL: UniversalConverter = UniversalConverter;

/// A value returned by a provider lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Null, boolean, number or string.
    Scalar(Value),
    Sequence(Vec<Value>),
    /// A nested mapping, wrapped for further lookups.
    Mapping(ConfigProvider),
}

impl Entry {
    pub fn is_null(&self) -> bool {
        matches!(self, Entry::Scalar(Value::Null))
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Entry::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Entry::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_provider(&self) -> Option<&ConfigProvider> {
        match self {
            Entry::Mapping(provider) => Some(provider),
            _ => None,
        }
    }

    pub fn into_provider(self) -> Option<ConfigProvider> {
        match self {
            Entry::Mapping(provider) => Some(provider),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    /// Plain value tree, unwrapping nested providers.
    pub fn to_value(&self) -> Value {
        match self {
            Entry::Scalar(value) => value.clone(),
            Entry::Sequence(items) => Value::Array(items.clone()),
            Entry::Mapping(provider) => Value::Object(provider.to_map()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Entry::Scalar(value) => value,
            Entry::Sequence(items) => Value::Array(items),
            Entry::Mapping(provider) => Value::Object(provider.into_map()),
        }
    }
}

impl PartialEq<Value> for Entry {
    fn eq(&self, other: &Value) -> bool {
        self.to_value() == *other
    }
}

impl From<Entry> for Value {
    fn from(entry: Entry) -> Self {
        entry.into_value()
    }
}

/// Options for [`ConfigProvider::get_with`].
///
/// The defaults match [`ConfigProvider::get`]: universal conversion in safe
/// mode, no default, absent keys raise only if the provider says so.
#[derive(Clone)]
pub struct GetOptions<'a> {
    default: Option<Value>,
    raise_if_absent: Option<bool>,
    converter: Option<&'a dyn Converter>,
    strict: bool,
}

impl Default for GetOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> GetOptions<'a> {
    pub fn new() -> Self {
        Self {
            default: None,
            raise_if_absent: None,
            converter: Some(&UNIVERSAL),
            strict: false,
        }
    }

    /// Value returned when the key is absent.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn raise_if_absent(mut self, raise: bool) -> Self {
        self.raise_if_absent = Some(raise);
        self
    }

    pub fn converter(mut self, converter: &'a dyn Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Skip conversion entirely.
    pub fn raw(mut self) -> Self {
        self.converter = None;
        self
    }

    /// Propagate conversion failures instead of returning null.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// The merged configuration and the resolver used to extend it.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    data: ConfigTree,
    raise_on_absent: bool,
    resolver: SourceResolver,
}

impl PartialEq for ConfigProvider {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.raise_on_absent == other.raise_on_absent
    }
}

impl Serialize for ConfigProvider {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl ConfigProvider {
    /// Wrap a mapping. Later `insert` calls search from the working directory.
    pub fn new(data: ConfigTree) -> Self {
        Self::with_resolver(data, SourceResolver::new(ConfigPaths::discover().locator()))
    }

    pub fn with_resolver(data: ConfigTree, resolver: SourceResolver) -> Self {
        Self {
            data,
            raise_on_absent: false,
            resolver,
        }
    }

    /// Make plain lookups fail with [`ConfigError::AbsentKey`].
    pub fn raise_on_absent(mut self, raise: bool) -> Self {
        self.raise_on_absent = raise;
        self
    }

    pub fn raises_on_absent(&self) -> bool {
        self.raise_on_absent
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Look up `key` with universal conversion.
    ///
    /// Returns `Ok(None)` for absent keys unless the provider was built to
    /// raise on them.
    pub fn get(&self, key: &str) -> Result<Option<Entry>> {
        self.get_with(key, GetOptions::new())
    }

    pub fn get_with(&self, key: &str, options: GetOptions<'_>) -> Result<Option<Entry>> {
        self.finish(self.lookup(key), key, options)
    }

    /// Look up `key`, falling back to `default` when it is absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Entry {
        match self.lookup(key) {
            Some(value) => self
                .convert(value, &UNIVERSAL, false)
                .unwrap_or_else(|_| self.wrap(value.clone())),
            None => self.wrap(default.into()),
        }
    }

    /// Look up `key` without conversion.
    pub fn get_raw(&self, key: &str) -> Result<Option<Entry>> {
        self.get_with(key, GetOptions::new().raw())
    }

    /// Attribute-style access: the key must be present.
    pub fn require(&self, key: &str) -> Result<Entry> {
        self.get_with(key, GetOptions::new().raise_if_absent(true))?
            .ok_or_else(|| ConfigError::absent(key))
    }

    /// Look up a path given as discrete segments.
    pub fn get_path(&self, segments: &[&str]) -> Result<Option<Entry>> {
        let found = self.lookup_segments(segments.iter().copied());
        self.finish(found, &segments.join("."), GetOptions::new())
    }

    pub fn require_path(&self, segments: &[&str]) -> Result<Entry> {
        let key = segments.join(".");
        let found = self.lookup_segments(segments.iter().copied());
        self.finish(found, &key, GetOptions::new().raise_if_absent(true))?
            .ok_or_else(|| ConfigError::absent(key))
    }

    /// The nested mapping at `key` as its own provider.
    pub fn provider(&self, key: &str) -> Result<ConfigProvider> {
        match self.lookup(key) {
            Some(Value::Object(map)) => Ok(self.child(map.clone())),
            _ => Err(ConfigError::absent(key)),
        }
    }

    /// Whether `key` resolves to a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(entry)) if !entry.is_null())
    }

    pub fn assert_contains(&self, key: &str) -> Result<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(ConfigError::absent(key))
        }
    }

    pub fn as_int(&self, key: &str) -> Result<Option<i64>> {
        let converter = SimpleConverter::new(ValueType::Int);
        Ok(self.typed(key, &converter)?.and_then(|e| e.as_i64()))
    }

    pub fn as_float(&self, key: &str) -> Result<Option<f64>> {
        let converter = SimpleConverter::new(ValueType::Float);
        Ok(self.typed(key, &converter)?.and_then(|e| e.as_f64()))
    }

    /// Boolean using the yes/no word table.
    pub fn as_bool(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.typed(key, &BoolConverter)?.and_then(|e| e.as_bool()))
    }

    pub fn as_string(&self, key: &str) -> Result<Option<String>> {
        let converter = SimpleConverter::new(ValueType::Str);
        Ok(self
            .typed(key, &converter)?
            .and_then(|e| e.as_str().map(str::to_string)))
    }

    /// Sequence value; strings are parsed as literals and an empty string
    /// is an empty list.
    pub fn as_list(&self, key: &str) -> Result<Option<Vec<Value>>> {
        let converter = PythonicConverter::empty_as(Value::Array(Vec::new()));
        Ok(self.typed(key, &converter)?.and_then(|e| match e {
            Entry::Sequence(items) => Some(items),
            _ => None,
        }))
    }

    /// Mapping value; strings are parsed as literals and an empty string is
    /// an empty mapping.
    pub fn as_dict(&self, key: &str) -> Result<Option<ConfigTree>> {
        let converter = PythonicConverter::empty_as(Value::Object(ConfigTree::new()));
        Ok(self
            .typed(key, &converter)?
            .and_then(Entry::into_provider)
            .map(ConfigProvider::into_map))
    }

    /// Write a top-level key. Dotted keys are stored as-is, not as paths.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Resolve `target` and merge it over the current values.
    pub fn insert(&mut self, target: impl Into<Target>) -> Result<()> {
        let target = target.into();
        let tree = self.resolver.resolve_all(std::slice::from_ref(&target))?;
        debug!(target = %target.label(), keys = tree.len(), "inserting configuration");
        merge_into(&mut self.data, tree);
        Ok(())
    }

    pub fn as_map(&self) -> &ConfigTree {
        &self.data
    }

    pub fn to_map(&self) -> ConfigTree {
        self.data.clone()
    }

    pub fn into_map(self) -> ConfigTree {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    fn typed(&self, key: &str, converter: &dyn Converter) -> Result<Option<Entry>> {
        self.get_with(key, GetOptions::new().converter(converter))
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.data.get(key) {
            return Some(value);
        }
        if !key.contains('.') {
            return None;
        }
        self.lookup_segments(key.split('.'))
    }

    fn lookup_segments<'k>(&self, mut segments: impl Iterator<Item = &'k str>) -> Option<&Value> {
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    fn finish(
        &self,
        found: Option<&Value>,
        key: &str,
        options: GetOptions<'_>,
    ) -> Result<Option<Entry>> {
        let Some(value) = found else {
            if options.raise_if_absent.unwrap_or(self.raise_on_absent) {
                return Err(ConfigError::absent(key));
            }
            return Ok(options.default.map(|d| self.wrap(d)));
        };
        match options.converter {
            Some(converter) => self.convert(value, converter, options.strict).map(Some),
            None => Ok(Some(self.wrap(value.clone()))),
        }
    }

    fn convert(&self, value: &Value, converter: &dyn Converter, strict: bool) -> Result<Entry> {
        if value.is_object() {
            return Ok(self.wrap(value.clone()));
        }
        Ok(self.wrap(converter.cast(value, !strict)?))
    }

    fn wrap(&self, value: Value) -> Entry {
        match value {
            Value::Object(map) => Entry::Mapping(self.child(map)),
            Value::Array(items) => Entry::Sequence(items),
            scalar => Entry::Scalar(scalar),
        }
    }

    fn child(&self, data: ConfigTree) -> ConfigProvider {
        ConfigProvider {
            data,
            raise_on_absent: self.raise_on_absent,
            resolver: self.resolver.clone(),
        }
    }
}

/// Index-style access to the raw value. Panics if the key is absent.
impl Index<&str> for ConfigProvider {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.lookup(key) {
            Some(value) => value,
            None => panic!("configuration key not found: `{key}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileLocator;
    use crate::error::ErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    fn provider(value: Value) -> ConfigProvider {
        let tree = value.as_object().cloned().unwrap();
        ConfigProvider::with_resolver(tree, SourceResolver::new(FileLocator::new(".", ".")))
    }

    #[test]
    fn test_dotted_lookup() {
        let config = provider(json!({"a": {"b": {"c": 5}}}));
        assert_eq!(config.get("a.b.c").unwrap().unwrap(), json!(5));
        assert_eq!(config.get_path(&["a", "b", "c"]).unwrap().unwrap(), json!(5));
    }

    #[test]
    fn test_dotted_lookup_through_scalar_is_absent() {
        let config = provider(json!({"a": {"b": 3}}));
        assert_eq!(config.get("a.b.c").unwrap(), None);
        let err = config.require("a.b.c").unwrap_err();
        assert_eq!(err.code(), ErrorCode::AbsentKey);
        assert!(config.require_path(&["a", "b", "c"]).is_err());
    }

    #[test]
    fn test_whole_key_wins_over_path() {
        let config = provider(json!({"a.b": "flat", "a": {"b": "nested"}}));
        assert_eq!(config.get("a.b").unwrap().unwrap(), json!("flat"));
        assert_eq!(config.get_path(&["a", "b"]).unwrap().unwrap(), json!("nested"));
    }

    #[test]
    fn test_nested_mapping_is_wrapped() {
        let config = provider(json!({"db": {"host": "localhost", "port": "5432"}}));
        let db = config.get("db").unwrap().unwrap();
        let db = db.as_provider().unwrap();
        assert_eq!(db.get("port").unwrap().unwrap(), json!(5432));
        assert_eq!(config.provider("db").unwrap().len(), 2);
        assert!(config.provider("db.host").is_err());
    }

    #[test]
    fn test_universal_conversion_and_raw() {
        let config = provider(json!({"n": "42", "l": "[1, 2]", "s": "plain text"}));
        assert_eq!(config.get("n").unwrap().unwrap(), json!(42));
        assert_eq!(config.get_raw("n").unwrap().unwrap(), json!("42"));
        assert_eq!(config.get("l").unwrap().unwrap().as_sequence().unwrap().len(), 2);
        assert_eq!(config.get("s").unwrap().unwrap(), json!("plain text"));
    }

    #[test]
    fn test_converted_mapping_is_wrapped() {
        let config = provider(json!({"m": "{'a': 1}"}));
        let entry = config.get("m").unwrap().unwrap();
        assert_eq!(entry.as_provider().unwrap().get("a").unwrap().unwrap(), json!(1));
    }

    #[test]
    fn test_defaults_and_raise() {
        let config = provider(json!({"present": 1}));
        assert_eq!(config.get("missing").unwrap(), None);
        assert_eq!(config.get_or("missing", "fallback"), json!("fallback"));
        assert_eq!(config.get_or("present", 9), json!(1));

        let options = GetOptions::new().default_value(7);
        assert_eq!(config.get_with("missing", options).unwrap().unwrap(), json!(7));

        let strict = config.clone().raise_on_absent(true);
        assert_eq!(strict.get("missing").unwrap_err().code(), ErrorCode::AbsentKey);
        assert!(config.get_with("missing", GetOptions::new().raise_if_absent(true)).is_err());
    }

    #[test]
    fn test_null_reaches_typed_converters() {
        let config = provider(json!({"flag": null}));
        assert_eq!(config.as_bool("flag").unwrap(), Some(false));
        assert_eq!(config.as_int("flag").unwrap(), None);
        assert_eq!(config.as_list("flag").unwrap(), None);
        assert!(config.get("flag").unwrap().unwrap().is_null());
    }

    #[test]
    fn test_deeply_nested_string_stays_a_string() {
        let deep = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
        let config = provider(json!({"v": deep.clone()}));
        assert_eq!(config.get("v").unwrap().unwrap(), json!(deep));
        assert!(config.as_list("v").unwrap().is_none());
    }

    #[test]
    fn test_contains_ignores_null() {
        let config = provider(json!({"a": 1, "n": null, "s": "None"}));
        assert!(config.contains("a"));
        assert!(!config.contains("n"));
        assert!(!config.contains("s"));
        assert!(!config.contains("zzz"));
        assert!(config.assert_contains("a").is_ok());
        assert_eq!(config.assert_contains("zzz").unwrap_err().code(), ErrorCode::AbsentKey);
    }

    #[test]
    fn test_typed_accessors() {
        let config = provider(json!({
            "port": "8080",
            "ratio": "0.5",
            "debug": "on",
            "quiet": "off",
            "name": 17,
            "hosts": "['a', 'b']",
            "empty": "",
            "opts": "{'retries': 3}",
            "junk": "abc",
        }));
        assert_eq!(config.as_int("port").unwrap(), Some(8080));
        assert_eq!(config.as_int("junk").unwrap(), None);
        assert_eq!(config.as_float("ratio").unwrap(), Some(0.5));
        assert_eq!(config.as_bool("debug").unwrap(), Some(true));
        assert_eq!(config.as_bool("quiet").unwrap(), Some(false));
        assert_eq!(config.as_string("name").unwrap(), Some("17".to_string()));
        assert_eq!(config.as_list("hosts").unwrap(), Some(vec![json!("a"), json!("b")]));
        assert_eq!(config.as_list("empty").unwrap(), Some(vec![]));
        assert_eq!(config.as_dict("empty").unwrap(), Some(ConfigTree::new()));
        assert_eq!(
            Value::Object(config.as_dict("opts").unwrap().unwrap()),
            json!({"retries": 3})
        );
        assert_eq!(config.as_int("missing").unwrap(), None);
    }

    #[test]
    fn test_strict_conversion_raises() {
        let config = provider(json!({"port": "abc"}));
        let int = SimpleConverter::new(ValueType::Int);
        let options = GetOptions::new().converter(&int).strict(true);
        let err = config.get_with("port", options).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConversionFailure);
    }

    #[test]
    fn test_set_is_top_level_only() {
        let mut config = provider(json!({"a": {"b": 1}}));
        config.set("a.b", 2);
        assert_eq!(config["a.b"], json!(2));
        assert_eq!(config.get_path(&["a", "b"]).unwrap().unwrap(), json!(1));
    }

    #[test]
    fn test_insert_mapping_last_wins() {
        let mut config = provider(json!({}));
        config.insert(json!({"k": "v"}).as_object().cloned().unwrap()).unwrap();
        assert_eq!(config.get("k").unwrap().unwrap(), json!("v"));
        config.insert(json!({"k": "v2"}).as_object().cloned().unwrap()).unwrap();
        assert_eq!(config.get("k").unwrap().unwrap(), json!("v2"));
    }

    #[test]
    fn test_insert_file_uses_resolver_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("extra.json"), r#"{"extra": true}"#).unwrap();
        let mut config = ConfigProvider::with_resolver(
            ConfigTree::new(),
            SourceResolver::new(FileLocator::new(temp.path(), temp.path())),
        );
        config.insert("extra.json").unwrap();
        assert_eq!(config.get("extra").unwrap().unwrap(), json!(true));
    }

    #[test]
    fn test_index_access() {
        let config = provider(json!({"a": {"b": "1"}}));
        assert_eq!(config["a.b"], json!("1"));
    }

    #[test]
    #[should_panic(expected = "configuration key not found")]
    fn test_index_access_panics_when_absent() {
        let config = provider(json!({}));
        let _ = &config["nope"];
    }

    #[test]
    fn test_serializes_as_mapping() {
        let config = provider(json!({"a": 1}));
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"a": 1}));
    }
}
