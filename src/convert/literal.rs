//! Literal-expression grammar used to interpret string values.
//!
//! Accepts integers (decimal, `0x`, `0o`, `0b`, with `_` separators),
//! floats, `True`, `False`, `None`, quoted strings, lists, tuples, sets and
//! dicts. A single leading sign is allowed on numbers. Anything else, including
//! names and calls, is rejected.

use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid literal at offset {offset}: {message}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// A parsed literal.
#[derive(Debug, Clone)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Distinct elements in first-seen order.
    Set(Vec<Literal>),
    /// Entries in first-seen key order; a repeated key keeps its last value.
    Dict(Vec<(Literal, Literal)>),
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        use Literal::*;
        match (self, other) {
            (None, None) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Int(a), Float(b)) | (Float(b), Int(a)) => (*a as f64) == *b,
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) | (Tuple(a), Tuple(b)) => a == b,
            (Set(a), Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Dict(a), Dict(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            _ => false,
        }
    }
}

impl Literal {
    /// Convert into the configuration value tree.
    ///
    /// Tuples and sets become arrays. Dict keys that are not strings are
    /// rendered with their JSON form. Non-finite floats become strings.
    pub fn into_value(self) -> Value {
        match self {
            Literal::None => Value::Null,
            Literal::Bool(b) => Value::Bool(b),
            Literal::Int(i) => Value::from(i),
            Literal::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
            Literal::Str(s) => Value::String(s),
            Literal::List(items) | Literal::Tuple(items) | Literal::Set(items) => {
                Value::Array(items.into_iter().map(Literal::into_value).collect())
            }
            Literal::Dict(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = match key {
                        Literal::Str(s) => s,
                        other => other.into_value().to_string(),
                    };
                    map.insert(key, value.into_value());
                }
                Value::Object(map)
            }
        }
    }
}

/// Parse a complete literal expression. Leading and trailing whitespace is
/// ignored.
pub fn parse(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let literal = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(literal)
}

/// Deepest collection nesting accepted before parsing fails.
pub const MAX_NESTING: usize = 100;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parse the contents of a collection whose opening bracket is next.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Literal, LiteralError>,
    ) -> Result<Literal, LiteralError> {
        if self.depth == MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        self.pos += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => self.nested(|p| {
                let (items, _) = p.items(']')?;
                Ok(Literal::List(items))
            }),
            Some('(') => self.nested(|p| {
                let (mut items, trailing_comma) = p.items(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }),
            Some('{') => self.nested(Self::dict_or_set),
            Some('+' | '-') => self.signed_number(),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('.') if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => self.number(),
            Some('"' | '\'') => self.strings(),
            Some(c) if c.is_alphabetic() || c == '_' => self.word(),
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
        }
    }

    /// Comma-separated values up to `close`. Reports whether a trailing
    /// comma was present.
    fn items(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(',') {
                trailing_comma = true;
                continue;
            }
            trailing_comma = false;
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            return Err(self.error(format!("expected `,` or `{close}`")));
        }
    }

    fn dict_or_set(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        if self.eat('}') {
            return Ok(Literal::Dict(Vec::new()));
        }

        let first = self.value()?;
        self.skip_ws();
        if self.eat(':') {
            self.skip_ws();
            let value = self.value()?;
            let mut entries = vec![(first, value)];
            loop {
                self.skip_ws();
                if self.eat('}') {
                    return Ok(Literal::Dict(entries));
                }
                if !self.eat(',') {
                    return Err(self.error("expected `,` or `}`"));
                }
                self.skip_ws();
                if self.eat('}') {
                    return Ok(Literal::Dict(entries));
                }
                let key = self.value()?;
                self.skip_ws();
                if !self.eat(':') {
                    return Err(self.error("expected `:`"));
                }
                self.skip_ws();
                let value = self.value()?;
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
            }
        }

        let mut elements = vec![first];
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Literal::Set(elements));
            }
            if !self.eat(',') {
                return Err(self.error("expected `,` or `}`"));
            }
            self.skip_ws();
            if self.eat('}') {
                return Ok(Literal::Set(elements));
            }
            let element = self.value()?;
            if !elements.contains(&element) {
                elements.push(element);
            }
        }
    }

    fn word(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();

        // String prefixes
        if matches!(self.peek(), Some('"' | '\'')) {
            return match word.to_ascii_lowercase().as_str() {
                "r" => self.strings_with(true),
                "u" => self.strings(),
                _ => Err(LiteralError {
                    offset: start,
                    message: format!("unsupported string prefix `{word}`"),
                }),
            };
        }

        match word.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            _ => Err(LiteralError {
                offset: start,
                message: format!("`{word}` is not a literal"),
            }),
        }
    }

    fn signed_number(&mut self) -> Result<Literal, LiteralError> {
        let negative = self.bump() == Some('-');
        self.skip_ws();
        let starts_number = match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()),
            _ => false,
        };
        if !starts_number {
            return Err(self.error("sign must be followed by a number"));
        }
        match self.number()? {
            Literal::Int(i) if negative => i
                .checked_neg()
                .map(Literal::Int)
                .ok_or_else(|| self.error("integer out of range")),
            Literal::Float(f) if negative => Ok(Literal::Float(-f)),
            other => Ok(other),
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;

        if self.peek() == Some('0')
            && let Some(radix) = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            }
        {
            self.pos += 2;
            let digits = self.digits(|c| c.is_digit(radix));
            if digits.is_empty() {
                return Err(self.error("missing digits after radix prefix"));
            }
            return i64::from_str_radix(&digits, radix)
                .map(Literal::Int)
                .map_err(|_| self.error("integer out of range"));
        }

        let mut text = self.digits(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            text.push('.');
            text.push_str(&self.digits(|c| c.is_ascii_digit()));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.pos += 1;
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.pos += 1;
                text.push(sign);
            }
            let exponent = self.digits(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                return Err(self.error("missing exponent digits"));
            }
            text.push_str(&exponent);
        }

        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            return Err(self.error("invalid numeric literal"));
        }

        if is_float {
            let text = if text.starts_with('.') {
                format!("0{text}")
            } else {
                text
            };
            return text.parse::<f64>().map(Literal::Float).map_err(|_| LiteralError {
                offset: start,
                message: "invalid float".to_string(),
            });
        }

        if text.len() > 1 && text.starts_with('0') && text.chars().any(|c| c != '0') {
            return Err(LiteralError {
                offset: start,
                message: "leading zeros are not allowed in integers".to_string(),
            });
        }
        text.parse::<i64>().map(Literal::Int).map_err(|_| LiteralError {
            offset: start,
            message: "integer out of range".to_string(),
        })
    }

    /// Digits accepted by `is_digit`, with single `_` separators between
    /// them. Separators are dropped from the result.
    fn digits(&mut self, is_digit: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if is_digit(c) {
                out.push(c);
                self.pos += 1;
            } else if c == '_'
                && !out.is_empty()
                && matches!(self.peek_at(1), Some(next) if is_digit(next))
            {
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Literal, LiteralError> {
        self.strings_with(false)
    }

    fn strings_with(&mut self, raw: bool) -> Result<Literal, LiteralError> {
        let mut out = self.string(raw)?;
        loop {
            let save = self.pos;
            self.skip_ws();
            match self.peek() {
                Some('"' | '\'') => out.push_str(&self.string(false)?),
                Some('r' | 'R') if matches!(self.peek_at(1), Some('"' | '\'')) => {
                    self.pos += 1;
                    out.push_str(&self.string(true)?);
                }
                _ => {
                    self.pos = save;
                    return Ok(Literal::Str(out));
                }
            }
        }
    }

    fn string(&mut self, raw: bool) -> Result<String, LiteralError> {
        let start = self.pos;
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(LiteralError {
                    offset: start,
                    message: "unterminated string".to_string(),
                });
            };
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
                continue;
            }
            if c == '\n' && !triple {
                return Err(LiteralError {
                    offset: start,
                    message: "unterminated string".to_string(),
                });
            }
            if c == '\\' {
                if raw {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                } else {
                    self.escape(&mut out)?;
                }
                continue;
            }
            out.push(c);
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            'x' => out.push(self.code_point(2)?),
            'u' => out.push(self.code_point(4)?),
            'U' => out.push(self.code_point(8)?),
            other => {
                // Unknown escapes are kept verbatim
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn code_point(&mut self, width: usize) -> Result<char, LiteralError> {
        let end = self.pos + width;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("invalid escape digits"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(input: &str) -> Value {
        parse(input).unwrap().into_value()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("True").unwrap(), Literal::Bool(true));
        assert_eq!(parse("False").unwrap(), Literal::Bool(false));
        assert_eq!(parse("None").unwrap(), Literal::None);
        assert_eq!(parse("123").unwrap(), Literal::Int(123));
        assert_eq!(parse("-42").unwrap(), Literal::Int(-42));
        assert_eq!(parse("1_000").unwrap(), Literal::Int(1000));
        assert_eq!(parse("0x1F").unwrap(), Literal::Int(31));
        assert_eq!(parse("0b101").unwrap(), Literal::Int(5));
        assert_eq!(parse("0").unwrap(), Literal::Int(0));
        assert_eq!(parse("1.5").unwrap(), Literal::Float(1.5));
        assert_eq!(parse(".123").unwrap(), Literal::Float(0.123));
        assert_eq!(parse("5.").unwrap(), Literal::Float(5.0));
        assert_eq!(parse("1e3").unwrap(), Literal::Float(1000.0));
        assert_eq!(parse("  7  ").unwrap(), Literal::Int(7));
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse("\"abc\"").unwrap(), Literal::Str("abc".into()));
        assert_eq!(parse("'it''s'").unwrap(), Literal::Str("its".into()));
        assert_eq!(parse(r#"'a\tb\n'"#).unwrap(), Literal::Str("a\tb\n".into()));
        assert_eq!(parse(r#"r'a\tb'"#).unwrap(), Literal::Str("a\\tb".into()));
        assert_eq!(parse(r#"'é'"#).unwrap(), Literal::Str("é".into()));
        assert_eq!(parse("'''multi\nline'''").unwrap(), Literal::Str("multi\nline".into()));
    }

    #[test]
    fn test_collections() {
        assert_eq!(value("[1, 2, 3]"), json!([1, 2, 3]));
        assert_eq!(value("[]"), json!([]));
        assert_eq!(value("(1, 'a')"), json!([1, "a"]));
        assert_eq!(value("(1,)"), json!([1]));
        assert_eq!(value("(1)"), json!(1));
        assert_eq!(value("{'a': 1, 'b': [True, None]}"), json!({"a": 1, "b": [true, null]}));
        assert_eq!(value("{1: 2}"), json!({"1": 2}));
        assert_eq!(value("{}"), json!({}));
        assert_eq!(value("[1, [2, [3,]],]"), json!([1, [2, [3]]]));
    }

    #[test]
    fn test_sets_compare_without_order() {
        let set = parse("{1, 2, 2, 3}").unwrap();
        assert_eq!(set, Literal::Set(vec![Literal::Int(3), Literal::Int(1), Literal::Int(2)]));
        assert_eq!(set.into_value(), json!([1, 2, 3]));
    }

    #[test]
    fn test_dict_last_key_wins() {
        assert_eq!(value("{'a': 1, 'a': 2}"), json!({"a": 2}));
    }

    #[test]
    fn test_rejected_inputs() {
        for input in [
            "", "a", "hello world", "bool(123)", "str()", "-", "--5", "[[[", "[1, 2",
            "{'a' 1}", "true", "null", "012", "1 2", "'unterminated", "0x", "1e", "b'x'",
        ] {
            assert!(parse(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}1{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(parse(&at_limit).is_ok());

        let over = format!("{}{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        let err = parse(&over).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));

        let deep = format!("{}{}", "{".repeat(100_000), "}".repeat(100_000));
        assert!(parse(&deep).is_err());
    }

    #[test]
    fn test_integer_overflow_rejected() {
        assert!(parse("99999999999999999999").is_err());
    }
}
