//! Literal text coercion.
//!
//! App state values are stored in config files as literal text:
//! `True`, `42`, `30.0`, `'text'`,
//! `(0, 0, 800, 600)`, `['a', 'b']` or `{'key': 'value'}`. This module parses
//! that text into a [`StateValue`], renders values back into it and coerces
//! stored text into a declared [`ValueKind`] without ever failing.

use log::*;
use std::collections::BTreeMap;
use std::fmt;

/// Type tag of a [`StateValue`].
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Tuple,
    List,
    Dict,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Tuple => "tuple",
            ValueKind::List => "list",
            ValueKind::Dict => "dict",
        };
        f.write_str(name)
    }
}

/// A typed app state value.
///
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Tuple(Vec<StateValue>),
    List(Vec<StateValue>),
    Dict(BTreeMap<String, StateValue>),
}

impl StateValue {
    /// Returns the type tag of this value.
    ///
    pub fn kind(&self) -> ValueKind {
        match self {
            StateValue::Bool(_) => ValueKind::Bool,
            StateValue::Int(_) => ValueKind::Int,
            StateValue::Float(_) => ValueKind::Float,
            StateValue::Text(_) => ValueKind::Text,
            StateValue::Tuple(_) => ValueKind::Tuple,
            StateValue::List(_) => ValueKind::List,
            StateValue::Dict(_) => ValueKind::Dict,
        }
    }

    /// Render this value as literal text, parseable by [`parse_literal`].
    ///
    pub fn to_literal(&self) -> String {
        self.to_string()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of this value, accepting integers as well.
    ///
    pub fn as_float(&self) -> Option<f64> {
        match self {
            StateValue::Float(value) => Some(*value),
            StateValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Items of a tuple or list value.
    ///
    pub fn as_items(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::Tuple(items) | StateValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, StateValue>> {
        match self {
            StateValue::Dict(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(i64::from(value))
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<Vec<String>> for StateValue {
    fn from(value: Vec<String>) -> Self {
        StateValue::List(value.into_iter().map(StateValue::Text).collect())
    }
}

impl From<&[String]> for StateValue {
    fn from(value: &[String]) -> Self {
        StateValue::List(value.iter().cloned().map(StateValue::Text).collect())
    }
}

impl From<[i64; 4]> for StateValue {
    fn from(value: [i64; 4]) -> Self {
        StateValue::Tuple(value.iter().copied().map(StateValue::Int).collect())
    }
}

impl From<[f64; 4]> for StateValue {
    fn from(value: [f64; 4]) -> Self {
        StateValue::Tuple(value.iter().copied().map(StateValue::Float).collect())
    }
}

impl From<BTreeMap<String, StateValue>> for StateValue {
    fn from(value: BTreeMap<String, StateValue>) -> Self {
        StateValue::Dict(value)
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(true) => f.write_str("True"),
            StateValue::Bool(false) => f.write_str("False"),
            StateValue::Int(value) => write!(f, "{}", value),
            // Debug keeps the fraction of whole numbers ("30.0"), so kinds survive a round trip
            StateValue::Float(value) => write!(f, "{:?}", value),
            StateValue::Text(text) => f.write_str(&quote_text(text)),
            StateValue::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            StateValue::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            StateValue::Dict(map) => {
                f.write_str("{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", quote_text(key), value)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[StateValue]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Quote text the way `repr` does: single quotes unless the text contains a
/// single quote but no double quote.
///
fn quote_text(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(quote);
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == quote => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => quoted.push_str(&format!("\\x{:02x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push(quote);
    quoted
}

/// Errors that can occur while parsing literal text.
///
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("Unexpected end of literal")]
    UnexpectedEnd,

    #[error("Unexpected character '{found}' at position {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Unsupported literal '{0}'")]
    Unsupported(String),

    #[error("Dict key at position {pos} is not text")]
    NonTextKey { pos: usize },

    #[error("Trailing characters after literal at position {pos}")]
    TrailingInput { pos: usize },

    #[error("Literal nested deeper than {max} levels at position {pos}")]
    TooDeep { pos: usize, max: usize },
}

/// Parse literal text into a value.
///
pub fn parse_literal(text: &str) -> Result<StateValue, LiteralError> {
    let mut parser = Parser::new(text);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(LiteralError::TrailingInput { pos: parser.pos });
    }
    Ok(value)
}

/// Coerce stored text into a value of the given kind.
///
/// Text keys accept unquoted text as is. Integers widen to floats and tuples
/// and lists convert into each other. Returns `None` if the text cannot be
/// read as the requested kind, leaving the fallback to the caller.
///
pub fn coerce_literal(raw: &str, kind: ValueKind) -> Option<StateValue> {
    let raw = raw.trim();
    let parsed = parse_literal(raw);
    match (kind, parsed) {
        (ValueKind::Text, Ok(StateValue::Text(text))) => Some(StateValue::Text(text)),
        (ValueKind::Text, _) => Some(StateValue::Text(raw.to_string())),
        (ValueKind::Float, Ok(StateValue::Int(value))) => Some(StateValue::Float(value as f64)),
        (ValueKind::Tuple, Ok(StateValue::List(items))) => Some(StateValue::Tuple(items)),
        (ValueKind::List, Ok(StateValue::Tuple(items))) => Some(StateValue::List(items)),
        (kind, Ok(value)) if value.kind() == kind => Some(value),
        (kind, Ok(value)) => {
            debug!("Literal '{}' is a {}, expected {}", raw, value.kind(), kind);
            None
        }
        (kind, Err(e)) => {
            debug!("Literal '{}' is not a valid {}: {}", raw, kind, e);
            None
        }
    }
}

/// Deepest nesting of tuples, lists and dicts accepted in a literal.
pub const MAX_NESTING_DEPTH: usize = 64;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Parser {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(LiteralError::UnexpectedChar {
                pos: self.pos - 1,
                found: c,
            }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn parse_value(&mut self) -> Result<StateValue, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('\'') | Some('"') => self.parse_text().map(StateValue::Text),
            Some(open @ ('(' | '[' | '{')) => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(LiteralError::TooDeep {
                        pos: self.pos,
                        max: MAX_NESTING_DEPTH,
                    });
                }
                self.depth += 1;
                let value = self.parse_collection(open);
                self.depth -= 1;
                value
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => Err(LiteralError::UnexpectedChar {
                pos: self.pos,
                found: c,
            }),
        }
    }

    fn parse_collection(&mut self, open: char) -> Result<StateValue, LiteralError> {
        match open {
            '(' => self.parse_parenthesized(),
            '[' => {
                self.pos += 1;
                let (items, _) = self.parse_sequence(']')?;
                Ok(StateValue::List(items))
            }
            _ => self.parse_dict(),
        }
    }

    /// Parse comma separated values up to `close`. The flag reports a comma
    /// after the last value.
    fn parse_sequence(&mut self, close: char) -> Result<(Vec<StateValue>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => trailing_comma = true,
                Some(c) if c == close => return Ok((items, false)),
                Some(c) => {
                    return Err(LiteralError::UnexpectedChar {
                        pos: self.pos - 1,
                        found: c,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn parse_parenthesized(&mut self) -> Result<StateValue, LiteralError> {
        self.pos += 1;
        let (mut items, trailing_comma) = self.parse_sequence(')')?;
        if items.len() == 1 && !trailing_comma {
            // "(x)" is a grouped value, "(x,)" a one-item tuple
            return Ok(items.remove(0));
        }
        Ok(StateValue::Tuple(items))
    }

    fn parse_dict(&mut self) -> Result<StateValue, LiteralError> {
        self.pos += 1;
        let mut map = BTreeMap::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(StateValue::Dict(map));
            }
            let key_pos = self.pos;
            let key = match self.parse_value()? {
                StateValue::Text(key) => key,
                _ => return Err(LiteralError::NonTextKey { pos: key_pos }),
            };
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(StateValue::Dict(map)),
                Some(c) => {
                    return Err(LiteralError::UnexpectedChar {
                        pos: self.pos - 1,
                        found: c,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn parse_text(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(text),
                Some('\\') => self.parse_escape(&mut text)?,
                Some(c) => text.push(c),
            }
        }
    }

    fn parse_escape(&mut self, text: &mut String) -> Result<(), LiteralError> {
        match self.bump() {
            None => return Err(LiteralError::UnexpectedEnd),
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some('t') => text.push('\t'),
            Some('0') => text.push('\0'),
            Some('\\') => text.push('\\'),
            Some('\'') => text.push('\''),
            Some('"') => text.push('"'),
            Some('x') => text.push(self.parse_code_point(2)?),
            Some('u') => text.push(self.parse_code_point(4)?),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
        }
        Ok(())
    }

    fn parse_code_point(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(LiteralError::UnexpectedEnd);
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(LiteralError::Unsupported(format!("\\{}", hex)))
    }

    fn parse_number(&mut self) -> Result<StateValue, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == '.' {
                is_float = true;
                self.pos += 1;
            } else if c == 'e' || c == 'E' {
                is_float = true;
                self.pos += 1;
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if is_float {
            text.parse::<f64>()
                .map(StateValue::Float)
                .map_err(|_| LiteralError::InvalidNumber(text))
        } else {
            text.parse::<i64>()
                .map(StateValue::Int)
                .map_err(|_| LiteralError::InvalidNumber(text))
        }
    }

    fn parse_word(&mut self) -> Result<StateValue, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(StateValue::Bool(true)),
            "False" => Ok(StateValue::Bool(false)),
            _ => Err(LiteralError::Unsupported(word)),
        }
    }
}
