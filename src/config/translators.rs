//! Per-type codecs between the textual cell of a field and its native value.
//!
//! Every translator is a stateless unit struct; fields of the same type share
//! the same `&'static` instance handed out by [`ValueKind::translator`].
//!
//! Decoding always strips trailing comments first (see [`strip_comments`]).
//! Boolean and integer decoding can fail and return `None`; path and string
//! decoding cannot. Encoding is total.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Native type tag of a declared field.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Path,
    String,
    Boolean,
    Integer,
}

impl ValueKind {
    /// The shared translator for this kind.
    pub fn translator(self) -> &'static dyn Translator {
        match self {
            ValueKind::Path => &PathTranslator,
            ValueKind::String => &StringTranslator,
            ValueKind::Boolean => &BoolTranslator,
            ValueKind::Integer => &IntTranslator,
        }
    }
}

/// A native field value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Path(PathBuf),
    Text(String),
    Bool(bool),
    Int(i32),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Path(_) => ValueKind::Path,
            FieldValue::Text(_) => ValueKind::String,
            FieldValue::Bool(_) => ValueKind::Boolean,
            FieldValue::Int(_) => ValueKind::Integer,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Path(p) => write!(f, "{}", p.display()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            FieldValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<PathBuf> for FieldValue {
    fn from(p: PathBuf) -> Self {
        FieldValue::Path(p)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i)
    }
}

/// Codec between a raw textual cell and a [`FieldValue`].
pub trait Translator: Sync {
    /// Kind of value produced by [`Translator::decode`].
    fn kind(&self) -> ValueKind;

    /// Decode raw cell text. `None` means the text is not a valid value of this kind.
    fn decode(&self, raw: &str) -> Option<FieldValue>;

    /// Encode a native value into cell text.
    fn encode(&self, value: &FieldValue) -> String {
        value.to_string()
    }
}

/// Truncate `raw` at the first `;` or `#`, then trim trailing whitespace.
pub fn strip_comments(raw: &str) -> &str {
    let end = raw.find([';', '#']).unwrap_or(raw.len());
    raw[..end].trim_end_matches([' ', '\n', '\r', '\t'])
}

/// Parse a leading decimal integer the way C's `stoi` does.
///
/// Leading whitespace and an optional sign are accepted, at least one digit is
/// required, anything after the digits is ignored. Values outside `i32` yield `None`.
fn parse_leading_int(text: &str) -> Option<i32> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathTranslator;

impl Translator for PathTranslator {
    fn kind(&self) -> ValueKind {
        ValueKind::Path
    }

    fn decode(&self, raw: &str) -> Option<FieldValue> {
        Some(FieldValue::Path(PathBuf::from(strip_comments(raw))))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringTranslator;

impl Translator for StringTranslator {
    fn kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn decode(&self, raw: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(strip_comments(raw).to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolTranslator;

impl Translator for BoolTranslator {
    fn kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn decode(&self, raw: &str) -> Option<FieldValue> {
        parse_leading_int(strip_comments(raw)).map(|i| FieldValue::Bool(i != 0))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntTranslator;

impl Translator for IntTranslator {
    fn kind(&self) -> ValueKind {
        ValueKind::Integer
    }

    fn decode(&self, raw: &str) -> Option<FieldValue> {
        parse_leading_int(strip_comments(raw)).map(FieldValue::Int)
    }
}
