//! Predicate evaluation against raw request bodies.
//!
//! Values are extracted as raw JSON text, never re-serialized: `300` and
//! `300.0` stay distinct, and a string keeps its escapes. One layer of
//! surrounding quotes is stripped before a case-insensitive comparison.

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde_json::value::RawValue;
use std::borrow::Cow;
use std::fmt;
use txmatch_types::Predicate;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("empty path")]
    EmptyPath,

    #[error("empty key in path at position {0}")]
    EmptyKey(usize),

    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),

    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),

    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// One step of a path: `.key` or `[n]`.
///
/// A dotted numeric key (`items.0`) indexes arrays and keys objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(k) => Cow::Borrowed(k),
            PathSegment::Index(i) => Cow::Owned(i.to_string()),
        }
    }

    fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(k) => k.parse().ok(),
            PathSegment::Index(i) => Some(*i),
        }
    }
}

/// Parse `a.b[0].c`, `a.b.0.c` or `.a.b` into segments.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, PathParseError> {
    let offset = usize::from(path.starts_with('.'));
    let body = &path[offset..];
    if body.is_empty() {
        return Err(PathParseError::EmptyPath);
    }

    let mut segments = Vec::new();
    let mut key = String::new();
    let mut after_bracket = false;
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let pos = i + offset;
        match c {
            '.' => {
                if key.is_empty() && !after_bracket {
                    return Err(PathParseError::EmptyKey(pos));
                }
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                if chars.peek().is_none() {
                    return Err(PathParseError::EmptyKey(pos + 1));
                }
                after_bracket = false;
            }
            '[' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some((_, ']')) => break,
                        Some((_, d)) => digits.push(d),
                        None => return Err(PathParseError::UnclosedBracket(pos)),
                    }
                }
                let idx = digits
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| PathParseError::InvalidIndex(pos, digits.clone()))?;
                segments.push(PathSegment::Index(idx));
                after_bracket = true;
            }
            _ => {
                if after_bracket {
                    return Err(PathParseError::UnexpectedChar(c, pos));
                }
                key.push(c);
            }
        }
    }

    if !key.is_empty() {
        segments.push(PathSegment::Key(key));
    }

    Ok(segments)
}

/// Looks up one member of a JSON object. With duplicate keys the first wins.
struct FirstMember<'k>(&'k str);

impl<'de> DeserializeSeed<'de> for FirstMember<'_> {
    type Value = Option<&'de RawValue>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for FirstMember<'_> {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            if found.is_none() && key == self.0 {
                found = Some(map.next_value::<&'de RawValue>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

fn step<'a>(value: &'a RawValue, segment: &PathSegment) -> Option<&'a RawValue> {
    let text = value.get();
    match text.as_bytes().first()? {
        b'{' => {
            let key = segment.as_key();
            let mut de = serde_json::Deserializer::from_str(text);
            FirstMember(key.as_ref()).deserialize(&mut de).ok()?
        }
        b'[' => {
            let idx = segment.as_index()?;
            let array: Vec<&'a RawValue> = serde_json::from_str(text).ok()?;
            array.get(idx).copied()
        }
        _ => None,
    }
}

/// Raw JSON text at `path` inside `body`, or `None` if it does not resolve.
pub fn extract_raw<'a>(body: &'a str, path: &str) -> Option<&'a str> {
    let segments = parse_path(path).ok()?;
    let mut current: &'a RawValue = serde_json::from_str(body).ok()?;
    for segment in &segments {
        current = step(current, segment)?;
    }
    Some(current.get())
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Evaluate one `path == expected` assertion against a serialized request body.
///
/// Absence and mismatch are indistinguishable: both are `false`.
pub fn evaluate(request_body: &str, path: &str, expected_value: &str) -> bool {
    let Some(raw) = extract_raw(request_body, path) else {
        return false;
    };
    strip_quotes(raw).to_lowercase() == expected_value.to_lowercase()
}

pub fn predicate_holds(request_body: &str, predicate: &Predicate) -> bool {
    evaluate(request_body, &predicate.attribute, &predicate.expected_value)
}
