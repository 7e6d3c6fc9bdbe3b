//! Route pattern parsing and parameter validation.
//!
//! # Responsibilities
//! - Split patterns and request paths into segments
//! - Classify pattern segments as literal or typed parameter (`<name:type>`)
//! - Validate raw segment text against a parameter type
//!
//! # Design Decisions
//! - Patterns are parsed once at registration; matching only splits the path
//! - Unknown type tags degrade to generic instead of failing registration
//! - Validators are pure predicates over `&str` and never allocate

use std::fmt;

/// Type tag of a route parameter.
///
/// Declaration order is the specificity order used to break ties between
/// parameters registered at the same trie position: the first type whose
/// validator accepts a segment wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamType {
    /// `<name:int>`
    Int,
    /// `<name:base64id>` (16-byte id encoded as base64url)
    Base64Id,
    /// `<name:uuid>`
    Uuid,
    /// `<name:float>`
    Float,
    /// `<name:string>`
    String,
    /// `<name>` or an unrecognised tag
    Generic,
}

impl ParamType {
    /// Specificity rank, lower is tried first.
    pub fn rank(self) -> u8 {
        match self {
            ParamType::Int => 0,
            ParamType::Base64Id => 1,
            ParamType::Uuid => 2,
            ParamType::Float => 3,
            ParamType::String => 4,
            ParamType::Generic => 5,
        }
    }

    /// Parse a type tag. Unknown tags become [`ParamType::Generic`].
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_known(tag).unwrap_or(ParamType::Generic)
    }

    /// Parse a type tag, returning `None` for tags that would silently degrade.
    pub fn parse_known(tag: &str) -> Option<Self> {
        match tag {
            "int" => Some(ParamType::Int),
            "base64id" => Some(ParamType::Base64Id),
            "uuid" => Some(ParamType::Uuid),
            "float" => Some(ParamType::Float),
            "string" => Some(ParamType::String),
            _ => None,
        }
    }

    /// Run this type's validator against raw segment text.
    pub fn validate(self, value: &str) -> bool {
        match self {
            ParamType::Int => is_int(value),
            ParamType::Base64Id => is_base64_id(value),
            ParamType::Uuid => is_uuid(value),
            ParamType::Float => is_float(value),
            ParamType::String => !value.is_empty(),
            ParamType::Generic => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ParamType::Int => "int",
            ParamType::Base64Id => "base64id",
            ParamType::Uuid => "uuid",
            ParamType::Float => "float",
            ParamType::String => "string",
            ParamType::Generic => "generic",
        };
        f.write_str(tag)
    }
}

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param { name: String, kind: ParamType },
}

impl Segment {
    /// Classify a single pattern segment.
    pub fn parse(raw: &str) -> Self {
        let Some(inner) = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>')) else {
            return Segment::Literal(raw.to_string());
        };

        match inner.split_once(':') {
            Some((name, tag)) => Segment::Param {
                name: name.to_string(),
                kind: ParamType::from_tag(tag),
            },
            None => Segment::Param {
                name: inner.to_string(),
                kind: ParamType::Generic,
            },
        }
    }
}

/// Split a pattern or request path into raw segments.
///
/// One leading slash is always removed. With `normalize_trailing_slash` one
/// trailing slash is removed as well, so `/users/` and `/users` are
/// equivalent; without it `/users/` keeps a final empty segment. The root
/// path yields no segments in both modes.
pub fn split_path(path: &str, normalize_trailing_slash: bool) -> impl Iterator<Item = &str> {
    let mut trimmed = path;
    if normalize_trailing_slash && trimmed.len() > 1 {
        trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    }
    trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);

    (!trimmed.is_empty())
        .then(|| trimmed.split('/'))
        .into_iter()
        .flatten()
}

/// Parse a whole route pattern.
pub fn parse_pattern(pattern: &str, normalize_trailing_slash: bool) -> Vec<Segment> {
    split_path(pattern, normalize_trailing_slash)
        .map(Segment::parse)
        .collect()
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value)
}

fn is_int(value: &str) -> bool {
    let digits = strip_sign(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(value: &str) -> bool {
    let body = strip_sign(value);
    let mut has_digit = false;
    let mut has_dot = false;

    for b in body.bytes() {
        match b {
            b'0'..=b'9' => has_digit = true,
            b'.' if !has_dot => has_dot = true,
            _ => return false,
        }
    }

    has_digit
}

fn is_uuid(value: &str) -> bool {
    value.len() == 36
        && value.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

fn is_base64_id(value: &str) -> bool {
    let payload = match value.len() {
        22 => value,
        24 => match value.strip_suffix("==") {
            Some(payload) => payload,
            None => return false,
        },
        _ => return false,
    };

    payload
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
