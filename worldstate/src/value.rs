//! Scalar field values and their order-preserving index encoding.
//!
//! Index entries carry each scalar as a string whose byte order matches the
//! value order within its type:
//!
//! ```text
//! null            z
//! false / true    b0 / b1
//! number          n<16 hex digits>[i<integer>]   IEEE-754 bits, sign-flipped
//! string          s<raw string>
//! long string     h<blake3 hex digest>
//! ```
//!
//! Numbers flip the sign bit of non-negative values and invert every bit of
//! negative ones, so unsigned comparison of the bit pattern equals numeric
//! comparison. `-0.0` is folded into `0.0`. An integer that has no exact
//! `f64` form carries its decimal digits after the bits, so distinct
//! integers never share an encoding.
//!
//! Strings longer than [`MAX_INLINE_STR_LEN`] or holding a composite-key
//! delimiter are stored as a digest. A digest still answers equality but
//! has no order, so scans over it must re-check the stored record.

use std::cmp::Ordering;
use std::fmt;

use serde_json::{Number, Value};
use worldstate_primitives::codec::{COMPOSITE_KEY_DELIMITER, MAX_UNICODE_RUNE};

/// Longest string stored verbatim in an index entry.
pub const MAX_INLINE_STR_LEN: usize = 128;

/// A JSON number. Integers compare exactly; floats compare as `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    pub fn from_json(n: &Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Self::Int(i.into()));
        }
        if let Some(u) = n.as_u64() {
            return Some(Self::Int(u.into()));
        }
        n.as_f64().map(Self::Float)
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// True if `to_f64` loses nothing.
    fn is_exact_f64(self) -> bool {
        match self {
            Self::Int(i) => (i as f64) as i128 == i,
            Self::Float(_) => true,
        }
    }

    pub fn compare(self, other: Num) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(&b),
            (Self::Int(a), Self::Float(b)) => compare_int_float(a, b),
            (Self::Float(a), Self::Int(b)) => compare_int_float(b, a).map(Ordering::reverse),
        }
    }
}

fn compare_int_float(i: i128, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)),
        ord => Some(ord),
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(n) => write!(f, "{}", n),
        }
    }
}

/// A borrowed scalar JSON value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Number(Num),
    Str(&'a str),
}

impl<'a> Scalar<'a> {
    /// The scalar held by `value`, or `None` for arrays and objects.
    pub fn from_json(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Num::from_json(n).map(Self::Number),
            Value::String(s) => Some(Self::Str(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Order-preserving index encoding.
    pub fn encode(&self) -> String {
        match self {
            Self::Null => "z".to_string(),
            Self::Bool(false) => "b0".to_string(),
            Self::Bool(true) => "b1".to_string(),
            Self::Number(n) => {
                let bits = ordered_bits(n.to_f64());
                match n {
                    Num::Int(i) if !n.is_exact_f64() => format!("n{:016x}i{}", bits, i),
                    _ => format!("n{:016x}", bits),
                }
            }
            Self::Str(s) if is_inline(s) => format!("s{}", s),
            Self::Str(s) => format!("h{}", blake3::hash(s.as_bytes()).to_hex()),
        }
    }

    /// Parse an encoded index value. Digests carry no value and give `None`;
    /// check [`is_digest`] first.
    pub fn decode(encoded: &'a str) -> Option<Self> {
        let tag = encoded.get(..1)?;
        let body = encoded.get(1..)?;
        match (tag, body) {
            ("z", "") => Some(Self::Null),
            ("b", "0") => Some(Self::Bool(false)),
            ("b", "1") => Some(Self::Bool(true)),
            ("n", body) => {
                let bits = u64::from_str_radix(body.get(..16)?, 16).ok()?;
                match body.get(16..)? {
                    "" => Some(Self::Number(Num::Float(from_ordered_bits(bits)))),
                    exact => exact
                        .strip_prefix('i')?
                        .parse::<i128>()
                        .ok()
                        .map(|i| Self::Number(Num::Int(i))),
                }
            }
            ("s", s) => Some(Self::Str(s)),
            _ => None,
        }
    }

    /// Compare two scalars of the same type. Mixed types are unordered.
    pub fn compare(&self, other: &Scalar<'_>) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Scalar::Null) => Some(Ordering::Equal),
            (Self::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Self::Number(a), Scalar::Number(b)) => a.compare(*b),
            (Self::Str(a), Scalar::Str(b)) => Some((*a).cmp(*b)),
            _ => None,
        }
    }
}

fn is_inline(s: &str) -> bool {
    s.len() <= MAX_INLINE_STR_LEN && !s.chars().any(is_reserved)
}

fn is_reserved(c: char) -> bool {
    c == COMPOSITE_KEY_DELIMITER || c == MAX_UNICODE_RUNE
}

/// True if `encoded` is a string digest rather than a decodable value.
pub fn is_digest(encoded: &str) -> bool {
    encoded.len() == 65 && encoded.starts_with('h')
}

fn ordered_bits(n: f64) -> u64 {
    let n = if n == 0.0 { 0.0 } else { n };
    let bits = n.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

fn from_ordered_bits(bits: u64) -> f64 {
    if bits >> 63 == 1 {
        f64::from_bits(bits & !(1 << 63))
    } else {
        f64::from_bits(!bits)
    }
}

/// Every scalar in `doc` with its dotted field path.
///
/// Object keys extend the path; arrays are transparent, so each element
/// of an array is reported under the array's own path.
pub fn flatten(doc: &Value) -> Vec<(String, Scalar<'_>)> {
    let mut out = Vec::new();
    if let Value::Object(map) = doc {
        for (key, value) in map {
            flatten_into(key.clone(), value, &mut out);
        }
    }
    out
}

fn flatten_into<'a>(path: String, value: &'a Value, out: &mut Vec<(String, Scalar<'a>)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(format!("{}.{}", path, key), child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(path.clone(), item, out);
            }
        }
        scalar => {
            if let Some(s) = Scalar::from_json(scalar) {
                out.push((path, s));
            }
        }
    }
}

/// The first object key in `doc` that contains a `.`.
///
/// Such a key would share its dotted path with a nested field of the same
/// spelling, so documents holding one cannot be indexed or queried.
pub fn find_dotted_key(doc: &Value) -> Option<&str> {
    match doc {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            if key.contains('.') {
                Some(key.as_str())
            } else {
                find_dotted_key(child)
            }
        }),
        Value::Array(items) => items.iter().find_map(find_dotted_key),
        _ => None,
    }
}

/// Every scalar reachable at the dotted `path`, fanning out through arrays.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Vec<Scalar<'a>> {
    let mut current: Vec<&'a Value> = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            descend(value, segment, &mut next);
        }
        current = next;
    }
    let mut out = Vec::new();
    for value in current {
        collect_scalars(value, &mut out);
    }
    out
}

fn descend<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(segment) {
                out.push(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                descend(item, segment, out);
            }
        }
        _ => {}
    }
}

fn collect_scalars<'a>(value: &'a Value, out: &mut Vec<Scalar<'a>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_scalars(item, out);
            }
        }
        Value::Object(_) => {}
        scalar => out.extend(Scalar::from_json(scalar)),
    }
}
