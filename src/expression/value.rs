// SPDX-License-Identifier: MIT

//! Dynamic values produced during evaluation, and the loose coercion rules
//! that comparisons and boolean operators apply to them.
//!
//! Values borrow from the AST (literals) and from the context (everything
//! read through an identifier), so evaluation never copies context data.

use serde_json::{Map, Value as Json};
use std::cmp::Ordering;

/// Result of evaluating a node
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    /// Absent sentinel: a path that could not be resolved
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(&'a str),
    Array(&'a [Json]),
    Object(&'a Map<String, Json>),
}

/// Primitive form of a value, used before equality and ordering
enum Primitive<'a> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(&'a str),
    Owned(String),
}

impl<'a> Value<'a> {
    /// Borrow a JSON value from the context
    pub fn from_json(json: &'a Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items),
            Json::Object(map) => Value::Object(map),
        }
    }

    /// Dynamic truthiness
    ///
    /// `Undefined`, `Null`, `false`, `0`, `-0`, `NaN` and `""` are falsy.
    /// Every array and object is truthy, including empty ones.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Short type name for logs and diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn to_primitive(self) -> Primitive<'a> {
        match self {
            Value::Undefined => Primitive::Undefined,
            Value::Null => Primitive::Null,
            Value::Bool(b) => Primitive::Bool(b),
            Value::Number(n) => Primitive::Number(n),
            Value::String(s) => Primitive::Str(s),
            Value::Array(items) => Primitive::Owned(join_array(items)),
            Value::Object(_) => Primitive::Str("[object Object]"),
        }
    }
}

impl Primitive<'_> {
    fn to_number(&self) -> f64 {
        match self {
            Primitive::Undefined => f64::NAN,
            Primitive::Null => 0.0,
            Primitive::Bool(b) => bool_to_number(*b),
            Primitive::Number(n) => *n,
            Primitive::Str(s) => string_to_number(s),
            Primitive::Owned(s) => string_to_number(s),
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Str(s) => Some(s),
            Primitive::Owned(s) => Some(s),
            _ => None,
        }
    }
}

/// Loose equality between two values
///
/// `Undefined` only equals `Undefined` and `Null` only equals `Null`.
/// Arrays and objects compare by identity: two sides are equal only when
/// they resolve to the same node of the context. Across kinds, booleans
/// become numbers, containers become their primitive string, and a number
/// meets a string numerically.
pub fn loose_eq<'a>(left: Value<'a>, right: Value<'a>) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,

        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => std::ptr::eq(a, b),
        (Value::Object(a), Value::Object(b)) => std::ptr::eq(a, b),

        (Value::Bool(b), other) => loose_eq(Value::Number(bool_to_number(b)), other),
        (other, Value::Bool(b)) => loose_eq(other, Value::Number(bool_to_number(b))),

        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n == string_to_number(s)
        }

        (container @ (Value::Array(_) | Value::Object(_)), scalar)
        | (scalar, container @ (Value::Array(_) | Value::Object(_))) => {
            primitive_eq(&container.to_primitive(), scalar)
        }
    }
}

fn primitive_eq(container: &Primitive<'_>, scalar: Value<'_>) -> bool {
    let Some(text) = container.as_str() else {
        return false;
    };
    match scalar {
        Value::String(s) => text == s,
        Value::Number(n) => string_to_number(text) == n,
        // An array never equals an object
        _ => false,
    }
}

/// Loose ordering between two values, `None` when they are incomparable
///
/// Both sides are converted to primitives. Two strings compare
/// lexicographically by UTF-16 code unit, so a character above U+FFFF sorts
/// before U+E000..U+FFFF. Anything else compares numerically, and a NaN on
/// either side makes the pair incomparable.
pub fn loose_cmp<'a>(left: Value<'a>, right: Value<'a>) -> Option<Ordering> {
    let left = left.to_primitive();
    let right = right.to_primitive();

    if let (Some(a), Some(b)) = (left.as_str(), right.as_str()) {
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }

    left.to_number().partial_cmp(&right.to_number())
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn join_array(items: &[Json]) -> String {
    items
        .iter()
        .map(|item| match item {
            Json::Null => String::new(),
            Json::Bool(b) => b.to_string(),
            Json::Number(n) => format_number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => s.clone(),
            Json::Array(inner) => join_array(inner),
            Json::Object(_) => "[object Object]".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Format a number the way it prints inside a joined array: `1` not `1.0`
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Strict string to number conversion used by comparisons
///
/// Surrounding whitespace is ignored and an empty string is `0`. Accepts
/// `0x`/`0o`/`0b` integers, signed `Infinity`, and plain decimal floats with
/// an optional exponent. Anything else is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if is_decimal_literal(s) {
        s.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Rust's float parser also takes `inf`, `nan` and friends; this only lets
/// through `[+-]digits[.digits][e[+-]digits]` with at least one mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut mantissa_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Best-effort conversion of a numeric literal's raw text
///
/// Takes the longest `digits[.digits]` prefix, so `1.2.3` reads as `1.2`.
/// Text without any digit in that prefix (a lone `.`) is NaN.
pub fn parse_number_literal(text: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in text.char_indices() {
        if c.is_ascii_digit() {
            seen_digit = true;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return f64::NAN;
    }
    text[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.truthy());
        assert!(!Value::Null.truthy());
        assert!(!Value::Bool(false).truthy());
        assert!(!Value::Number(0.0).truthy());
        assert!(!Value::Number(-0.0).truthy());
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(!Value::String("").truthy());

        assert!(Value::Bool(true).truthy());
        assert!(Value::Number(-2.5).truthy());
        assert!(Value::String("false").truthy());
        assert!(Value::String("0").truthy());
        assert!(Value::Array(&[]).truthy());
        let empty = Map::new();
        assert!(Value::Object(&empty).truthy());
    }

    #[test]
    fn test_undefined_equals_only_itself() {
        assert!(loose_eq(Value::Undefined, Value::Undefined));
        assert!(!loose_eq(Value::Undefined, Value::Null));
        assert!(!loose_eq(Value::Undefined, Value::Bool(false)));
        assert!(!loose_eq(Value::Undefined, Value::String("")));
        assert!(!loose_eq(Value::Number(0.0), Value::Undefined));
    }

    #[test]
    fn test_null_equals_only_null() {
        assert!(loose_eq(Value::Null, Value::Null));
        assert!(!loose_eq(Value::Null, Value::Number(0.0)));
        assert!(!loose_eq(Value::Bool(false), Value::Null));
    }

    #[test]
    fn test_number_string_coercion() {
        assert!(loose_eq(Value::Number(42.0), Value::String("42")));
        assert!(loose_eq(Value::String(" 42 "), Value::Number(42.0)));
        assert!(loose_eq(Value::String(""), Value::Number(0.0)));
        assert!(loose_eq(Value::String("0x10"), Value::Number(16.0)));
        assert!(!loose_eq(Value::String("42abc"), Value::Number(42.0)));
        assert!(!loose_eq(Value::String("abc"), Value::Number(f64::NAN)));
    }

    #[test]
    fn test_bool_coercion() {
        assert!(loose_eq(Value::Bool(true), Value::Number(1.0)));
        assert!(loose_eq(Value::Bool(false), Value::Number(0.0)));
        assert!(loose_eq(Value::Bool(true), Value::String("1")));
        assert!(loose_eq(Value::String("0"), Value::Bool(false)));
        assert!(!loose_eq(Value::Bool(true), Value::String("true")));
        assert!(!loose_eq(Value::Bool(true), Value::Number(2.0)));
    }

    #[test]
    fn test_strings_compare_directly() {
        assert!(loose_eq(Value::String("admin"), Value::String("admin")));
        assert!(!loose_eq(Value::String("1"), Value::String("1.0")));
    }

    #[test]
    fn test_nan_is_never_equal() {
        assert!(!loose_eq(Value::Number(f64::NAN), Value::Number(f64::NAN)));
    }

    #[test]
    fn test_containers_compare_by_identity() {
        let doc = json!({"a": ["x"], "b": ["x"], "o": {}});
        let a = Value::from_json(&doc["a"]);
        let b = Value::from_json(&doc["b"]);
        assert!(loose_eq(a, a));
        assert!(!loose_eq(a, b));

        let o = Value::from_json(&doc["o"]);
        assert!(loose_eq(o, o));
        assert!(!loose_eq(a, o));
    }

    #[test]
    fn test_containers_against_scalars() {
        let doc = json!({"one": ["admin"], "many": [1, 2], "num": [7], "obj": {"k": 1}});
        assert!(loose_eq(Value::from_json(&doc["one"]), Value::String("admin")));
        assert!(loose_eq(Value::from_json(&doc["many"]), Value::String("1,2")));
        assert!(loose_eq(Value::Number(7.0), Value::from_json(&doc["num"])));
        assert!(loose_eq(
            Value::from_json(&doc["obj"]),
            Value::String("[object Object]")
        ));
        assert!(!loose_eq(Value::from_json(&doc["obj"]), Value::Bool(true)));
    }

    #[test]
    fn test_ordering_numbers_and_strings() {
        assert_eq!(
            loose_cmp(Value::Number(1.0), Value::Number(2.0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            loose_cmp(Value::String("10"), Value::Number(9.0)),
            Some(Ordering::Greater)
        );
        // Two strings compare lexicographically, not numerically
        assert_eq!(
            loose_cmp(Value::String("10"), Value::String("9")),
            Some(Ordering::Less)
        );
        assert_eq!(
            loose_cmp(Value::Bool(true), Value::Number(0.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            loose_cmp(Value::Null, Value::Number(0.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_string_ordering_uses_utf16_code_units() {
        assert_eq!(
            loose_cmp(Value::String("\u{10000}"), Value::String("\u{FFFF}")),
            Some(Ordering::Less)
        );
        assert_eq!(
            loose_cmp(Value::String("\u{1F600}"), Value::String("\u{E000}")),
            Some(Ordering::Less)
        );
        assert_eq!(
            loose_cmp(Value::String("\u{1F600}"), Value::String("z")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_ordering_with_undefined_or_nan_is_incomparable() {
        assert_eq!(loose_cmp(Value::Undefined, Value::Number(1.0)), None);
        assert_eq!(loose_cmp(Value::Number(1.0), Value::Undefined), None);
        assert_eq!(loose_cmp(Value::String("abc"), Value::Number(1.0)), None);
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  3.5 "), 3.5);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("-1e3"), -1000.0);
        assert_eq!(string_to_number(".5"), 0.5);
        assert_eq!(string_to_number("5."), 5.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("NaN").is_nan());
        assert!(string_to_number("1e").is_nan());
        assert!(string_to_number(".").is_nan());
        assert!(string_to_number("0xZZ").is_nan());
    }

    #[test]
    fn test_parse_number_literal_is_lenient() {
        assert_eq!(parse_number_literal("42"), 42.0);
        assert_eq!(parse_number_literal("0.75"), 0.75);
        assert_eq!(parse_number_literal(".5"), 0.5);
        assert_eq!(parse_number_literal("3."), 3.0);
        assert_eq!(parse_number_literal("1.2.3"), 1.2);
        assert!(parse_number_literal(".").is_nan());
        assert!(parse_number_literal("..").is_nan());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
