// extensions/interpolate.rs
//
// Shape-aware blending between two property values, plus "12px"-style unit parsing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::easing::lerp;

/// A property value a tween can read, blend and write back.
///
/// Deserializes from plain JSON: numbers, arrays of numbers, objects and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f32),
    /// Fixed-length numeric tuple (colors, 2D/3D vectors, ...).
    Tuple(Vec<f32>),
    /// Flat key-value record; keys are kept sorted.
    Record(BTreeMap<String, Value>),
    /// Anything non-numeric. Only ever stepped, never blended.
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Split a `Text` carrying a number with a unit suffix into `(Number, unit)`.
    /// Any other value is returned as-is with no unit.
    pub fn split_unit(self) -> (Value, Option<String>) {
        match self {
            Value::Text(text) => match parse_unit(&text) {
                Some((n, unit)) if unit.is_empty() => (Value::Number(n), None),
                Some((n, unit)) => (Value::Number(n), Some(unit.to_string())),
                None => (Value::Text(text), None),
            },
            other => (other, None),
        }
    }

    /// Re-append a unit to a numeric value for writing back (`50` + `"px"` -> `"50px"`).
    pub fn with_unit(self, unit: Option<&str>) -> Value {
        match (self, unit) {
            (Value::Number(n), Some(unit)) => Value::Text(format!("{}{}", n, unit)),
            (value, _) => value,
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n as f32)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::Tuple(v)
    }
}

impl<const N: usize> From<[f32; N]> for Value {
    fn from(v: [f32; N]) -> Self {
        Value::Tuple(v.to_vec())
    }
}

impl From<glam::Vec2> for Value {
    fn from(v: glam::Vec2) -> Self {
        Value::Tuple(vec![v.x, v.y])
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(record: BTreeMap<String, Value>) -> Self {
        Value::Record(record)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, n) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", n)?;
                }
                write!(f, ")")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Blend `from` toward `to` at progress `t`.
///
/// Matching shapes blend linearly (tuples element-wise, records per key).
/// Mismatched or non-numeric values step: `from` below 0.5, `to` from 0.5 on.
pub fn interpolate(from: &Value, to: &Value, t: f32) -> Value {
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => Value::Number(lerp(*a, *b, t)),
        (Value::Tuple(a), Value::Tuple(b)) if a.len() == b.len() => {
            Value::Tuple(a.iter().zip(b).map(|(a, b)| lerp(*a, *b, t)).collect())
        }
        (Value::Record(a), Value::Record(b)) if a.len() == b.len() && a.keys().eq(b.keys()) => {
            Value::Record(
                a.iter()
                    .zip(b.values())
                    .map(|((key, a), b)| (key.clone(), interpolate(a, b, t)))
                    .collect(),
            )
        }
        _ => step(from, to, t),
    }
}

#[inline]
fn step(from: &Value, to: &Value, t: f32) -> Value {
    if t < 0.5 {
        from.clone()
    } else {
        to.clone()
    }
}

/// Parse a leading numeric literal and trailing unit token: `"12.5px"` -> `(12.5, "px")`.
///
/// Leading/trailing whitespace is ignored. Returns `None` when the string does not
/// start with a number.
pub fn parse_unit(text: &str) -> Option<(f32, &str)> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by digits, so "2em" keeps its unit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let number = text[..end].parse::<f32>().ok()?;
    Some((number, text[end..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, f32)]) -> Value {
        Value::Record(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), Value::Number(*v)))
                .collect(),
        )
    }

    #[test]
    fn scalar_endpoints_and_midpoint() {
        let a = Value::Number(10.0);
        let b = Value::Number(30.0);
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 1.0), b);
        assert_eq!(interpolate(&a, &b, 0.5), Value::Number(20.0));
    }

    #[test]
    fn tuple_blends_element_wise() {
        let a = Value::Tuple(vec![0.0, 100.0, 50.0]);
        let b = Value::Tuple(vec![10.0, 0.0, 50.0]);
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 1.0), b);
        assert_eq!(interpolate(&a, &b, 0.5), Value::Tuple(vec![5.0, 50.0, 50.0]));
    }

    #[test]
    fn record_blends_per_key() {
        let a = record(&[("x", 0.0), ("y", 10.0)]);
        let b = record(&[("x", 4.0), ("y", 20.0)]);
        assert_eq!(interpolate(&a, &b, 0.25), record(&[("x", 1.0), ("y", 12.5)]));
    }

    #[test]
    fn mismatched_shapes_step_at_half() {
        let a = Value::from("block");
        let b = Value::from("none");
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 0.49), a);
        assert_eq!(interpolate(&a, &b, 0.5), b);
        assert_eq!(interpolate(&a, &b, 1.0), b);

        let short = Value::Tuple(vec![1.0, 2.0]);
        let long = Value::Tuple(vec![1.0, 2.0, 3.0]);
        assert_eq!(interpolate(&short, &long, 0.4), short);
        assert_eq!(interpolate(&short, &long, 0.5), long);

        let number = Value::Number(1.0);
        assert_eq!(interpolate(&number, &b, 0.3), number);

        let xy = record(&[("x", 0.0), ("y", 0.0)]);
        let xz = record(&[("x", 1.0), ("z", 1.0)]);
        assert_eq!(interpolate(&xy, &xz, 0.5), xz);
    }

    #[test]
    fn parses_number_with_unit() {
        assert_eq!(parse_unit("12.5px"), Some((12.5, "px")));
        assert_eq!(parse_unit("-45deg"), Some((-45.0, "deg")));
        assert_eq!(parse_unit(" 80 % "), Some((80.0, "%")));
        assert_eq!(parse_unit(".5em"), Some((0.5, "em")));
        assert_eq!(parse_unit("2em"), Some((2.0, "em")));
        assert_eq!(parse_unit("1e2ms"), Some((100.0, "ms")));
        assert_eq!(parse_unit("42"), Some((42.0, "")));
    }

    #[test]
    fn rejects_text_without_leading_number() {
        assert_eq!(parse_unit("auto"), None);
        assert_eq!(parse_unit("px10"), None);
        assert_eq!(parse_unit("-"), None);
        assert_eq!(parse_unit(""), None);
    }

    #[test]
    fn unit_split_and_rejoin() {
        let (value, unit) = Value::from("24px").split_unit();
        assert_eq!(value, Value::Number(24.0));
        assert_eq!(unit.as_deref(), Some("px"));
        assert_eq!(Value::Number(12.0).with_unit(Some("px")), Value::from("12px"));
        assert_eq!(Value::from("auto").split_unit().0, Value::from("auto"));
    }

    #[test]
    fn deserializes_from_json() {
        let v: Value = serde_json::from_str(r#"{"opacity": 1, "offset": [0, 4], "label": "on"}"#).unwrap();
        match v {
            Value::Record(fields) => {
                assert_eq!(fields["opacity"], Value::Number(1.0));
                assert_eq!(fields["offset"], Value::Tuple(vec![0.0, 4.0]));
                assert_eq!(fields["label"], Value::from("on"));
            }
            other => panic!("expected record, got {:?}", other),
        }
    }
}
