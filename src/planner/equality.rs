//! Semantic equality of property values.
//!
//! Two values are equal when they have the same structure: mappings
//! compare key by key regardless of insertion order, sequences compare
//! element-wise in order, and numbers compare by numeric value so `1` and
//! `1.0` are the same. This matches comparing the canonical encodings
//! produced by [`crate::config::canonical_json`].

use serde_json::{Map, Number, Value};

/// Compares two optional values. A missing value only equals another
/// missing value; an explicit `null` is a present value.
///
/// Treating a missing key and `null` as different is deliberate: a key that
/// appears on one side only is always reported, so an update never comes
/// out with an empty list of property changes.
#[must_use]
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => value_eq(a, b),
        _ => false,
    }
}

/// Compares two property maps as wholes.
#[must_use]
pub fn maps_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| value_eq(value, other)))
}

/// Compares two present values.
#[must_use]
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| value_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => maps_equal(a, b),
        _ => false,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (integer(a), integer(b)) {
        (Some(x), Some(y)) => x == y,
        (Some(i), None) => b.as_f64().is_some_and(|f| float_equals_integer(f, i)),
        (None, Some(i)) => a.as_f64().is_some_and(|f| float_equals_integer(f, i)),
        (None, None) => a.as_f64() == b.as_f64(),
    }
}

/// Any `i64` or `u64` widened without loss.
fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison: the float must be integral and hold exactly `i`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn float_equals_integer(f: f64, i: i128) -> bool {
    f.fract() == 0.0
        && (-9_223_372_036_854_775_808.0..18_446_744_073_709_551_616.0).contains(&f)
        && f as i128 == i
}
