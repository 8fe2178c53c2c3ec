//! Structural equality for hierarchy documents
//!
//! Objects compare as key/value sets, arrays compare element by element in
//! order, and scalars compare by type and value. A key holding `null` is
//! not the same as an absent key.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Whether two documents are structurally equivalent
pub fn equivalent(a: &Value, b: &Value) -> bool {
    first_difference(a, b).is_none()
}

/// Where and why two documents first diverge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// JSON pointer to the diverging location (`""` is the root)
    pub path: String,
    /// What differs at that location
    pub reason: String,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "at {}: {}", path, self.reason)
    }
}

/// Find the first point where `expected` and `actual` diverge
///
/// Object keys are visited in sorted order so the reported difference is
/// deterministic. Returns `None` when the documents are equivalent.
pub fn first_difference(expected: &Value, actual: &Value) -> Option<Difference> {
    let mut path = String::new();
    diff_value(expected, actual, &mut path)
}

fn diff_value(expected: &Value, actual: &Value, path: &mut String) -> Option<Difference> {
    match (expected, actual) {
        (Value::Null, Value::Null) => None,
        (Value::Bool(x), Value::Bool(y)) if x == y => None,
        (Value::String(x), Value::String(y)) if x == y => None,
        (Value::Number(x), Value::Number(y)) if numbers_equal(x, y) => None,
        (Value::Object(x), Value::Object(y)) => diff_object(x, y, path),
        (Value::Array(x), Value::Array(y)) => diff_array(x, y, path),
        (x, y) if kind(x) != kind(y) => Some(difference(
            path,
            format!("expected {}, got {}", kind(x), kind(y)),
        )),
        (x, y) => Some(difference(path, format!("expected {}, got {}", x, y))),
    }
}

fn diff_object(
    expected: &Map<String, Value>,
    actual: &Map<String, Value>,
    path: &mut String,
) -> Option<Difference> {
    let mut keys: Vec<&String> = expected.keys().chain(actual.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        let len = path.len();
        push_token(path, key);
        let found = match (expected.get(key), actual.get(key)) {
            (Some(x), Some(y)) => diff_value(x, y, path),
            (Some(_), None) => Some(difference(path, "missing in retrieved".to_string())),
            (None, Some(_)) => Some(difference(path, "unexpected in retrieved".to_string())),
            (None, None) => None,
        };
        if found.is_some() {
            return found;
        }
        path.truncate(len);
    }
    None
}

fn diff_array(expected: &[Value], actual: &[Value], path: &mut String) -> Option<Difference> {
    if expected.len() != actual.len() {
        return Some(difference(
            path,
            format!(
                "expected {} elements, got {}",
                expected.len(),
                actual.len()
            ),
        ));
    }

    for (i, (x, y)) in expected.iter().zip(actual).enumerate() {
        let len = path.len();
        push_token(path, &i.to_string());
        if let Some(found) = diff_value(x, y, path) {
            return Some(found);
        }
        path.truncate(len);
    }
    None
}

/// Numbers compare by value, so `1` and `1.0` match but `"1"` never does.
/// An integer only matches a float holding exactly that integer.
fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (as_integer(x), as_integer(y)) {
        (Some(a), Some(b)) => a == b,
        (Some(i), None) => y.as_f64().is_some_and(|f| float_equals_integer(f, i)),
        (None, Some(i)) => x.as_f64().is_some_and(|f| float_equals_integer(f, i)),
        (None, None) => x.as_f64() == y.as_f64(),
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// True when `f` converts to `i` without rounding in either direction
fn float_equals_integer(f: f64, i: i128) -> bool {
    // 2^127, the exclusive bound of i128
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) && f as i128 == i
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append an RFC 6901 reference token
fn push_token(path: &mut String, token: &str) {
    path.push('/');
    path.push_str(&token.replace('~', "~0").replace('/', "~1"));
}

fn difference(path: &str, reason: String) -> Difference {
    Difference {
        path: path.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reflexive() {
        let samples = [
            json!(null),
            json!(3.25),
            json!("leaf"),
            json!([1, [2, [3]], {"a": null}]),
            json!({"id": 42, "name": "root", "children": [{"id": 43, "name": "leaf"}]}),
        ];
        for value in &samples {
            assert!(equivalent(value, value), "not reflexive: {}", value);
        }
    }

    #[test]
    fn test_key_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert!(equivalent(&a, &b));
    }

    #[test]
    fn test_array_order_is_significant() {
        let diff = first_difference(&json!({"c": [1, 2]}), &json!({"c": [2, 1]})).unwrap();
        assert_eq!(diff.path, "/c/0");
        assert!(!equivalent(&json!({"c": [1, 2]}), &json!({"c": [2, 1]})));
    }

    #[test]
    fn test_missing_field_is_a_difference() {
        let diff = first_difference(&json!({"a": 1, "b": 2}), &json!({"a": 1})).unwrap();
        assert_eq!(diff.path, "/b");
        assert_eq!(diff.reason, "missing in retrieved");
    }

    #[test]
    fn test_added_field_is_a_difference() {
        let diff = first_difference(&json!({"a": 1}), &json!({"a": 1, "created": "now"}))
            .unwrap();
        assert_eq!(diff.path, "/created");
        assert_eq!(diff.reason, "unexpected in retrieved");
    }

    #[test]
    fn test_null_is_not_absent() {
        assert!(!equivalent(&json!({"a": 1, "b": null}), &json!({"a": 1})));
        assert!(!equivalent(&json!({"a": 1}), &json!({"a": 1, "b": null})));
    }

    #[test]
    fn test_no_cross_type_coercion() {
        assert!(!equivalent(&json!("1"), &json!(1)));
        assert!(!equivalent(&json!(true), &json!(1)));
        assert!(!equivalent(&json!(null), &json!(false)));
        assert!(!equivalent(&json!([]), &json!({})));

        let diff = first_difference(&json!({"id": 1}), &json!({"id": "1"})).unwrap();
        assert_eq!(diff.reason, "expected number, got string");
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let a: Value = serde_json::from_str(r#"{"w": 1, "h": 2.50}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"w": 1.0, "h": 2.5}"#).unwrap();
        assert!(equivalent(&a, &b));
        assert!(!equivalent(&json!(1), &json!(2)));
        assert!(!equivalent(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn test_integer_never_matches_a_rounded_float() {
        // 2^53 + 1 has no f64 representation and rounds down to 2^53
        let stored: Value = serde_json::from_str(r#"{"id": 9007199254740993}"#).unwrap();
        let fetched: Value = serde_json::from_str(r#"{"id": 9007199254740992.0}"#).unwrap();
        let diff = first_difference(&stored, &fetched).unwrap();
        assert_eq!(diff.path, "/id");
        assert!(!equivalent(&fetched, &stored));

        let max: Value = serde_json::from_str("18446744073709551615").unwrap();
        let rounded: Value = serde_json::from_str("18446744073709551615.0").unwrap();
        assert!(rounded.is_f64());
        assert!(!equivalent(&max, &rounded));
        assert!(!equivalent(&json!(u64::MAX), &json!(u64::MAX as f64)));

        // Exactly representable large integers still match their float form
        let exact: Value = serde_json::from_str("9007199254740992.0").unwrap();
        assert!(equivalent(&json!(9007199254740992_i64), &exact));
        assert!(!equivalent(&json!(3), &json!(3.5)));
    }

    #[test]
    fn test_nested_difference_path() {
        let original = json!({"id": 42, "children": [{"id": 43, "name": "leaf"}]});
        let retrieved = json!({"id": 42, "children": [{"id": 43, "name": "Leaf"}]});
        let diff = first_difference(&original, &retrieved).unwrap();
        assert_eq!(diff.path, "/children/0/name");
        assert_eq!(diff.to_string(), "at /children/0/name: expected \"leaf\", got \"Leaf\"");
    }

    #[test]
    fn test_pointer_tokens_are_escaped() {
        let diff = first_difference(&json!({"a/b": 1}), &json!({"a/b": 2})).unwrap();
        assert_eq!(diff.path, "/a~1b");
    }

    #[test]
    fn test_root_difference_displays_slash() {
        let diff = first_difference(&json!([1]), &json!([1, 2])).unwrap();
        assert_eq!(diff.path, "");
        assert_eq!(diff.to_string(), "at /: expected 1 elements, got 2");
    }
}
