//! Equality rules for matching plain values.
//!
//! Numbers written as `1` and `1.0` are the same number everywhere: when
//! matching collection keys and when comparing whole values.

use serde_json::{Number, Value};

fn numbers_eq(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}

/// Strict equality: numbers compare by numeric value, everything else
/// structurally. Values of different types are never equal.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        _ => a == b,
    }
}

/// Deep structural equality with numbers compared by numeric value at every
/// level.
pub fn deep_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| deep_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, a)| y.get(key).is_some_and(|b| deep_eq(a, b)))
        }
        _ => a == b,
    }
}

/// Loose equality: strict equality, plus a number equals a string that parses
/// to the same number.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if strict_eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .zip(n.as_f64())
            .is_some_and(|(parsed, number)| parsed == number),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_eq() {
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(strict_eq(&json!("a"), &json!("a")));
        assert!(strict_eq(&json!({ "a": [1] }), &json!({ "a": [1] })));
        assert!(!strict_eq(&json!(1), &json!("1")));
        assert!(!strict_eq(&json!(null), &json!(false)));
    }

    #[test]
    fn test_deep_eq() {
        assert!(deep_eq(&json!({ "a": [1, { "b": 2 }] }), &json!({ "a": [1.0, { "b": 2.0 }] })));
        assert!(!deep_eq(&json!({ "a": [1] }), &json!({ "a": [1, 2] })));
        assert!(!deep_eq(&json!({ "a": 1 }), &json!({ "b": 1 })));
        assert!(!deep_eq(&json!([1]), &json!(["1"])));
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(&json!(1), &json!("1")));
        assert!(loose_eq(&json!("2.5"), &json!(2.5)));
        assert!(!loose_eq(&json!(1), &json!("one")));
        assert!(!loose_eq(&json!(true), &json!("true")));
    }
}
