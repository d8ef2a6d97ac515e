//! Structural comparison of a policy test's expected document against what
//! the engine actually returned.

use serde_json::Value;

/// Structural equality: booleans as booleans, numerics as the same
/// floating-point value (`int`/`float` interchangeable), strings exact,
/// maps recursive with identical key sets, arrays ordered with identical
/// length. Kind mismatches fail.
pub fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_match(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, expected_value)| {
                    b.get(key)
                        .is_some_and(|actual_value| values_match(expected_value, actual_value))
                })
        }
        _ => false,
    }
}
