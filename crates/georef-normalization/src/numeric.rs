//! Numeric value helpers.

use serde_json::{Number, Value};

/// Parses a string as f64, returning None for invalid, empty or non-finite strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Interpret a JSON value as a number: JSON numbers and numeric strings.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_f64(text),
        _ => None,
    }
}

/// A JSON number for a finite float.
pub fn number_value(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_numbers_and_numeric_strings() {
        assert_eq!(value_as_f64(&json!(10)), Some(10.0));
        assert_eq!(value_as_f64(&json!(-2.5)), Some(-2.5));
        assert_eq!(value_as_f64(&json!(" 12.5 ")), Some(12.5));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(value_as_f64(&json!("ten")), None);
        assert_eq!(value_as_f64(&json!("")), None);
        assert_eq!(value_as_f64(&json!("NaN")), None);
        assert_eq!(value_as_f64(&json!("inf")), None);
        assert_eq!(value_as_f64(&json!(true)), None);
        assert_eq!(value_as_f64(&json!([1])), None);
        assert_eq!(value_as_f64(&json!({"v": 1})), None);
    }

    #[test]
    fn non_finite_floats_have_no_json_number() {
        assert!(number_value(f64::NAN).is_none());
        assert!(number_value(f64::INFINITY).is_none());
        assert_eq!(number_value(3.5), Some(json!(3.5)));
    }
}
