//! Numeric Coercion
//!
//! One parse-or-default policy shared by the whole engine:
//! - finite numbers pass through unchanged
//! - numeric strings (`"12.5"`, `" 7 "`) are parsed
//! - everything else (null, booleans, NaN/∞, unparsable text) becomes the default
//!
//! The serde helpers at the bottom apply the same policy while deserializing
//! records, so a single bad field never rejects a whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a finite number, if it is one.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Interpret a JSON value as a number, falling back to `default`.
pub fn to_number_or_default(value: &Value, default: f64) -> f64 {
    to_number(value).unwrap_or(default)
}

/// Replace NaN and infinities with `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Guarded ratio: 0 when the denominator is zero or the result is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or(numerator / denominator, 0.0)
}

/// Round to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    finite_or((value * 100.0).round() / 100.0, 0.0)
}

/// `f64` field: missing, null or malformed values become 0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0.0, |v| to_number_or_default(v, 0.0)))
}

/// `f64` field with a non-zero default: null or malformed values become
/// `default` instead of 0. Call from a per-field wrapper.
pub fn lenient_f64_or<'de, D>(deserializer: D, default: f64) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(default, |v| to_number_or_default(v, default)))
}

/// Flag field written as a bool, a 0/1 integer or a string. Null and
/// anything unrecognised read as `false`.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
        Some(v) => to_number(&v).is_some_and(|n| n != 0.0),
        None => false,
    })
}

/// Text field that may arrive as a number; null becomes an empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Optional `f64` field: malformed values are treated as absent, never as 0.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_number))
}

/// Optional integer field (Unix timestamps). Fractions are truncated.
pub fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| to_number(v).map(|f| f as i64)),
        _ => to_number(v).map(|f| f as i64),
    }))
}

/// Optional text field that some exports write as a bare number (`20240101`).
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => n.as_u64().map(|u| u.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number_or_default() {
        assert_eq!(to_number_or_default(&json!(12.5), 0.0), 12.5);
        assert_eq!(to_number_or_default(&json!(" 60.48 "), 0.0), 60.48);
        assert_eq!(to_number_or_default(&json!("abc"), 0.0), 0.0);
        assert_eq!(to_number_or_default(&json!(null), 1.0), 1.0);
        assert_eq!(to_number_or_default(&json!(true), 3.0), 3.0);
        assert_eq!(to_number_or_default(&json!("NaN"), 0.0), 0.0);
        assert_eq!(to_number_or_default(&json!("inf"), 2.0), 2.0);
    }

    #[test]
    fn test_safe_div_never_leaks_non_finite() {
        assert_eq!(safe_div(15.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(f64::MAX, f64::MIN_POSITIVE), 0.0);
        assert_eq!(safe_div(15.0, 100.0), 0.15);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.785_383), 0.79);
        assert_eq!(round2(99.999), 100.0);
        assert_eq!(round2(f64::NAN), 0.0);
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_f64")]
        a: f64,
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        b: Option<f64>,
        #[serde(default, deserialize_with = "lenient_opt_i64")]
        ts: Option<i64>,
        #[serde(default, deserialize_with = "lenient_opt_string")]
        date: Option<String>,
    }

    #[test]
    fn test_lenient_fields() {
        let row: Row =
            serde_json::from_value(json!({"a": "bad", "b": "42", "ts": 1.7e9, "date": 20240101}))
                .unwrap();
        assert_eq!(row.a, 0.0);
        assert_eq!(row.b, Some(42.0));
        assert_eq!(row.ts, Some(1_700_000_000));
        assert_eq!(row.date.as_deref(), Some("20240101"));

        let empty: Row = serde_json::from_value(json!({"b": null, "date": "  "})).unwrap();
        assert_eq!(empty.a, 0.0);
        assert_eq!(empty.b, None);
        assert_eq!(empty.ts, None);
        assert_eq!(empty.date, None);
    }

    fn factor_or_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        lenient_f64_or(deserializer, 1.0)
    }

    #[derive(Debug, Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "factor_or_one")]
        factor: f64,
        #[serde(default, deserialize_with = "lenient_bool")]
        deleted: bool,
        #[serde(default, deserialize_with = "lenient_string")]
        id: String,
    }

    #[test]
    fn test_defaulted_and_flag_fields() {
        let row: Flags =
            serde_json::from_value(json!({"factor": null, "deleted": 1, "id": 1700000000}))
                .unwrap();
        assert_eq!(row.factor, 1.0);
        assert!(row.deleted);
        assert_eq!(row.id, "1700000000");

        let row: Flags =
            serde_json::from_value(json!({"factor": "1.4", "deleted": null, "id": null})).unwrap();
        assert_eq!(row.factor, 1.4);
        assert!(!row.deleted);
        assert_eq!(row.id, "");

        let row: Flags = serde_json::from_value(json!({"factor": "hot", "deleted": "true"})).unwrap();
        assert_eq!(row.factor, 1.0);
        assert!(row.deleted);
    }
}
