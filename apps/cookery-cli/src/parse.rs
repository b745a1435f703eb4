//! Value parsers for `field=value` command-line pairs.
use serde_json::Value;

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value.trim())),
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}

/// `ID=3` filters on the number 3, `ID="3"` on the string; bare words are strings.
pub fn filter(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = split_pair(raw)?;
    let value = match serde_json::from_str::<Value>(value) {
        Ok(v) if !v.is_array() && !v.is_object() => v,
        _ => Value::String(value.to_string()),
    };
    Ok((field.to_string(), value))
}

pub fn boost(raw: &str) -> Result<(String, f64), String> {
    let (field, value) = split_pair(raw)?;
    let weight: f64 = value.parse().map_err(|_| format!("boost weight for '{field}' must be a number, got '{value}'"))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("boost weight for '{field}' must be finite and non-negative"));
    }
    Ok((field.to_string(), weight))
}
