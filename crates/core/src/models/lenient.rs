//! Forgiving deserializers for API payload fields.
//!
//! The backend is not strict about numeric fields: amounts and ids arrive as
//! numbers, numeric strings, or `null` depending on the endpoint. These
//! helpers collapse all of that into `Option`, so absence stays distinct from
//! zero inside the models. List fields drop records they cannot use instead
//! of failing the whole payload.

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::transaction::TransactionType;

fn value_to_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Number, numeric string, or null → `Option<f64>`. Anything else is `None`.
pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Integer or integer string → `Option<i64>`.
pub fn i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Empty strings become `None`; numbers are kept as their text.
pub fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `"YYYY-MM-DD"` (optionally followed by a time part) → `Option<NaiveDate>`.
pub fn date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(|s| {
        let day = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }))
}

/// Integer or integer string → `i64`. Anything else fails, so the enclosing
/// record can be dropped by [`valid_items`].
pub fn i64_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    i64_opt(deserializer)?.ok_or_else(|| D::Error::custom("expected an integer id"))
}

/// String, number, or null → `String`. Null and other shapes read as `""`.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// `"DEPOSIT"` (any case) is a deposit; null, non-strings, and unknown
/// values read as a withdrawal.
pub fn transaction_type<'de, D>(deserializer: D) -> Result<TransactionType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => TransactionType::from(s),
        _ => TransactionType::Withdrawal,
    })
}

/// Array or null → `Vec<T>`, dropping elements that do not decode.
pub fn vec_skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => valid_items(items),
        _ => Vec::new(),
    })
}

/// Decode each element on its own and keep the ones that fit `T`.
pub fn valid_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.len() < total {
        tracing::warn!(dropped = total - kept.len(), "skipped malformed records");
    }
    kept
}
