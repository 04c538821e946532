//! Request payloads and response envelopes of the savings REST API.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::lenient;

/// Every successful response wraps its payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub user_id: i64,
    pub amount: f64,
    pub note: String,
}

/// `date` is the `"YYYY-MM-DD"` of the deposit being drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub category: i64,
    pub withdraw_amount: f64,
    pub date: String,
    pub note: String,
}

/// Create/update body for a savings category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: String,
    /// Goal target
    pub amount: f64,
    #[serde(rename = "type")]
    pub category_type: String,
    pub goal_deadline: Option<NaiveDate>,
}

/// Payload of a single-object response. A missing or null `data` means the
/// backend answered without a payload.
pub fn envelope_data<T: DeserializeOwned>(body: Value) -> Result<T, CoreError> {
    let envelope: Envelope<T> = serde_json::from_value(body)?;
    envelope.data.ok_or(CoreError::EmptyResponse)
}

/// Payload of a list response. A missing or null `data` is an empty list, and
/// elements that do not decode are skipped.
pub fn envelope_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, CoreError> {
    let envelope: Envelope<Value> = serde_json::from_value(body)?;
    match envelope.data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(lenient::valid_items(items)),
        Some(other) => Ok(serde_json::from_value(other)?),
    }
}

/// Pull the most useful message out of an error body: `error.details`, then
/// `error.message`, then `message`.
pub fn extract_error(body: Option<&Value>) -> Option<String> {
    let body = body?;
    let text = |v: Option<&Value>| v.and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string);

    let error = body.get("error");
    text(error.and_then(|e| e.get("details")))
        .or_else(|| text(error.and_then(|e| e.get("message"))))
        .or_else(|| text(body.get("message")))
}

/// The login endpoint has returned the token both at the top level and
/// inside `data`; accept either.
pub fn extract_token(body: &Value) -> Option<String> {
    body.get("token")
        .or_else(|| body.get("data").and_then(|d| d.get("token")))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
