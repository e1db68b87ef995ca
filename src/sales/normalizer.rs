//! Maps POS API envelopes onto [`SalesData`].
//!
//! Envelope: `{ "success": bool, "data": { ... }, "message": "..." }`.
//! `data.total_sales`, `data.currency` and `data.transaction_count` are read
//! leniently; absent or unusable values fall back to `0` / `"USD"`.

use serde_json::{Map, Value};

use crate::client::error::{ApiError, ApiResult};
use crate::dispatch::attempt::RawResponse;
use crate::sales::types::SalesData;

pub const DEFAULT_CURRENCY: &str = "USD";
const UNSPECIFIED_FAILURE: &str = "unspecified failure";

/// Normalize a sales response. `period` comes from the query, not the body.
pub fn normalize(response: &RawResponse, period: &str) -> ApiResult<SalesData> {
    normalize_body(&response.body, period)
}

/// Normalize an already-parsed envelope.
///
/// # Errors
/// - [`ApiError::MalformedResponse`] if the envelope or `data` is not an object
/// - [`ApiError::ApiLogic`] if `success` is not `true` or `data` is missing
pub fn normalize_body(body: &Value, period: &str) -> ApiResult<SalesData> {
    let envelope = body
        .as_object()
        .ok_or_else(|| ApiError::MalformedResponse("response envelope is not a JSON object".into()))?;

    let success = envelope.get("success").and_then(Value::as_bool).unwrap_or(false);
    let data = envelope.get("data").filter(|d| !d.is_null());

    let data = match (success, data) {
        (true, Some(data)) => data,
        _ => {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(UNSPECIFIED_FAILURE);
            return Err(ApiError::ApiLogic(message.to_string()));
        }
    };

    let data = data
        .as_object()
        .ok_or_else(|| ApiError::MalformedResponse("`data` is not a JSON object".into()))?;

    Ok(SalesData {
        total: number(data, "total_sales").unwrap_or(0.0),
        currency: data
            .get("currency")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string(),
        period: period.to_string(),
        transactions: count(data, "transaction_count").unwrap_or(0),
    })
}

fn number(data: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|n| n.is_finite())
}

fn count(data: &Map<String, Value>, key: &str) -> Option<u64> {
    number(data, key).filter(|n| *n >= 0.0).map(|n| n as u64)
}
