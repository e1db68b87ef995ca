//! Per-attempt records and the raw response type.

use serde_json::Value;
use uuid::Uuid;

use crate::auth::strategy::StrategyKind;
use crate::client::error::ApiError;

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    pub request_id: Uuid,
    pub strategy: StrategyKind,
    pub url: String,
    /// `None` when the attempt succeeded.
    pub error: Option<ApiError>,
}

impl AttemptResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A 2xx response whose body parsed as JSON.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Strategy that produced this response.
    pub strategy: StrategyKind,
    /// Full request URL, without query string.
    pub url: String,
    pub status: u16,
    /// Parsed body; `Value::Null` for an empty body.
    pub body: Value,
    /// Every attempt made for this dispatch, in order; the last one succeeded.
    pub attempts: Vec<AttemptResult>,
}
