//! Progress store collaborator.
//!
//! The dashboard can keep a manually entered progress value in an external
//! spreadsheet backend. Only the contract lives here; the backend's wire
//! format is its own business.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::progress::indicator::ProgressPercent;

/// Errors reported by a progress store.
#[derive(Debug, Clone, Error)]
pub enum ProgressError {
    #[error("progress store unavailable: {0}")]
    Unavailable(String),

    #[error("progress update rejected: {0}")]
    Rejected(String),
}

/// Rows as returned by the backend: `{ "values": [[month, progress], ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRows {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ProgressRows {
    /// Progress stored for `month`, if a row for it exists.
    ///
    /// Values are parsed leniently: a leading integer is used, anything
    /// unparseable counts as zero.
    pub fn find(&self, month: &str) -> Option<ProgressPercent> {
        self.values
            .iter()
            .find(|row| row.first().and_then(Value::as_str) == Some(month))
            .map(|row| row.get(1).map(lenient_percent).unwrap_or(ProgressPercent::ZERO))
    }
}

fn lenient_percent(value: &Value) -> ProgressPercent {
    let parsed = match value {
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        Value::String(s) => leading_integer(s.trim()),
        _ => None,
    };
    ProgressPercent::clamped(parsed.unwrap_or(0))
}

fn leading_integer(s: &str) -> Option<i64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// External store for the monthly progress value.
pub trait ProgressStore: Send + Sync {
    /// All stored rows; the caller picks its month with [`ProgressRows::find`].
    fn get_progress(
        &self,
        month: &str,
    ) -> impl Future<Output = Result<ProgressRows, ProgressError>> + Send;

    /// Store `value` for `month`.
    fn update_progress(
        &self,
        value: ProgressPercent,
        month: &str,
    ) -> impl Future<Output = Result<(), ProgressError>> + Send;
}

/// Progress for `month`, zero when the store has no row for it.
pub async fn load_month_progress<S: ProgressStore>(
    store: &S,
    month: &str,
) -> Result<ProgressPercent, ProgressError> {
    let rows = store.get_progress(month).await?;
    Ok(rows.find(month).unwrap_or(ProgressPercent::ZERO))
}

/// A thread-safe in-process progress store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressStore {
    inner: Arc<DashMap<String, ProgressPercent>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.inner.len()
    }
}

impl ProgressStore for InMemoryProgressStore {
    async fn get_progress(&self, _month: &str) -> Result<ProgressRows, ProgressError> {
        let values = self
            .inner
            .iter()
            .map(|r| vec![Value::from(r.key().clone()), Value::from(r.value().value())])
            .collect();
        Ok(ProgressRows { values })
    }

    async fn update_progress(&self, value: ProgressPercent, month: &str) -> Result<(), ProgressError> {
        if month.trim().is_empty() {
            return Err(ProgressError::Rejected("month label is empty".into()));
        }
        self.inner.insert(month.to_string(), value);
        tracing::debug!(month, progress = value.value(), "Progress stored");
        Ok(())
    }
}
