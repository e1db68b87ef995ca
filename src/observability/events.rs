//! Dispatch observer hook.
//!
//! # Responsibilities
//! - Describe every attempt and token lifecycle step as a structured event
//! - Let callers redirect or capture those events (tests, UIs)
//! - Default to structured `tracing` output

use std::time::Duration;

use uuid::Uuid;

use crate::auth::strategy::StrategyKind;
use crate::client::error::ApiError;

/// Something observable happened while talking to the POS API.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    AttemptStarted {
        request_id: Uuid,
        strategy: StrategyKind,
        url: String,
    },
    AttemptSucceeded {
        request_id: Uuid,
        strategy: StrategyKind,
        url: String,
        status: u16,
        elapsed: Duration,
    },
    AttemptFailed {
        request_id: Uuid,
        strategy: StrategyKind,
        url: String,
        error: ApiError,
        elapsed: Duration,
    },
    TokenRefreshed {
        expires_at_epoch_millis: i64,
    },
    TokenRefreshFailed {
        error: ApiError,
    },
    TokenInvalidated,
}

/// Receives [`DispatchEvent`]s. Must not block: it runs inline with requests.
pub trait DispatchObserver: Send + Sync {
    fn on_event(&self, event: &DispatchEvent);
}

impl<F> DispatchObserver for F
where
    F: Fn(&DispatchEvent) + Send + Sync,
{
    fn on_event(&self, event: &DispatchEvent) {
        self(event)
    }
}

/// Logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn on_event(&self, event: &DispatchEvent) {
        match event {
            DispatchEvent::AttemptStarted {
                request_id,
                strategy,
                url,
            } => {
                tracing::debug!(%request_id, %strategy, url = %url, "Dispatching request");
            }
            DispatchEvent::AttemptSucceeded {
                request_id,
                strategy,
                url,
                status,
                elapsed,
            } => {
                tracing::info!(
                    %request_id,
                    %strategy,
                    url = %url,
                    status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request succeeded"
                );
            }
            DispatchEvent::AttemptFailed {
                request_id,
                strategy,
                url,
                error,
                elapsed,
            } => {
                tracing::warn!(
                    %request_id,
                    %strategy,
                    url = %url,
                    error = %error,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Attempt failed, trying next strategy"
                );
            }
            DispatchEvent::TokenRefreshed {
                expires_at_epoch_millis,
            } => {
                tracing::info!(expires_at = expires_at_epoch_millis, "Bearer token refreshed");
            }
            DispatchEvent::TokenRefreshFailed { error } => {
                tracing::error!(error = %error, "Token exchange failed");
            }
            DispatchEvent::TokenInvalidated => {
                tracing::info!("Bearer token rejected by server, cache cleared");
            }
        }
    }
}
