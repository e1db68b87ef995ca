//! Request dispatcher with ordered strategy fallback.
//!
//! # Responsibilities
//! - Issue a GET under one authentication strategy at a time
//! - Fall through the remaining strategies, then the remaining base URLs
//! - Bound every attempt with a timeout
//! - Record each attempt for the aggregated error

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::credentials::Credentials;
use crate::auth::strategy::StrategyKind;
use crate::auth::token_manager::{Token, TokenManager};
use crate::client::error::{ApiError, ApiResult};
use crate::dispatch::attempt::{AttemptResult, RawResponse};
use crate::observability::events::{DispatchEvent, DispatchObserver, TracingObserver};
use crate::observability::metrics;
use crate::sales::types::SalesQuery;

/// Header carrying the per-attempt request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Issues requests against the POS API, trying strategies in order.
#[derive(Clone)]
pub struct RequestDispatcher {
    http: reqwest::Client,
    /// Candidate base URLs, primary first.
    base_urls: Vec<String>,
    credentials: Arc<Credentials>,
    token_manager: Option<Arc<TokenManager>>,
    attempt_timeout: Duration,
    observer: Arc<dyn DispatchObserver>,
}

impl RequestDispatcher {
    pub fn new(
        http: reqwest::Client,
        base_urls: Vec<String>,
        credentials: Arc<Credentials>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_urls,
            credentials,
            token_manager: None,
            attempt_timeout,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Enable [`StrategyKind::BearerToken`] by attaching a token manager.
    pub fn with_token_manager(mut self, token_manager: Arc<TokenManager>) -> Self {
        self.token_manager = Some(token_manager);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    /// GET `endpoint` on each base URL under each strategy, in order, until
    /// one attempt succeeds.
    ///
    /// An attempt fails on a transport error, a non-2xx status or a body that
    /// is not JSON. Attempts run sequentially; the first success is returned
    /// and nothing after it is tried.
    ///
    /// The returned [`RawResponse`] carries every attempt made, ending with the
    /// successful one.
    ///
    /// # Errors
    /// [`ApiError::AllStrategiesFailed`] with every attempt in order, or
    /// [`ApiError::InvalidRequest`] when `strategies` is empty.
    pub async fn dispatch(
        &self,
        endpoint: &str,
        query: Option<&SalesQuery>,
        strategies: &[StrategyKind],
    ) -> ApiResult<RawResponse> {
        if strategies.is_empty() || self.base_urls.is_empty() {
            return Err(ApiError::InvalidRequest(
                "no base URL or authentication strategy configured".into(),
            ));
        }

        let params = query.map(SalesQuery::to_params).unwrap_or_default();
        let mut attempts = Vec::with_capacity(self.base_urls.len() * strategies.len());

        for base_url in &self.base_urls {
            let url = format!("{}{}", base_url, endpoint);

            for &strategy in strategies {
                let request_id = Uuid::new_v4();
                self.observer.on_event(&DispatchEvent::AttemptStarted {
                    request_id,
                    strategy,
                    url: url.clone(),
                });

                let started = Instant::now();
                match self.attempt(&url, &params, strategy, request_id).await {
                    Ok((status, body)) => {
                        metrics::record_attempt(strategy, "success");
                        self.observer.on_event(&DispatchEvent::AttemptSucceeded {
                            request_id,
                            strategy,
                            url: url.clone(),
                            status,
                            elapsed: started.elapsed(),
                        });
                        attempts.push(AttemptResult {
                            request_id,
                            strategy,
                            url: url.clone(),
                            error: None,
                        });
                        return Ok(RawResponse {
                            strategy,
                            url,
                            status,
                            body,
                            attempts,
                        });
                    }
                    Err(error) => {
                        metrics::record_attempt(strategy, "failure");
                        self.observer.on_event(&DispatchEvent::AttemptFailed {
                            request_id,
                            strategy,
                            url: url.clone(),
                            error: error.clone(),
                            elapsed: started.elapsed(),
                        });
                        attempts.push(AttemptResult {
                            request_id,
                            strategy,
                            url: url.clone(),
                            error: Some(error),
                        });
                    }
                }
            }
        }

        Err(ApiError::AllStrategiesFailed { attempts })
    }

    async fn attempt(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        strategy: StrategyKind,
        request_id: Uuid,
    ) -> ApiResult<(u16, Value)> {
        let token = self.token_for(strategy).await?;
        let headers = strategy.headers(&self.credentials, token.as_ref())?;

        let request = self
            .http
            .get(url)
            .headers(headers)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .query(params);

        let result = match tokio::time::timeout(self.attempt_timeout, send(request)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Transport(format!(
                "request timed out after {:?}",
                self.attempt_timeout
            ))),
        };

        if let (Some(token), Err(ApiError::HttpStatus { status: 401 | 403, .. })) = (&token, &result) {
            if let Some(tm) = &self.token_manager {
                tm.invalidate(token);
            }
        }

        result
    }

    async fn token_for(&self, strategy: StrategyKind) -> ApiResult<Option<Token>> {
        if !strategy.requires_token() {
            return Ok(None);
        }
        let tm = self.token_manager.as_ref().ok_or_else(|| {
            ApiError::Authentication("bearer_token strategy needs a configured auth_url".into())
        })?;
        tm.valid_token().await.map(Some)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("base_urls", &self.base_urls)
            .field("token_manager", &self.token_manager)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

async fn send(request: reqwest::RequestBuilder) -> ApiResult<(u16, Value)> {
    let resp = request
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            message: status_message(status, &text),
        });
    }

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse(e.to_string()))?
    };

    Ok((status.as_u16(), body))
}

/// Prefer the envelope's `message`, fall back to the reason phrase.
fn status_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unexpected status".to_string())
}
