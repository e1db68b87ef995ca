//! Token manager with single-flight refresh.
//!
//! Manages the bearer token lifecycle:
//! - Token exchange against the auth endpoint (`POST {auth_url}`)
//! - In-memory caching until expiry
//! - Invalidation when a request made with the token is rejected
//!
//! # Concurrency
//! The cached state is a three-way enum behind a short-lived mutex. While an
//! exchange is running the state holds a [`Shared`] future; every caller
//! that arrives meanwhile awaits a clone of that same future, so N
//! concurrent callers produce exactly one network call and all observe the
//! same result (success or failure). The mutex is never held across an
//! `.await`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::auth::credentials::Credentials;
use crate::client::error::{ApiError, ApiResult};
use crate::observability::events::{DispatchEvent, DispatchObserver, TracingObserver};
use crate::observability::metrics;

/// A bearer token issued by the auth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_at_epoch_millis: i64,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at_epoch_millis: i64) -> Self {
        Self {
            value: value.into(),
            expires_at_epoch_millis,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at_epoch_millis(&self) -> i64 {
        self.expires_at_epoch_millis
    }

    /// Valid means the expiry is strictly after `now`.
    pub fn is_valid_at(&self, now_epoch_millis: i64) -> bool {
        now_epoch_millis < self.expires_at_epoch_millis
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at_epoch_millis", &self.expires_at_epoch_millis)
            .finish()
    }
}

type SharedExchange = Shared<BoxFuture<'static, ApiResult<Token>>>;

/// Exchanges attempted by one `valid_token` call when each issued token has
/// already lapsed by the time it is handed out.
const EXCHANGE_ROUNDS: usize = 3;

enum TokenState {
    Empty,
    Ready(Token),
    Pending(SharedExchange),
}

enum Lookup {
    Cached(Token),
    Wait(SharedExchange),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    api_key: &'a str,
    api_secret: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    token: Option<String>,
    /// Seconds; integral or fractional.
    #[serde(default)]
    expires_in: Option<f64>,
}

/// Acquires, caches and refreshes the bearer token for one client.
pub struct TokenManager {
    http: reqwest::Client,
    auth_url: String,
    credentials: Arc<Credentials>,
    default_ttl: Duration,
    timeout: Duration,
    state: Mutex<TokenState>,
    observer: Arc<dyn DispatchObserver>,
}

impl TokenManager {
    /// Create a token manager.
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client
    /// * `auth_url` - Token exchange endpoint
    /// * `credentials` - Key/secret posted to the exchange
    /// * `default_ttl` - Lifetime used when the response omits `expires_in`
    /// * `timeout` - Upper bound for one exchange call
    pub fn new(
        http: reqwest::Client,
        auth_url: impl Into<String>,
        credentials: Arc<Credentials>,
        default_ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            auth_url: auth_url.into(),
            credentials,
            default_ttl,
            timeout,
            state: Mutex::new(TokenState::Empty),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Route token lifecycle events to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Return a token whose expiry is in the future, exchanging credentials
    /// for a new one when the cache is empty or stale.
    ///
    /// A token that lapses between issue and hand-out triggers another
    /// exchange rather than being returned.
    ///
    /// # Errors
    /// [`ApiError::Authentication`] when the exchange fails or returns no token.
    pub async fn valid_token(&self) -> ApiResult<Token> {
        for _ in 0..EXCHANGE_ROUNDS {
            let pending = match self.lookup() {
                Lookup::Cached(token) => return Ok(token),
                Lookup::Wait(exchange) => exchange,
            };

            let result = pending.clone().await;

            // First waiter to finish publishes the outcome.
            {
                let mut state = self.state.lock();
                let still_pending =
                    matches!(&*state, TokenState::Pending(current) if current.ptr_eq(&pending));
                if still_pending {
                    *state = match &result {
                        Ok(token) => TokenState::Ready(token.clone()),
                        Err(_) => TokenState::Empty,
                    };
                }
            }

            let token = result?;
            if token.is_valid_at(now_epoch_millis()) {
                return Ok(token);
            }
            tracing::debug!("Exchanged token expired before use, refreshing again");
        }

        Err(ApiError::Authentication(
            "issued tokens expired before they could be used".into(),
        ))
    }

    fn lookup(&self) -> Lookup {
        let mut state = self.state.lock();
        let in_flight = match &*state {
            TokenState::Ready(token) if token.is_valid_at(now_epoch_millis()) => {
                return Lookup::Cached(token.clone());
            }
            TokenState::Pending(exchange) => Some(exchange.clone()),
            TokenState::Ready(_) | TokenState::Empty => None,
        };
        let exchange = match in_flight {
            Some(exchange) => exchange,
            None => {
                let exchange = self.start_exchange();
                *state = TokenState::Pending(exchange.clone());
                exchange
            }
        };
        Lookup::Wait(exchange)
    }

    /// Drop the cached token if it is still `used`.
    ///
    /// A newer token installed by a concurrent refresh is left alone.
    pub fn invalidate(&self, used: &Token) {
        let mut state = self.state.lock();
        if matches!(&*state, TokenState::Ready(current) if current == used) {
            *state = TokenState::Empty;
            drop(state);
            self.observer.on_event(&DispatchEvent::TokenInvalidated);
        }
    }

    /// Install a token obtained elsewhere (e.g. restored from a previous run).
    pub fn seed(&self, token: Token) {
        *self.state.lock() = TokenState::Ready(token);
    }

    fn start_exchange(&self) -> SharedExchange {
        let http = self.http.clone();
        let auth_url = self.auth_url.clone();
        let credentials = Arc::clone(&self.credentials);
        let default_ttl = self.default_ttl;
        let timeout = self.timeout;
        let observer = Arc::clone(&self.observer);

        async move {
            let result = match tokio::time::timeout(
                timeout,
                exchange(&http, &auth_url, &credentials, default_ttl),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ApiError::Authentication(format!(
                    "token exchange timed out after {:?}",
                    timeout
                ))),
            };

            match &result {
                Ok(token) => {
                    metrics::record_token_exchange("success");
                    observer.on_event(&DispatchEvent::TokenRefreshed {
                        expires_at_epoch_millis: token.expires_at_epoch_millis(),
                    });
                }
                Err(error) => {
                    metrics::record_token_exchange("failure");
                    observer.on_event(&DispatchEvent::TokenRefreshFailed {
                        error: error.clone(),
                    });
                }
            }
            result
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("auth_url", &self.auth_url)
            .field("default_ttl_secs", &self.default_ttl.as_secs())
            .finish()
    }
}

async fn exchange(
    http: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
    default_ttl: Duration,
) -> ApiResult<Token> {
    let body = ExchangeRequest {
        api_key: credentials.api_key(),
        api_secret: credentials.api_secret(),
    };

    let resp = http
        .post(auth_url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::Authentication(format!("token exchange failed: {e}")))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ApiError::Authentication(format!("token exchange failed: {e}")))?;

    if !status.is_success() {
        return Err(ApiError::Authentication(format!(
            "token endpoint returned status {}",
            status.as_u16()
        )));
    }

    let parsed: ExchangeResponse = serde_json::from_str(&text)
        .map_err(|e| ApiError::Authentication(format!("unreadable token response: {e}")))?;

    let value = parsed
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Authentication("token response contained no token".into()))?;

    let ttl = match parsed.expires_in {
        Some(secs) => Duration::try_from_secs_f64(secs).map_err(|_| {
            ApiError::Authentication(format!("token response has unusable expires_in {secs}"))
        })?,
        None => default_ttl,
    };

    let now = now_epoch_millis();
    let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let expires_at = now.saturating_add(ttl_millis);

    let token = Token::new(value, expires_at);
    if !token.is_valid_at(now) {
        return Err(ApiError::Authentication("token was already expired when issued".into()));
    }

    tracing::debug!(auth_url = %auth_url, expires_at, "Token exchange succeeded");
    Ok(token)
}

fn now_epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
