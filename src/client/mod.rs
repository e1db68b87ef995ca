//! POS API client facade.
//!
//! # Data Flow
//! ```text
//! caller (CLI / dashboard)
//!     → PosClient operation
//!     → dispatcher (strategy × base URL fallback, token manager on demand)
//!     → RawResponse
//!     → normalizer (sales only)
//!     → SalesData | ConnectionReport
//!
//! on failure:
//!     → ApiError (single, aggregated)
//!     → classify.rs → one user-facing message
//! ```
//!
//! # Design Decisions
//! - One client type; the strategy order comes from `AuthMode`, not from
//!   separate client implementations
//! - No partial data is returned alongside an error

pub mod classify;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::auth::credentials::Credentials;
use crate::auth::strategy::StrategyKind;
use crate::auth::token_manager::TokenManager;
use crate::config::schema::{ClientConfig, EndpointsConfig};
use crate::dispatch::RequestDispatcher;
use crate::observability::events::{DispatchObserver, TracingObserver};
use crate::sales::normalizer::normalize;
use crate::sales::types::{SalesData, SalesQuery};

pub use classify::classify;
pub use error::{ApiError, ApiResult};

const USER_AGENT: &str = concat!("pos-sales-client/", env!("CARGO_PKG_VERSION"));

/// Result of a successful connectivity probe.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub strategy: StrategyKind,
    pub url: String,
    pub status: u16,
    pub body: Value,
    pub checked_at: DateTime<Utc>,
}

/// Client for the POS API.
#[derive(Debug)]
pub struct PosClient {
    dispatcher: RequestDispatcher,
    token_manager: Option<Arc<TokenManager>>,
    strategies: Vec<StrategyKind>,
    endpoints: EndpointsConfig,
}

impl PosClient {
    /// Build a client that logs through `tracing`.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Build a client that reports attempts and token events to `observer`.
    ///
    /// # Errors
    /// [`ApiError::InvalidRequest`] if the HTTP client cannot be constructed.
    pub fn with_observer(
        config: &ClientConfig,
        observer: Arc<dyn DispatchObserver>,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        let credentials = Arc::new(Credentials::from(&config.credentials));
        let attempt_timeout = Duration::from_secs(config.timeouts.attempt_secs);

        let token_manager = config.api.auth_url.as_ref().map(|auth_url| {
            Arc::new(
                TokenManager::new(
                    http.clone(),
                    auth_url.clone(),
                    Arc::clone(&credentials),
                    Duration::from_secs(config.auth.default_token_ttl_secs),
                    attempt_timeout,
                )
                .with_observer(Arc::clone(&observer)),
            )
        });

        let mut dispatcher = RequestDispatcher::new(
            http,
            config.api.base_urls(),
            credentials,
            attempt_timeout,
        )
        .with_observer(observer);
        if let Some(tm) = &token_manager {
            dispatcher = dispatcher.with_token_manager(Arc::clone(tm));
        }

        let strategies = config.auth.strategy_order();
        tracing::info!(
            mode = %config.auth.mode,
            strategies = ?strategies,
            base_urls = ?dispatcher.base_urls(),
            "POS client initialized"
        );

        Ok(Self {
            dispatcher,
            token_manager,
            strategies,
            endpoints: config.api.endpoints.clone(),
        })
    }

    /// Ordered strategies this client tries.
    pub fn strategies(&self) -> &[StrategyKind] {
        &self.strategies
    }

    /// Token manager, present when an auth URL is configured.
    pub fn token_manager(&self) -> Option<&Arc<TokenManager>> {
        self.token_manager.as_ref()
    }

    /// Probe the health endpoint. Any 2xx JSON (or empty) body counts as healthy.
    pub async fn test_connection(&self) -> ApiResult<ConnectionReport> {
        self.probe(&self.endpoints.health).await
    }

    /// Probe the sales endpoint without a date range; a quick check that
    /// some strategy is accepted there.
    pub async fn probe_sales_endpoint(&self) -> ApiResult<ConnectionReport> {
        self.probe(&self.endpoints.sales).await
    }

    /// Sales for an explicit date range.
    pub async fn sales_for_range(&self, query: &SalesQuery) -> ApiResult<SalesData> {
        let response = self
            .dispatcher
            .dispatch(&self.endpoints.sales, Some(query), &self.strategies)
            .await?;
        normalize(&response, &query.period_label())
    }

    /// Sales for a calendar month (1-12).
    pub async fn sales_for_month(&self, year: i32, month: u32) -> ApiResult<SalesData> {
        self.sales_for_range(&SalesQuery::month(year, month)?).await
    }

    /// Sales for the current calendar month in local time.
    pub async fn current_month_sales(&self) -> ApiResult<SalesData> {
        let today = chrono::Local::now().date_naive();
        self.sales_for_range(&SalesQuery::month_containing(today)?).await
    }

    async fn probe(&self, endpoint: &str) -> ApiResult<ConnectionReport> {
        let response = self
            .dispatcher
            .dispatch(endpoint, None, &self.strategies)
            .await?;
        Ok(ConnectionReport {
            strategy: response.strategy,
            url: response.url,
            status: response.status,
            body: response.body,
            checked_at: Utc::now(),
        })
    }
}
