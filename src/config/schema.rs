//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.
//! Connection details (base URL, endpoints) have no defaults: they must be
//! supplied by the config file or the environment.

use serde::{Deserialize, Serialize};

use crate::auth::strategy::{AuthMode, StrategyKind};

/// Root configuration for the POS API client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Where the POS API lives.
    pub api: ApiConfig,

    /// API key and secret. Usually overridden from the environment.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Which authentication strategies to try, and in what order.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Timeout configuration.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Progress indicator settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// POS API location.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Primary base URL (e.g., "https://api.example.com").
    pub base_url: String,

    /// Additional base URLs tried, in order, after the primary one fails.
    #[serde(default)]
    pub fallback_base_urls: Vec<String>,

    /// Token exchange URL. Required by the token-based auth modes.
    #[serde(default)]
    pub auth_url: Option<String>,

    /// Endpoint paths appended to the base URL.
    pub endpoints: EndpointsConfig,
}

impl ApiConfig {
    /// All candidate base URLs, primary first.
    pub fn base_urls(&self) -> Vec<String> {
        std::iter::once(&self.base_url)
            .chain(self.fallback_base_urls.iter())
            .map(|url| url.trim_end_matches('/').to_string())
            .collect()
    }
}

/// Endpoint paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    /// Connectivity probe path (e.g., "/api/health").
    pub health: String,

    /// Sales query path (e.g., "/api/sales").
    pub sales: String,
}

/// API credentials as read from the config file.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Strategy selection mode.
    pub mode: AuthMode,

    /// Ordered strategy list, only consulted when `mode = "custom"`.
    pub strategies: Vec<StrategyKind>,

    /// Token lifetime assumed when the exchange response omits `expires_in`.
    pub default_token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::HeaderFallback,
            strategies: Vec::new(),
            default_token_ttl_secs: 3600,
        }
    }
}

impl AuthConfig {
    /// Resolve the configured mode into the ordered strategy list.
    pub fn strategy_order(&self) -> Vec<StrategyKind> {
        match self.mode {
            AuthMode::Custom => self.strategies.clone(),
            mode => mode.strategies().to_vec(),
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for a single dispatch attempt, in seconds.
    pub attempt_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            attempt_secs: 10,
            connect_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Progress indicator configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// Monthly sales target. Zero disables deriving progress from sales.
    pub monthly_target: f64,
}
