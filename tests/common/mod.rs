//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::TcpListener;

use pos_sales_client::auth::strategy::{AuthMode, StrategyKind};
use pos_sales_client::config::schema::{
    ApiConfig, AuthConfig, ClientConfig, CredentialsConfig, DashboardConfig, EndpointsConfig,
    ObservabilityConfig, TimeoutConfig,
};
use pos_sales_client::observability::events::{DispatchEvent, DispatchObserver};

pub const API_KEY: &str = "key";
pub const API_SECRET: &str = "secret";
/// `base64("key:secret")`
pub const BASIC_PAYLOAD: &str = "Basic a2V5OnNlY3JldA==";

/// Client config pointing every URL at `base_url`.
pub fn test_config(base_url: &str, mode: AuthMode) -> ClientConfig {
    ClientConfig {
        api: ApiConfig {
            base_url: base_url.to_string(),
            fallback_base_urls: Vec::new(),
            auth_url: Some(format!("{}/api/auth", base_url)),
            endpoints: EndpointsConfig {
                health: "/api/health".into(),
                sales: "/api/sales".into(),
            },
        },
        credentials: CredentialsConfig {
            api_key: API_KEY.into(),
            api_secret: API_SECRET.into(),
        },
        auth: AuthConfig {
            mode,
            ..AuthConfig::default()
        },
        timeouts: TimeoutConfig {
            attempt_secs: 5,
            connect_secs: 2,
        },
        observability: ObservabilityConfig::default(),
        dashboard: DashboardConfig::default(),
    }
}

/// Observer that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<DispatchEvent>>>);

impl Recorder {
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.0.lock().clone()
    }

    /// Strategies in the order attempts were started.
    pub fn started(&self) -> Vec<StrategyKind> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DispatchEvent::AttemptStarted { strategy, .. } => Some(strategy),
                _ => None,
            })
            .collect()
    }

    pub fn count_token_refreshes(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DispatchEvent::TokenRefreshed { .. }))
            .count()
    }
}

impl DispatchObserver for Recorder {
    fn on_event(&self, event: &DispatchEvent) {
        self.0.lock().push(event.clone());
    }
}

/// Start a backend that accepts connections and never answers.
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            match listener.accept().await {
                Ok((socket, _)) => held.push(socket),
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
