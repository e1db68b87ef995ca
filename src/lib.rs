//! POS Sales Client Library
//!
//! Talks to a point-of-sale API to fetch monthly sales figures, trying
//! several authentication strategies and candidate base URLs until one
//! works, and turns the result into a monthly progress indicator.

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod observability;
pub mod progress;
pub mod sales;

pub use auth::{AuthMode, Credentials, StrategyKind, Token, TokenManager};
pub use client::{classify, ApiError, ApiResult, ConnectionReport, PosClient};
pub use config::ClientConfig;
pub use sales::{SalesData, SalesQuery};
