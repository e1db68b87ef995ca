//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! ClientConfig.credentials (+ env overrides)
//!     → credentials.rs (immutable key/secret)
//!     → strategy.rs (StrategyKind → header set)
//!         BearerToken only:
//!         → token_manager.rs (cached token or single-flight exchange)
//! ```
//!
//! # Security Constraints
//! - Secrets and tokens never appear in Debug output or logs
//! - Header values carrying secrets are marked sensitive

pub mod credentials;
pub mod strategy;
pub mod token_manager;

pub use credentials::Credentials;
pub use strategy::{AuthMode, StrategyKind};
pub use token_manager::{Token, TokenManager};
