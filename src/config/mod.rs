//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (POS_API_KEY, POS_API_SECRET, POS_BASE_URL)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to PosClient at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Connection details have no defaults; tuning knobs do
//! - Secrets are expected from the environment, not the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::{ApiConfig, AuthConfig, EndpointsConfig, TimeoutConfig};
