//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URLs parse and endpoint paths are rooted
//! - Check auth mode prerequisites (token modes need an auth URL)
//! - Validate value ranges (timeouts > 0, finite target >= 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::auth::strategy::AuthMode;
use crate::config::schema::ClientConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: endpoint path must start with '/', got '{value}'")]
    InvalidEndpoint { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("auth mode '{0}' requires api.auth_url")]
    MissingAuthUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("dashboard.monthly_target must be a finite, non-negative number")]
    InvalidTarget,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url("api.base_url", &config.api.base_url, &mut errors);
    for url in &config.api.fallback_base_urls {
        check_url("api.fallback_base_urls", url, &mut errors);
    }
    if let Some(auth_url) = &config.api.auth_url {
        check_url("api.auth_url", auth_url, &mut errors);
    }

    check_endpoint("api.endpoints.health", &config.api.endpoints.health, &mut errors);
    check_endpoint("api.endpoints.sales", &config.api.endpoints.sales, &mut errors);

    if config.credentials.api_key.is_empty() {
        errors.push(ValidationError::Empty("credentials.api_key"));
    }
    if config.credentials.api_secret.is_empty() {
        errors.push(ValidationError::Empty("credentials.api_secret"));
    }

    let order = config.auth.strategy_order();
    if config.auth.mode == AuthMode::Custom && order.is_empty() {
        errors.push(ValidationError::Empty("auth.strategies"));
    }
    if order.iter().any(|s| s.requires_token()) && config.api.auth_url.is_none() {
        errors.push(ValidationError::MissingAuthUrl(config.auth.mode.to_string()));
    }
    if config.auth.default_token_ttl_secs == 0 {
        errors.push(ValidationError::Zero("auth.default_token_ttl_secs"));
    }

    if config.timeouts.attempt_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.attempt_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }

    let target = config.dashboard.monthly_target;
    if !target.is_finite() || target < 0.0 {
        errors.push(ValidationError::InvalidTarget);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let ok = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_endpoint(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidEndpoint {
            field,
            value: value.to_string(),
        });
    }
}
