//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `credentials.api_key`.
pub const ENV_API_KEY: &str = "POS_API_KEY";
/// Environment variable overriding `credentials.api_secret`.
pub const ENV_API_SECRET: &str = "POS_API_SECRET";
/// Environment variable overriding `api.base_url`.
pub const ENV_BASE_URL: &str = "POS_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, applying environment
/// overrides before validation.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    load_config_str(&content, |name| std::env::var(name).ok())
}

/// Parse, override and validate configuration from TOML text.
///
/// `lookup` resolves environment variables; tests pass a closure instead of
/// touching the process environment.
pub fn load_config_str<F>(content: &str, lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: ClientConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, lookup);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty(ENV_API_KEY) {
        config.credentials.api_key = key;
    }
    if let Some(secret) = non_empty(ENV_API_SECRET) {
        config.credentials.api_secret = secret;
    }
    if let Some(base_url) = non_empty(ENV_BASE_URL) {
        tracing::debug!(base_url = %base_url, "Base URL overridden from environment");
        config.api.base_url = base_url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FILE: &str = r#"
        [api]
        base_url = "https://pos.example.com"

        [api.endpoints]
        health = "/api/health"
        sales = "/api/sales"

        [credentials]
        api_key = "file-key"
    "#;

    #[test]
    fn test_env_overrides_credentials() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_API_SECRET, "env-secret"), (ENV_API_KEY, "")]);
        let config = load_config_str(FILE, |k| env.get(k).map(|v| v.to_string())).unwrap();

        // Empty variables don't clobber file values.
        assert_eq!(config.credentials.api_key, "file-key");
        assert_eq!(config.credentials.api_secret, "env-secret");
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = load_config_str(FILE, |_| None).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::Empty("credentials.api_secret")]);
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = load_config_str("[api", |_| None).unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
