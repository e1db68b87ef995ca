//! API credential store.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::schema::CredentialsConfig;

/// API key and secret, fixed for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// `base64(api_key:api_secret)`, the payload of a Basic auth header.
    pub fn basic_auth_payload(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.api_key, self.api_secret))
    }
}

impl From<&CredentialsConfig> for Credentials {
    fn from(config: &CredentialsConfig) -> Self {
        Self::new(config.api_key.clone(), config.api_secret.clone())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
