//! Authentication strategies.
//!
//! Each strategy turns the credentials (and, for [`StrategyKind::BearerToken`],
//! an exchanged token) into a header set. Strategies are pure: building
//! headers never touches the network.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::auth::credentials::Credentials;
use crate::auth::token_manager::Token;
use crate::client::error::{ApiError, ApiResult};

const X_API_KEY: &str = "x-api-key";
const X_API_SECRET: &str = "x-api-secret";

/// One way of authenticating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// `X-API-Key` / `X-API-Secret` headers.
    ApiKeyHeader,
    /// `Authorization: Bearer <api key>`, no token exchange.
    BearerRawKey,
    /// `Authorization: Basic base64(key:secret)`.
    BasicAuth,
    /// `Authorization: Bearer <token>` with a token from the token manager.
    BearerToken,
}

impl StrategyKind {
    /// Whether this strategy needs a token from the token manager.
    pub fn requires_token(self) -> bool {
        matches!(self, StrategyKind::BearerToken)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::ApiKeyHeader => "api_key_header",
            StrategyKind::BearerRawKey => "bearer_raw_key",
            StrategyKind::BasicAuth => "basic_auth",
            StrategyKind::BearerToken => "bearer_token",
        }
    }

    /// Build the header set for this strategy.
    ///
    /// `token` is only read by [`StrategyKind::BearerToken`], which fails with
    /// [`ApiError::Authentication`] when it is absent.
    pub fn headers(self, credentials: &Credentials, token: Option<&Token>) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match self {
            StrategyKind::ApiKeyHeader => {
                headers.insert(
                    HeaderName::from_static(X_API_KEY),
                    header_value(credentials.api_key())?,
                );
                headers.insert(
                    HeaderName::from_static(X_API_SECRET),
                    header_value(credentials.api_secret())?,
                );
            }
            StrategyKind::BearerRawKey => {
                let value = format!("Bearer {}", credentials.api_key());
                headers.insert(AUTHORIZATION, header_value(&value)?);
            }
            StrategyKind::BasicAuth => {
                let value = format!("Basic {}", credentials.basic_auth_payload());
                headers.insert(AUTHORIZATION, header_value(&value)?);
            }
            StrategyKind::BearerToken => {
                let token = token.ok_or_else(|| {
                    ApiError::Authentication("no token available for bearer_token strategy".into())
                })?;
                let value = format!("Bearer {}", token.value());
                headers.insert(AUTHORIZATION, header_value(&value)?);
            }
        }

        Ok(headers)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|e| ApiError::InvalidRequest(format!("credential is not a valid header value: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Which strategies a client tries, and in what order.
///
/// The header-based fallback and the token exchange are both supported
/// flows of the POS API; neither is assumed authoritative, so the choice
/// is explicit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// API-key header, then raw-key bearer, then basic auth.
    #[default]
    HeaderFallback,
    /// Exchanged bearer token only.
    TokenExchange,
    /// All four strategies in their documented order.
    Exhaustive,
    /// Caller-provided order (`auth.strategies`).
    Custom,
}

impl AuthMode {
    /// Strategy order for the built-in modes. Empty for [`AuthMode::Custom`].
    pub fn strategies(self) -> &'static [StrategyKind] {
        use StrategyKind::*;
        match self {
            AuthMode::HeaderFallback => &[ApiKeyHeader, BearerRawKey, BasicAuth],
            AuthMode::TokenExchange => &[BearerToken],
            AuthMode::Exhaustive => &[ApiKeyHeader, BearerRawKey, BasicAuth, BearerToken],
            AuthMode::Custom => &[],
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthMode::HeaderFallback => "header_fallback",
            AuthMode::TokenExchange => "token_exchange",
            AuthMode::Exhaustive => "exhaustive",
            AuthMode::Custom => "custom",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("key", "secret")
    }

    #[test]
    fn test_api_key_headers() {
        let headers = StrategyKind::ApiKeyHeader.headers(&creds(), None).unwrap();
        assert_eq!(headers["x-api-key"], "key");
        assert_eq!(headers["x-api-secret"], "secret");
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_bearer_raw_key() {
        let headers = StrategyKind::BearerRawKey.headers(&creds(), None).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer key");
    }

    #[test]
    fn test_basic_auth() {
        let headers = StrategyKind::BasicAuth.headers(&creds(), None).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic a2V5OnNlY3JldA==");
    }

    #[test]
    fn test_bearer_token_uses_token_not_key() {
        let token = Token::new("tok-123", i64::MAX);
        let headers = StrategyKind::BearerToken.headers(&creds(), Some(&token)).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer tok-123");
    }

    #[test]
    fn test_bearer_token_without_token_fails() {
        let err = StrategyKind::BearerToken.headers(&creds(), None).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[test]
    fn test_non_ascii_key_is_invalid_request() {
        let creds = Credentials::new("clé\n", "secret");
        let err = StrategyKind::ApiKeyHeader.headers(&creds, None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_mode_orders() {
        use StrategyKind::*;
        assert_eq!(
            AuthMode::HeaderFallback.strategies(),
            &[ApiKeyHeader, BearerRawKey, BasicAuth]
        );
        assert_eq!(AuthMode::TokenExchange.strategies(), &[BearerToken]);
        assert_eq!(AuthMode::Exhaustive.strategies().last(), Some(&BearerToken));
        assert!(AuthMode::Custom.strategies().is_empty());
    }
}
