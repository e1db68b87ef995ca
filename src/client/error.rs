//! Error taxonomy for POS API calls.

use thiserror::Error;

use crate::dispatch::attempt::AttemptResult;

/// Errors that can occur while talking to the POS API.
///
/// Cloneable so a single token exchange can hand the same failure to every
/// waiter.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received (connect failure, reset, timeout).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The body was not JSON or not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Token exchange failed or returned no token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The envelope reported `success: false` or carried no data.
    #[error("{0}")]
    ApiLogic(String),

    /// Every strategy (on every candidate base URL) failed.
    #[error("all {} authentication attempts failed", .attempts.len())]
    AllStrategiesFailed { attempts: Vec<AttemptResult> },

    /// The request could not be built (bad header value, bad URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// The single human-readable message shown to users.
    pub fn user_message(&self) -> String {
        crate::client::classify::classify(self)
    }

    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for POS API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::HttpStatus {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
        assert_eq!(err.status(), Some(401));

        let err = ApiError::AllStrategiesFailed { attempts: Vec::new() };
        assert_eq!(err.to_string(), "all 0 authentication attempts failed");
    }
}
