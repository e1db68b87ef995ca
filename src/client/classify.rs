//! Turns an [`ApiError`] into the single message shown to users.

use crate::client::error::ApiError;

/// Classify `error` into a user-facing message.
///
/// - No response: `"Error: <message>"`
/// - Server answered: `"Error Code: <status>\nMessage: <message>"`
/// - Fallback exhausted: the last attempt's message plus the attempt count
pub fn classify(error: &ApiError) -> String {
    match error {
        ApiError::HttpStatus { status, message } => {
            format!("Error Code: {}\nMessage: {}", status, message)
        }
        ApiError::AllStrategiesFailed { attempts } => {
            let last = attempts
                .iter()
                .rev()
                .find_map(|a| a.error.as_ref())
                .map(classify)
                .unwrap_or_else(|| "Error: no attempt was made".to_string());
            format!(
                "All {} authentication attempts failed. Last error: {}",
                attempts.len(),
                last
            )
        }
        ApiError::Transport(message) | ApiError::ApiLogic(message) => format!("Error: {}", message),
        other => format!("Error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::strategy::StrategyKind;
    use crate::dispatch::attempt::AttemptResult;
    use uuid::Uuid;

    fn failed(strategy: StrategyKind, error: ApiError) -> AttemptResult {
        AttemptResult {
            request_id: Uuid::new_v4(),
            strategy,
            url: "https://pos.example.com/api/health".into(),
            error: Some(error),
        }
    }

    #[test]
    fn test_transport() {
        let msg = classify(&ApiError::Transport("connection refused".into()));
        assert_eq!(msg, "Error: connection refused");
    }

    #[test]
    fn test_http_status() {
        let msg = classify(&ApiError::HttpStatus {
            status: 503,
            message: "Service Unavailable".into(),
        });
        assert_eq!(msg, "Error Code: 503\nMessage: Service Unavailable");
    }

    #[test]
    fn test_logic_and_auth() {
        assert_eq!(classify(&ApiError::ApiLogic("no sales".into())), "Error: no sales");
        assert_eq!(
            classify(&ApiError::Authentication("token response contained no token".into())),
            "Error: authentication failed: token response contained no token"
        );
    }

    #[test]
    fn test_aggregate_uses_last_attempt() {
        let err = ApiError::AllStrategiesFailed {
            attempts: vec![
                failed(StrategyKind::ApiKeyHeader, ApiError::Transport("reset".into())),
                failed(StrategyKind::BearerRawKey, ApiError::Transport("reset".into())),
                failed(
                    StrategyKind::BasicAuth,
                    ApiError::HttpStatus {
                        status: 401,
                        message: "Unauthorized".into(),
                    },
                ),
            ],
        };
        assert_eq!(
            classify(&err),
            "All 3 authentication attempts failed. Last error: Error Code: 401\nMessage: Unauthorized"
        );
        assert_eq!(err.user_message(), classify(&err));
    }
}
