//! Token exchange, caching and single-flight refresh.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pos_sales_client::auth::{Credentials, Token, TokenManager};
use pos_sales_client::observability::events::{DispatchEvent, DispatchObserver};
use pos_sales_client::ApiError;

mod common;

fn manager(server: &MockServer) -> TokenManager {
    TokenManager::new(
        reqwest::Client::new(),
        format!("{}/api/auth", server.uri()),
        Arc::new(Credentials::new(common::API_KEY, common::API_SECRET)),
        Duration::from_secs(3600),
        Duration::from_secs(5),
    )
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::test]
async fn test_cached_token_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(0)
        .mount(&server)
        .await;

    let tm = manager(&server);
    tm.seed(Token::new("cached", now_millis() + 60_000));

    for _ in 0..3 {
        assert_eq!(tm.valid_token().await.unwrap().value(), "cached");
    }
}

#[tokio::test]
async fn test_exchange_posts_credentials_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({ "apiKey": "key", "apiSecret": "secret" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "abc", "expires_in": 120 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tm = manager(&server);
    let before = now_millis();
    let token = tm.valid_token().await.unwrap();
    assert_eq!(token.value(), "abc");
    assert!(token.expires_at_epoch_millis() >= before + 120_000);
    assert!(token.expires_at_epoch_millis() <= now_millis() + 120_000);

    // Second call is served from cache.
    assert_eq!(tm.valid_token().await.unwrap(), token);
}

#[tokio::test]
async fn test_default_ttl_when_expires_in_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .mount(&server)
        .await;

    let token = manager(&server).valid_token().await.unwrap();
    assert!(token.expires_at_epoch_millis() > now_millis() + 3_500_000);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "new" })))
        .expect(1)
        .mount(&server)
        .await;

    let tm = manager(&server);
    tm.seed(Token::new("old", now_millis() - 1));

    assert_eq!(tm.valid_token().await.unwrap().value(), "new");
    assert_eq!(tm.valid_token().await.unwrap().value(), "new");
}

#[tokio::test]
async fn test_concurrent_callers_share_one_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "shared" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recorder = common::Recorder::default();
    let tm = Arc::new(manager(&server).with_observer(Arc::new(recorder.clone())));

    let tokens = join_all((0..8).map(|_| {
        let tm = Arc::clone(&tm);
        tokio::spawn(async move { tm.valid_token().await })
    }))
    .await;

    for token in tokens {
        assert_eq!(token.unwrap().unwrap().value(), "shared");
    }
    assert_eq!(recorder.count_token_refreshes(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "expires_in": 60 }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tm = manager(&server);
    let (a, b) = tokio::join!(tm.valid_token(), tm.valid_token());

    for result in [a, b] {
        match result {
            Err(ApiError::Authentication(msg)) => assert!(msg.contains("no token")),
            other => panic!("expected authentication error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_failed_exchange_is_retried_on_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "second" })))
        .mount(&server)
        .await;

    let tm = manager(&server);
    let err = tm.valid_token().await.unwrap_err();
    assert!(err.to_string().contains("status 500"));

    assert_eq!(tm.valid_token().await.unwrap().value(), "second");
}

#[tokio::test]
async fn test_zero_lifetime_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "t", "expires_in": 0 })),
        )
        .mount(&server)
        .await;

    let err = manager(&server).valid_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)));
}

#[tokio::test]
async fn test_invalidated_token_triggers_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = common::Recorder::default();
    let observer: Arc<dyn DispatchObserver> = Arc::new(recorder.clone());
    let tm = manager(&server).with_observer(observer);
    let stale = Token::new("stale", now_millis() + 60_000);
    tm.seed(stale.clone());

    tm.invalidate(&stale);
    assert_eq!(tm.valid_token().await.unwrap().value(), "fresh");
    assert_eq!(recorder.count_token_refreshes(), 1);
}

#[tokio::test]
async fn test_fractional_expires_in_is_accepted() {
    for (expires_in, ttl_millis) in [(json!(3600.0), 3_600_000), (json!(0.5), 500)] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "token": "t", "expires_in": expires_in })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let before = now_millis();
        let token = manager(&server).valid_token().await.unwrap();
        assert_eq!(token.value(), "t");
        assert!(token.expires_at_epoch_millis() >= before + ttl_millis);
        assert!(token.expires_at_epoch_millis() <= now_millis() + ttl_millis);
    }
}

#[tokio::test]
async fn test_negative_expires_in_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "t", "expires_in": -5 })),
        )
        .mount(&server)
        .await;

    let err = manager(&server).valid_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(ref m) if m.contains("expires_in")));
}

/// Observer that stalls the exchange after the token is issued.
fn slow_observer() -> Arc<dyn DispatchObserver> {
    Arc::new(|event: &DispatchEvent| {
        if matches!(event, DispatchEvent::TokenRefreshed { .. }) {
            std::thread::sleep(Duration::from_millis(30));
        }
    })
}

#[tokio::test]
async fn test_token_lapsing_before_hand_out_is_exchanged_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "short", "expires_in": 0.005 })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "long", "expires_in": 3600 })),
        )
        .mount(&server)
        .await;

    let tm = manager(&server).with_observer(slow_observer());
    let token = tm.valid_token().await.unwrap();

    assert_eq!(token.value(), "long");
    assert!(token.is_valid_at(now_millis()));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_gives_up_when_every_token_lapses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "short", "expires_in": 0.005 })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let tm = manager(&server).with_observer(slow_observer());
    let err = tm.valid_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(ref m) if m.contains("expired")));
}
