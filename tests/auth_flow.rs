//! Integration tests for API-key authentication end to end.

use axum::http::StatusCode;
use serde_json::Value;

use arcana::auth::CredentialStore;

mod common;

#[tokio::test]
async fn test_no_credential_is_anonymous() {
    let app = common::spawn_default_app().await;

    // Content endpoints accept anonymous callers.
    let response = reqwest::get(app.url("/api/v1/horoscope/leo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_key_rejected() {
    let app = common::spawn_default_app().await;

    let client = reqwest::Client::new();
    let response = client
        .get(app.url("/api/v1/horoscope/leo"))
        .header("X-API-Key", "sk_live_bogus")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("www-authenticate").unwrap(), "X-API-Key");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["error"]["message"], "invalid API key");
}

#[tokio::test]
async fn test_expired_key_rejected_with_reason() {
    let app = common::spawn_default_app().await;

    let client = reqwest::Client::new();
    let response = client
        .get(app.url("/api/v1/horoscope/leo"))
        .header("X-API-Key", common::EXPIRED_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("expired") || message.contains("inactive"));
}

#[tokio::test]
async fn test_deactivated_key_rejected() {
    let app = common::spawn_default_app().await;

    let client = reqwest::Client::new();
    let response = client
        .get(app.url("/api/v1/horoscope/leo"))
        .header("X-API-Key", common::DISABLED_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_key_succeeds_and_marks_used() {
    let app = common::spawn_default_app().await;
    let before = app
        .keys
        .find_key(common::VALID_KEY)
        .unwrap()
        .unwrap()
        .last_used;
    assert_eq!(before, None);

    let client = reqwest::Client::new();
    let response = client
        .get(app.url("/api/v1/horoscope/leo"))
        .header("X-API-Key", common::VALID_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let after = app
        .keys
        .find_key(common::VALID_KEY)
        .unwrap()
        .unwrap()
        .last_used;
    assert!(after.is_some());
}

#[tokio::test]
async fn test_authorization_header_with_scheme_prefixes() {
    let app = common::spawn_default_app().await;
    let client = reqwest::Client::new();

    for value in [
        format!("Bearer {}", common::VALID_KEY),
        format!("ApiKey {}", common::VALID_KEY),
        common::VALID_KEY.to_string(),
    ] {
        let response = client
            .get(app.url("/api/v1/horoscope/leo"))
            .header("Authorization", value)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_checkout_requires_credential() {
    let app = common::spawn_default_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.url("/api/v1/payments/checkout"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    // Failure responses still carry the fixed security header set.
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], Value::Bool(false));
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_with_valid_key() {
    let app = common::spawn_default_app().await;

    let client = reqwest::Client::new();
    let response = client
        .post(app.url("/api/v1/payments/checkout"))
        .header("X-API-Key", common::VALID_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["plan"], "premium");
    assert!(body["checkout_url"]
        .as_str()
        .unwrap()
        .starts_with("https://checkout.stripe.com/"));
}
