//! Registration, login, and the authenticated-vendor gate.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::test_app;

fn registration(email: &str, kra_pin: &str) -> Value {
    json!({
        "email": email,
        "password": "correct horse battery staple",
        "kra_pin": kra_pin,
        "company_name": "Acme Supplies Ltd",
        "phone_number": "+254712345678",
        "category": "goods"
    })
}

#[tokio::test]
async fn register_returns_token_and_sanitized_vendor() {
    let harness = test_app();

    let (status, response) = harness
        .post(
            "/auth/register",
            None,
            registration("Vendor@Example.com", "a123456789z"),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(response["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));

    let vendor = &response["data"]["vendor"];
    // normalization
    assert_eq!(vendor["email"], "vendor@example.com");
    assert_eq!(vendor["kra_pin"], "A123456789Z");
    // secrets and admin-only flags stay server-side
    assert!(vendor.get("password").is_none());
    assert!(vendor.get("password_hash").is_none());
    assert!(vendor.get("blacklisted").is_none());
}

#[tokio::test]
async fn register_collects_validation_problems() {
    let harness = test_app();

    let (status, response) = harness
        .post(
            "/auth/register",
            None,
            json!({
                "email": "not-an-email",
                "password": "short",
                "kra_pin": "nope",
                "company_name": "",
                "phone_number": "0712345678",
                "category": "sorcery"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");
    assert_eq!(response["details"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn register_rejects_duplicate_email_and_pin() {
    let harness = test_app();

    let (status, _) = harness
        .post("/auth/register", None, registration("dup@example.com", "A123456789Z"))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // same email, different PIN
    let (status, response) = harness
        .post("/auth/register", None, registration("dup@example.com", "B987654321B"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "CONFLICT");
    assert!(response["message"].as_str().unwrap().contains("email"));

    // same PIN, different email
    let (status, response) = harness
        .post("/auth/register", None, registration("other@example.com", "A123456789Z"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "CONFLICT");
    assert!(response["message"].as_str().unwrap().contains("kra_pin"));
}

#[tokio::test]
async fn login_round_trip_and_me() {
    let harness = test_app();
    harness
        .post("/auth/register", None, registration("login@example.com", "C123456789C"))
        .await;

    let (status, response) = harness
        .post(
            "/auth/login",
            None,
            json!({
                // login normalizes case the same way registration does
                "email": "Login@Example.com",
                "password": "correct horse battery staple"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = response["data"]["token"].as_str().expect("token").to_string();

    let (status, me) = harness.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "login@example.com");
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
    let harness = test_app();
    harness
        .post("/auth/register", None, registration("known@example.com", "D123456789D"))
        .await;

    let (status, wrong_password) = harness
        .post(
            "/auth/login",
            None,
            json!({"email": "known@example.com", "password": "wrong password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_email) = harness
        .post(
            "/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": "wrong password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // same message either way: no account enumeration
    assert_eq!(wrong_password["message"], unknown_email["message"]);
}

#[tokio::test]
async fn blacklisted_vendor_is_locked_out() {
    let harness = test_app();
    let vendor = harness.seed_vendor("barred@example.com", "E123456789E", true);
    let token = harness.token_for(vendor.id);

    // even a valid token stops working once the vendor is blacklisted
    let (status, response) = harness.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(response["message"].as_str().unwrap().contains("suspended"));
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let harness = test_app();

    for uri in ["/auth/me", "/vendors/me", "/bids"] {
        let (status, response) = harness.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "GET {uri}");
        assert_eq!(response["code"], "UNAUTHORIZED");
    }

    let (status, _) = harness.get("/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stale_token_for_deleted_vendor_is_rejected() {
    let harness = test_app();
    // Token minted for a vendor id that was never stored.
    let token = harness.token_for(uuid::Uuid::new_v4());

    let (status, _) = harness.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_acknowledges() {
    let harness = test_app();
    let (status, response) = harness.post("/auth/logout", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response["message"].as_str().unwrap().contains("Logged out"));
}
