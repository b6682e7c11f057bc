mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{token_config, TestApp, LIFESPAN_HOURS};
use serde_json::json;
use service_catalog::{auth::TokenService, config::TokenConfig};

#[tokio::test]
async fn register_login_and_list_on_fresh_account() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({ "username": "bob", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], "bob");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());
    let bob_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "bob", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["accessToken"].as_str().unwrap();
    assert_eq!(app.state.tokens.extract_user_id(token).unwrap(), bob_id);

    let (status, body) = app.get("/services", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::new().await;
    let creds = json!({ "username": "bob", "password": "secret" });

    let (status, _) = app.post("/auth/register", None, creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/auth/register", None, creds).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unable to create user"));
}

#[tokio::test]
async fn registration_input_is_validated() {
    let app = TestApp::new().await;

    for body in [
        json!({ "username": "bob" }),
        json!({ "password": "secret" }),
        json!({ "username": "", "password": "secret" }),
        json!({ "username": "a".repeat(21), "password": "secret" }),
        json!({ "username": "bob", "password": "p".repeat(21) }),
        json!({ "username": 7, "password": "secret" }),
    ] {
        let (status, resp) = app.post("/auth/register", None, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", body, resp);
    }

    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_distinguished() {
    let app = TestApp::new().await;
    app.signup("bob", "secret").await;

    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "bob", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "alice", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/auth/login", None, json!({ "username": "bob" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;
    let (bob_id, token) = app.signup("bob", "secret").await;

    let (status, body) = app.request(Method::GET, "/services", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthenticated");

    let (status, _) = app.get("/services", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // scheme without a token
    let req = Request::builder()
        .uri("/services")
        .header(header::AUTHORIZATION, token.clone())
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenService::new(&TokenConfig {
        signing_key: b"some-other-key".to_vec(),
        lifespan_hours: LIFESPAN_HOURS,
    })
    .issue(bob_id)
    .unwrap();
    let (status, _) = app.get("/services", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = TokenService::new(&token_config())
        .issue_at(
            bob_id,
            Utc::now() - Duration::hours(LIFESPAN_HOURS) - Duration::minutes(1),
        )
        .unwrap();
    let (status, _) = app.get("/services", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/services", &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn token_for_unknown_user_is_unauthenticated() {
    let app = TestApp::new().await;
    app.signup("bob", "secret").await;

    let ghost = app.state.tokens.issue(9999).unwrap();
    let (status, _) = app.get("/services", &ghost).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn any_scheme_word_is_accepted() {
    let app = TestApp::new().await;
    let (_, token) = app.signup("bob", "secret").await;

    let req = Request::builder()
        .uri("/services")
        .header(header::AUTHORIZATION, format!("Token {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
