#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use service_catalog::{config::TokenConfig, rest, store, AppState};
use tower::ServiceExt;

pub const SIGNING_KEY: &str = "test-signing-key";
pub const LIFESPAN_HOURS: i64 = 1;

pub fn token_config() -> TokenConfig {
    TokenConfig {
        signing_key: SIGNING_KEY.as_bytes().to_vec(),
        lifespan_hours: LIFESPAN_HOURS,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> TestApp {
        TestApp::with_database("sqlite::memory:", 1).await
    }

    pub async fn with_database(url: &str, max_connections: u32) -> TestApp {
        let pool = store::connect(url, max_connections)
            .await
            .expect("Failed to open database");
        store::migrate(&pool).await.expect("Failed to run migrations");

        let state = AppState::new(pool, &token_config());
        TestApp {
            router: rest::router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Router is infallible");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body is not JSON")
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    /// Registers and logs in, returning the user id and access token.
    pub async fn signup(&self, username: &str, password: &str) -> (i64, String) {
        let creds = serde_json::json!({ "username": username, "password": password });

        let (status, body) = self.post("/auth/register", None, creds.clone()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let id = body["data"]["id"].as_i64().expect("user id");

        let (status, body) = self.post("/auth/login", None, creds).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        let token = body["accessToken"].as_str().expect("access token").to_owned();

        (id, token)
    }

    pub async fn create_service(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/services",
                Some(token),
                serde_json::json!({ "name": name, "description": format!("{} service", name) }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create service failed: {}", body);
        body["data"]["id"].as_i64().expect("service id")
    }
}
