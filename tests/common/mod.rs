#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use hotel_booking::api::{create_router, AppState, RateLimiter};
use hotel_booking::auth::hash_password;
use hotel_booking::config::Config;
use hotel_booking::db::{self, users::NewUser, Role, UserRepository};

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        db_min_connections: 1,
        rate_limit_per_minute: 10_000,
        ..Config::default()
    }
}

pub async fn app_state_with_memory() -> AppState {
    let config = test_config();
    let pool = db::connect(&config).await.unwrap();
    db::migrate(&pool).await.unwrap();
    AppState::new(pool, Arc::new(config))
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let state = app_state_with_memory().await;
        let limiter = Arc::new(RateLimiter::new(state.config.rate_limit_per_minute, 60));
        let router = create_router(state.clone(), limiter);
        Self { state, router }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Sends `body` verbatim, with the given content type if any.
    pub async fn call_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    /// Registers a regular user and returns `(token, user_id)`.
    pub async fn register(&self, name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "pw12345678" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Admins cannot self-register; create one directly and issue a token.
    pub async fn admin(&self) -> (String, String) {
        let password_hash = hash_password("admin12345").unwrap();
        let user = UserRepository::create(
            &self.state.db,
            NewUser {
                name: "Admin",
                email: "admin@hotel.test",
                password_hash: &password_hash,
                role: Role::Admin,
                phone: None,
            },
        )
        .await
        .unwrap();
        let token = self.state.tokens.issue(&user).await.unwrap();
        (token, user.id)
    }

    pub async fn create_room(&self, admin_token: &str, name: &str, price: f64) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/rooms",
                Some(admin_token),
                Some(json!({ "name": name, "price": price, "capacity": 2, "type": "Std" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "room create failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn reserve(&self, token: &str, room_id: &str, check_in: &str, check_out: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/reservations",
            Some(token),
            Some(json!({
                "room_id": room_id,
                "check_in": check_in,
                "check_out": check_out,
                "total_price": 200.0,
            })),
        )
        .await
    }
}

/// Serves the full router on an ephemeral port; returns the API base URL.
pub async fn spawn_server() -> (String, AppState) {
    let state = app_state_with_memory().await;
    let limiter = Arc::new(RateLimiter::new(state.config.rate_limit_per_minute, 60));
    let router = create_router(state.clone(), limiter);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    (format!("http://{}/api", addr), state)
}
