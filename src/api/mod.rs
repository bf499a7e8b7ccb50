pub mod auth;
pub mod extract;
pub mod middleware;
pub mod reservations;
pub mod rooms;
pub mod state;

pub use extract::AppJson;
pub use state::AppState;
pub use middleware::RateLimiter;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/rooms", get(rooms::index))
        .route("/rooms/:id", get(rooms::show));

    // Everything here runs behind bearer authentication
    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::me))
        .route("/rooms", post(rooms::store))
        .route("/rooms/:id", put(rooms::update).delete(rooms::destroy))
        .route(
            "/reservations",
            get(reservations::index).post(reservations::store),
        )
        .route(
            "/reservations/:id",
            get(reservations::show)
                .put(reservations::update)
                .delete(reservations::destroy),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(axum_middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_middleware(limiter, req, next)
        }))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
