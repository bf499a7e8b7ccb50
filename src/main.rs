use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotel_booking::{
    api::{create_router, AppState, RateLimiter},
    config::Config,
    db::{self, TokenRepository},
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hotel_booking=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hotel booking server v{}...", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    let pool = db::connect(&config).await?;
    tracing::info!("Database connected: {}", config.database_url);

    db::migrate(&pool).await?;
    tracing::info!("Database migrations completed");

    if config.seed_demo_data && db::seed::seed_demo_data(&pool).await? {
        tracing::info!("Demo data seeded (admin@hotel.com / user@hotel.com)");
    }

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute, 60));
    tracing::info!("Rate limiter configured ({} req/min per IP)", config.rate_limit_per_minute);

    let state = AppState::new(pool.clone(), config.clone());

    // Expired tokens only exist when an expiry is configured
    if let Some(hours) = config.token_expiry_hours {
        let pool = pool.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match TokenRepository::cleanup_expired(&pool).await {
                    Ok(removed) => tracing::debug!("Expired tokens cleaned up: {}", removed),
                    Err(e) => tracing::error!("Token cleanup failed: {}", e),
                }
            }
        });
        tracing::info!("Tokens expire after {}h; cleanup task started (runs hourly)", hours);
    }

    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                tracing::debug!("Rate limiter cache cleaned up");
            }
        });
    }

    let app = create_router(state, rate_limiter);

    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
