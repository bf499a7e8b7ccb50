use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub request_timeout_secs: u64,
    pub rate_limit_per_minute: u32,
    /// `None` means issued tokens never expire.
    pub token_expiry_hours: Option<i64>,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            database_url: "sqlite://hotel_booking.db".to_string(),
            db_max_connections: 10,
            db_min_connections: 1,
            request_timeout_secs: 30,
            rate_limit_per_minute: 60,
            token_expiry_hours: None,
            seed_demo_data: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars()
    }

    /// Reads the process environment without touching `.env`.
    pub fn from_vars() -> Result<Self, AppError> {
        let defaults = Config::default();

        Ok(Config {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server_port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.db_max_connections),
            db_min_connections: parse_var("DB_MIN_CONNECTIONS")?
                .unwrap_or(defaults.db_min_connections),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE")?
                .unwrap_or(defaults.rate_limit_per_minute),
            token_expiry_hours: match parse_var::<i64>("TOKEN_EXPIRY_HOURS")? {
                Some(hours) if hours <= 0 => {
                    return Err(AppError::Config(format!(
                        "Invalid TOKEN_EXPIRY_HOURS: {} (must be positive)",
                        hours
                    )))
                }
                hours => hours,
            },
            seed_demo_data: parse_var("SEED_DEMO_DATA")?.unwrap_or(defaults.seed_demo_data),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
