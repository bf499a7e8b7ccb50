use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0:?}")]
    Validation(FieldErrors),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid login details")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Crypto(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convenience for a single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration failed: {}", err))
    }
}

// Axum IntoResponse implementation for HTTP errors
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(errors) => serde_json::json!({
                "message": errors.first_message().unwrap_or("The given data was invalid."),
                "errors": errors,
            }),
            AppError::MalformedBody(reason) => serde_json::json!({ "message": reason }),
            AppError::Unauthenticated => serde_json::json!({ "message": "Unauthenticated." }),
            AppError::InvalidCredentials => serde_json::json!({ "message": "Invalid login details" }),
            AppError::Forbidden => {
                serde_json::json!({ "message": "This action is unauthorized." })
            }
            AppError::NotFound(what) => serde_json::json!({ "message": format!("{} not found.", what) }),
            AppError::RateLimited => serde_json::json!({ "message": "Too Many Attempts." }),
            other => {
                tracing::error!("request failed: {}", other);
                serde_json::json!({ "message": "Server Error" })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
