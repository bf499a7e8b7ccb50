use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::AppJson;
use crate::api::state::AppState;
use crate::auth::{hash_password, verify_dummy_password, verify_password, Principal};
use crate::db::users::NewUser;
use crate::db::{Role, User, UserRepository};
use crate::error::AppError;
use crate::validation::FieldErrors;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

impl AuthResponse {
    fn bearer(access_token: String, user: User) -> Self {
        Self { access_token, token_type: "Bearer".to_string(), user }
    }
}

struct Registration {
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
}

fn validate_registration(req: RegisterRequest) -> Result<Registration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = errors.required_string("name", req.name.as_deref(), 255);
    let email = errors.email("email", req.email.as_deref());
    let phone = errors.optional_string("phone", req.phone.as_deref(), 32);

    let password = match req.password {
        None => {
            errors.add("password", "The password field is required.");
            None
        }
        Some(p) if p.chars().count() < MIN_PASSWORD_LEN => {
            errors.add(
                "password",
                format!("The password field must be at least {} characters.", MIN_PASSWORD_LEN),
            );
            None
        }
        Some(p) => Some(p),
    };

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) if errors.is_empty() => {
            Ok(Registration { name, email, password, phone })
        }
        _ => Err(errors),
    }
}

fn email_taken() -> AppError {
    AppError::invalid("email", "The email has already been taken.")
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let registration = validate_registration(req).map_err(AppError::Validation)?;

    if UserRepository::get_by_email(&state.db, &registration.email).await?.is_some() {
        return Err(email_taken());
    }

    let password_hash = hash_password(&registration.password)?;

    let created = UserRepository::create(
        &state.db,
        NewUser {
            name: &registration.name,
            email: &registration.email,
            password_hash: &password_hash,
            role: Role::User,
            phone: registration.phone.as_deref(),
        },
    )
    .await;

    // A concurrent registration can win the race past the lookup above
    let user = match created {
        Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
            return Err(email_taken());
        }
        other => other?,
    };

    let token = state.tokens.issue(&user).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(AuthResponse::bearer(token, user))))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // Unknown email and wrong password must be indistinguishable
    let Some(user) = UserRepository::get_by_email(&state.db, &req.email).await? else {
        verify_dummy_password(&req.password);
        tracing::info!("login rejected: invalid credentials");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::info!("login rejected: invalid credentials");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user).await?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse::bearer(token, user)))
}

/// POST /api/logout (requires auth)
pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.tokens.revoke(&principal.token_id).await?;
    tracing::info!(user_id = %principal.id(), "user logged out");

    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

/// GET /api/user (requires auth)
pub async fn me(Extension(principal): Extension<Principal>) -> Json<User> {
    Json(principal.user)
}
