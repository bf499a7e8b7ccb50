use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use sqlx::{Pool, Sqlite};

use crate::auth::Principal;
use crate::db::{TokenRepository, User, UserRepository};
use crate::error::AppError;

/// Generate an opaque bearer token from 32 bytes of OS randomness.
pub fn generate_token() -> String {
    let mut buffer = [0u8; 32];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}

/// Digest stored in place of the token.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issues, validates and revokes bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    db: Pool<Sqlite>,
    expiry_hours: Option<i64>,
}

impl TokenIssuer {
    pub fn new(db: Pool<Sqlite>, expiry_hours: Option<i64>) -> Self {
        Self { db, expiry_hours }
    }

    /// Persist a new token for `user` and return its plaintext. Only the digest is stored,
    /// so this is the single chance to hand it out.
    pub async fn issue(&self, user: &User) -> Result<String, AppError> {
        let token = generate_token();
        // An expiry too far out to represent means the token never expires
        let expires_at = self.expiry_hours.and_then(|hours| {
            hours
                .checked_mul(3600)
                .and_then(|secs| chrono::Utc::now().timestamp().checked_add(secs))
        });

        TokenRepository::create(&self.db, &user.id, &hash_token(&token), expires_at).await?;
        tracing::debug!(user_id = %user.id, "issued access token");

        Ok(token)
    }

    pub async fn validate(&self, token: &str) -> Result<Principal, AppError> {
        let record = TokenRepository::get_by_hash(&self.db, &hash_token(token))
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let user = UserRepository::get_by_id(&self.db, &record.user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        TokenRepository::touch(&self.db, &record.id).await?;

        Ok(Principal::new(user, record.id))
    }

    /// Deleting an already-deleted token is not an error.
    pub async fn revoke(&self, token_id: &str) -> Result<(), AppError> {
        TokenRepository::delete(&self.db, token_id).await
    }
}
