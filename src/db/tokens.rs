use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::AccessToken;
use crate::db::now;
use crate::error::AppError;

pub struct TokenRepository;

impl TokenRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        user_id: &str,
        token_hash: &str,
        expires_at: Option<i64>,
    ) -> Result<AccessToken, AppError> {
        let id = Uuid::new_v4().to_string();

        let token = sqlx::query_as::<_, AccessToken>(
            r#"
INSERT INTO access_tokens (id, user_id, token_hash, expires_at, last_used_at, created_at)
VALUES (?, ?, ?, ?, NULL, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(now())
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Live (unexpired) token with this digest.
    pub async fn get_by_hash(
        pool: &Pool<Sqlite>,
        token_hash: &str,
    ) -> Result<Option<AccessToken>, AppError> {
        let token = sqlx::query_as::<_, AccessToken>(
            "SELECT * FROM access_tokens WHERE token_hash = ? AND (expires_at IS NULL OR expires_at > ?)"
        )
        .bind(token_hash)
        .bind(now())
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    pub async fn touch(pool: &Pool<Sqlite>, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE access_tokens SET last_used_at = ? WHERE id = ?")
            .bind(now())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM access_tokens WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn count_for_user(pool: &Pool<Sqlite>, user_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    pub async fn cleanup_expired(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(now())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
