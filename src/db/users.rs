use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::{Role, User};
use crate::db::now;
use crate::error::AppError;

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub phone: Option<&'a str>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn create(pool: &Pool<Sqlite>, new: NewUser<'_>) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, name, email, password_hash, role, phone, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(new.name)
        .bind(new.email.to_lowercase())
        .bind(new.password_hash)
        .bind(new.role)
        .bind(new.phone)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Case-insensitive lookup.
    pub async fn get_by_email(
        pool: &Pool<Sqlite>,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ? COLLATE NOCASE"
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn count(pool: &Pool<Sqlite>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
