use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::Room;
use crate::db::now;
use crate::error::AppError;

/// Validated input for a new room.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub capacity: i64,
    pub room_type: String,
    pub image_url: Option<String>,
    pub is_available: bool,
}

/// Validated partial update; `None` leaves the column untouched and
/// `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub capacity: Option<i64>,
    pub room_type: Option<String>,
    pub image_url: Option<Option<String>>,
    pub is_available: Option<bool>,
}

impl RoomChanges {
    fn apply(self, room: &mut Room) {
        if let Some(name) = self.name {
            room.name = name;
        }
        if let Some(description) = self.description {
            room.description = description;
        }
        if let Some(price) = self.price {
            room.price = price;
        }
        if let Some(capacity) = self.capacity {
            room.capacity = capacity;
        }
        if let Some(room_type) = self.room_type {
            room.room_type = room_type;
        }
        if let Some(image_url) = self.image_url {
            room.image_url = image_url;
        }
        if let Some(is_available) = self.is_available {
            room.is_available = is_available;
        }
    }
}

pub struct RoomRepository;

impl RoomRepository {
    pub async fn create(pool: &Pool<Sqlite>, new: NewRoom) -> Result<Room, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();

        let room = sqlx::query_as::<_, Room>(
            r#"
INSERT INTO rooms (id, name, description, price, capacity, type, image_url, is_available, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.capacity)
        .bind(&new.room_type)
        .bind(&new.image_url)
        .bind(new.is_available)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(room)
    }

    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY created_at, name")
            .fetch_all(pool)
            .await?;

        Ok(rooms)
    }

    pub async fn get_by_id(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(room)
    }

    pub async fn exists(pool: &Pool<Sqlite>, id: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(found.is_some())
    }

    pub async fn update(
        pool: &Pool<Sqlite>,
        id: &str,
        changes: RoomChanges,
    ) -> Result<Option<Room>, AppError> {
        let Some(mut room) = Self::get_by_id(pool, id).await? else {
            return Ok(None);
        };
        changes.apply(&mut room);

        let room = sqlx::query_as::<_, Room>(
            r#"
UPDATE rooms
SET name = ?, description = ?, price = ?, capacity = ?, type = ?, image_url = ?, is_available = ?, updated_at = ?
WHERE id = ?
RETURNING *
            "#,
        )
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.price)
        .bind(room.capacity)
        .bind(&room.room_type)
        .bind(&room.image_url)
        .bind(room.is_available)
        .bind(now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(room)
    }

    /// Returns false when no room had this id.
    pub async fn delete(pool: &Pool<Sqlite>, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
