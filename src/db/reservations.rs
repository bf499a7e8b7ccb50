use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::auth::Scope;
use crate::db::models::{Reservation, ReservationDetails, ReservationStatus};
use crate::db::{now, PaymentRepository, RoomRepository, UserRepository};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: String,
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
}

pub struct ReservationRepository;

impl ReservationRepository {
    /// Inserts with status `pending`. No overlap check is made against other
    /// reservations of the same room.
    pub async fn create(pool: &Pool<Sqlite>, new: NewReservation) -> Result<Reservation, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
INSERT INTO reservations (id, user_id, room_id, check_in, check_out, total_price, status, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&new.user_id)
        .bind(&new.room_id)
        .bind(new.check_in)
        .bind(new.check_out)
        .bind(new.total_price)
        .bind(ReservationStatus::Pending)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(reservation)
    }

    pub async fn list(pool: &Pool<Sqlite>, scope: &Scope) -> Result<Vec<Reservation>, AppError> {
        let owner = scope.owner();

        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
SELECT * FROM reservations
WHERE (? IS NULL OR user_id = ?)
ORDER BY created_at DESC, id
            "#,
        )
        .bind(owner)
        .bind(owner)
        .fetch_all(pool)
        .await?;

        Ok(reservations)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: &str,
        scope: &Scope,
    ) -> Result<Option<Reservation>, AppError> {
        let owner = scope.owner();

        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = ? AND (? IS NULL OR user_id = ?)"
        )
        .bind(id)
        .bind(owner)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(reservation)
    }

    pub async fn update_status(
        pool: &Pool<Sqlite>,
        id: &str,
        scope: &Scope,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, AppError> {
        let owner = scope.owner();

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
UPDATE reservations SET status = ?, updated_at = ?
WHERE id = ? AND (? IS NULL OR user_id = ?)
RETURNING *
            "#,
        )
        .bind(status)
        .bind(now())
        .bind(id)
        .bind(owner)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(reservation)
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: &str, scope: &Scope) -> Result<bool, AppError> {
        let owner = scope.owner();

        let result = sqlx::query("DELETE FROM reservations WHERE id = ? AND (? IS NULL OR user_id = ?)")
            .bind(id)
            .bind(owner)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Listing with rooms attached; owners are attached too when the scope spans all users.
    pub async fn list_details(
        pool: &Pool<Sqlite>,
        scope: &Scope,
    ) -> Result<Vec<ReservationDetails>, AppError> {
        let with_user = scope.owner().is_none();
        let mut details = Vec::new();

        for reservation in Self::list(pool, scope).await? {
            let room = RoomRepository::get_by_id(pool, &reservation.room_id).await?;
            let user = if with_user {
                UserRepository::get_by_id(pool, &reservation.user_id).await?
            } else {
                None
            };
            details.push(ReservationDetails { reservation, user, room, payment: None });
        }

        Ok(details)
    }

    /// Single reservation with user, room and payment attached.
    pub async fn get_details(
        pool: &Pool<Sqlite>,
        id: &str,
        scope: &Scope,
    ) -> Result<Option<ReservationDetails>, AppError> {
        let Some(reservation) = Self::get_by_id(pool, id, scope).await? else {
            return Ok(None);
        };

        let user = UserRepository::get_by_id(pool, &reservation.user_id).await?;
        let room = RoomRepository::get_by_id(pool, &reservation.room_id).await?;
        let payment = PaymentRepository::get_by_reservation(pool, &reservation.id).await?;

        Ok(Some(ReservationDetails { reservation, user, room, payment }))
    }
}
