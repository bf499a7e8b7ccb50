use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::Payment;
use crate::db::now;
use crate::error::AppError;

/// Payments are recorded by payment processing, which lives outside this service;
/// reservations only read them back.
pub struct PaymentRepository;

impl PaymentRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        reservation_id: &str,
        amount: f64,
        method: &str,
        status: &str,
    ) -> Result<Payment, AppError> {
        let id = Uuid::new_v4().to_string();

        let payment = sqlx::query_as::<_, Payment>(
            r#"
INSERT INTO payments (id, reservation_id, amount, method, status, created_at)
VALUES (?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(reservation_id)
        .bind(amount)
        .bind(method)
        .bind(status)
        .bind(now())
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    /// Most recent payment for the reservation, if any.
    pub async fn get_by_reservation(
        pool: &Pool<Sqlite>,
        reservation_id: &str,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE reservation_id = ? ORDER BY created_at DESC LIMIT 1"
        )
        .bind(reservation_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }
}
