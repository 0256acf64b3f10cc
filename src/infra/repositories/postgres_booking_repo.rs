use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use chrono::{DateTime, Utc};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_if_free(&self, booking: &Booking) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Serializes writers per venue until commit; readers are not blocked.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))").bind(&booking.venue_id).execute(&mut *tx).await.map_err(AppError::Database)?;

        let taken = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM bookings WHERE venue_id = $1 AND status = 'CONFIRMED' AND start_time < $2 AND end_time > $3)
              + (SELECT COUNT(*) FROM conflicts WHERE venue_id = $1 AND is_active = TRUE AND start_time < $2 AND end_time > $3) AS count"
        )
            .bind(&booking.venue_id).bind(booking.end_time).bind(booking.start_time)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?
            .get::<i64, _>("count");

        if taken > 0 {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(None);
        }

        let created = sqlx::query_as::<_, Booking>("INSERT INTO bookings (id, venue_id, vendor_id, reference, booking_date, start_time, end_time, status, booking_type, total_amount, currency, customer_name, customer_phone, notes, refund_amount, cancellation_reason, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) RETURNING *")
            .bind(&booking.id).bind(&booking.venue_id).bind(&booking.vendor_id).bind(&booking.reference)
            .bind(booking.booking_date).bind(booking.start_time).bind(booking.end_time).bind(&booking.status)
            .bind(&booking.booking_type).bind(booking.total_amount).bind(&booking.currency)
            .bind(&booking.customer_name).bind(&booking.customer_phone).bind(&booking.notes)
            .bind(booking.refund_amount).bind(&booking.cancellation_reason)
            .bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(created))
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_overlapping(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE venue_id = $1 AND status = 'CONFIRMED' AND start_time < $2 AND end_time > $3 ORDER BY start_time ASC").bind(venue_id).bind(end).bind(start).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_range(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE venue_id = $1 AND start_time < $2 AND end_time > $3 ORDER BY start_time ASC, created_at ASC").bind(venue_id).bind(end).bind(start).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_status(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status=$1, refund_amount=$2, cancellation_reason=$3, updated_at=$4 WHERE id=$5 RETURNING *")
            .bind(&booking.status).bind(booking.refund_amount).bind(&booking.cancellation_reason).bind(booking.updated_at).bind(&booking.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
}
