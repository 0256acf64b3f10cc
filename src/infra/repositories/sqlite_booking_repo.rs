use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_if_free(&self, booking: &Booking) -> Result<Option<Booking>, AppError> {
        // Single statement: SQLite serializes writers, so the guard and the insert are atomic.
        sqlx::query_as::<_, Booking>(
            r#"INSERT INTO bookings (id, venue_id, vendor_id, reference, booking_date, start_time, end_time, status, booking_type,
                                     total_amount, currency, customer_name, customer_phone, notes, refund_amount, cancellation_reason,
                                     created_at, updated_at)
               SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
               WHERE NOT EXISTS (
                   SELECT 1 FROM bookings
                   WHERE venue_id = ? AND status = 'CONFIRMED' AND start_time < ? AND end_time > ?
               )
               AND NOT EXISTS (
                   SELECT 1 FROM conflicts
                   WHERE venue_id = ? AND is_active = 1 AND start_time < ? AND end_time > ?
               )
               RETURNING *"#
        )
            .bind(&booking.id).bind(&booking.venue_id).bind(&booking.vendor_id).bind(&booking.reference)
            .bind(booking.booking_date).bind(booking.start_time).bind(booking.end_time).bind(&booking.status)
            .bind(&booking.booking_type).bind(booking.total_amount).bind(&booking.currency)
            .bind(&booking.customer_name).bind(&booking.customer_phone).bind(&booking.notes)
            .bind(booking.refund_amount).bind(&booking.cancellation_reason)
            .bind(booking.created_at).bind(booking.updated_at)
            .bind(&booking.venue_id).bind(booking.end_time).bind(booking.start_time)
            .bind(&booking.venue_id).bind(booking.end_time).bind(booking.start_time)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_overlapping(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE venue_id = ? AND status = 'CONFIRMED' AND start_time < ? AND end_time > ? ORDER BY start_time ASC"
        )
            .bind(venue_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE venue_id = ? AND start_time < ? AND end_time > ? ORDER BY start_time ASC, created_at ASC"
        )
            .bind(venue_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status=?, refund_amount=?, cancellation_reason=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&booking.status).bind(booking.refund_amount).bind(&booking.cancellation_reason).bind(booking.updated_at)
            .bind(&booking.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
}
