use crate::domain::{models::venue_availability::VenueAvailability, ports::VenueAvailabilityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::NaiveDate;

pub struct PostgresVenueAvailabilityRepo {
    pool: PgPool,
}

impl PostgresVenueAvailabilityRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl VenueAvailabilityRepository for PostgresVenueAvailabilityRepo {
    async fn upsert_many(&self, markers: &[VenueAvailability]) -> Result<Vec<VenueAvailability>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut saved = Vec::with_capacity(markers.len());

        for marker in markers {
            let row = sqlx::query_as::<_, VenueAvailability>(
                r#"INSERT INTO venue_availability (id, venue_id, date, start_hour, is_available, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   ON CONFLICT (venue_id, date, start_hour) DO UPDATE SET
                   is_available = EXCLUDED.is_available
                   RETURNING *"#
            )
                .bind(&marker.id)
                .bind(&marker.venue_id)
                .bind(marker.date)
                .bind(marker.start_hour)
                .bind(marker.is_available)
                .bind(marker.created_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            saved.push(row);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn list_by_date(&self, venue_id: &str, date: NaiveDate) -> Result<Vec<VenueAvailability>, AppError> {
        sqlx::query_as::<_, VenueAvailability>(
            "SELECT * FROM venue_availability WHERE venue_id = $1 AND date = $2 ORDER BY start_hour ASC"
        )
            .bind(venue_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_by_date(&self, venue_id: &str, date: NaiveDate) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM venue_availability WHERE venue_id = $1 AND date = $2")
            .bind(venue_id)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(res.rows_affected())
    }
}
