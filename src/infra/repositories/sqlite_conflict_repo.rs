use crate::domain::{models::conflict::Conflict, ports::ConflictRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteConflictRepo {
    pool: SqlitePool,
}

impl SqliteConflictRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ConflictRepository for SqliteConflictRepo {
    async fn create(&self, conflict: &Conflict) -> Result<Conflict, AppError> {
        sqlx::query_as::<_, Conflict>(
            r#"INSERT INTO conflicts (id, venue_id, start_time, end_time, reason, is_active, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&conflict.id)
            .bind(&conflict.venue_id)
            .bind(conflict.start_time)
            .bind(conflict.end_time)
            .bind(&conflict.reason)
            .bind(conflict.is_active)
            .bind(conflict.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_overlapping(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Conflict>, AppError> {
        sqlx::query_as::<_, Conflict>(
            "SELECT * FROM conflicts WHERE venue_id = ? AND is_active = 1 AND start_time < ? AND end_time > ? ORDER BY start_time ASC"
        )
            .bind(venue_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Conflict>, AppError> {
        sqlx::query_as::<_, Conflict>(
            "SELECT * FROM conflicts WHERE venue_id = ? AND start_time < ? AND end_time > ? ORDER BY start_time ASC"
        )
            .bind(venue_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn deactivate(&self, id: &str) -> Result<Conflict, AppError> {
        sqlx::query_as::<_, Conflict>("UPDATE conflicts SET is_active = 0 WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Conflict not found".into()))
    }
}
