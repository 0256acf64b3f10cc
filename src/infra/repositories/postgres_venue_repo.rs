use crate::domain::{models::venue::Venue, ports::VenueRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresVenueRepo {
    pool: PgPool,
}

impl PostgresVenueRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VenueRepository for PostgresVenueRepo {
    async fn create(&self, venue: &Venue) -> Result<Venue, AppError> {
        sqlx::query_as::<_, Venue>(
            r#"INSERT INTO venues (id, vendor_id, name, price_per_hour, currency, operating_hours_json, timezone, is_active, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#
        )
            .bind(&venue.id)
            .bind(&venue.vendor_id)
            .bind(&venue.name)
            .bind(venue.price_per_hour)
            .bind(&venue.currency)
            .bind(&venue.operating_hours_json)
            .bind(&venue.timezone)
            .bind(venue.is_active)
            .bind(venue.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_by_vendor(&self, vendor_id: &str) -> Result<Vec<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE vendor_id = $1 AND is_active = TRUE ORDER BY name ASC")
            .bind(vendor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
