use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Explicit per-hour availability marker. Once any marker exists for a date,
/// only hours marked available can be booked on that date.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct VenueAvailability {
    pub id: String,
    pub venue_id: String,
    pub date: NaiveDate,
    pub start_hour: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl VenueAvailability {
    pub fn new(venue_id: String, date: NaiveDate, start_hour: i32, is_available: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            venue_id,
            date,
            start_hour,
            is_available,
            created_at: Utc::now(),
        }
    }
}
