use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Administrative block on a venue (maintenance, private event) unrelated to a customer booking.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Conflict {
    pub id: String,
    pub venue_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Conflict {
    pub fn new(venue_id: String, start: DateTime<Utc>, end: DateTime<Utc>, reason: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            venue_id,
            start_time: start,
            end_time: end,
            reason,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
