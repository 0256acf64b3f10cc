use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;
use crate::domain::models::operating_hours::OperatingHours;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Venue {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    /// Minor currency units.
    pub price_per_hour: i64,
    pub currency: String,
    pub operating_hours_json: Option<String>,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Venue {
    pub fn new(vendor_id: String, name: String, price_per_hour: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vendor_id,
            name,
            price_per_hour,
            currency: "INR".to_string(),
            operating_hours_json: None,
            timezone: "UTC".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_operating_hours(mut self, hours: &OperatingHours) -> Self {
        self.operating_hours_json = serde_json::to_string(hours).ok();
        self
    }

    /// Venue-local timezone. An unknown name falls back to UTC.
    pub fn tz(&self) -> Tz {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!("Venue {} has unknown timezone '{}', using UTC", self.id, self.timezone);
                chrono_tz::UTC
            }
        }
    }

    /// `None` when the venue has no configuration and runs on default hours.
    pub fn operating_hours(&self) -> Result<Option<OperatingHours>, AppError> {
        match self.operating_hours_json.as_deref() {
            None | Some("") | Some("null") => Ok(None),
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|e| AppError::InternalWithMsg(format!("Venue {} has malformed operating hours: {}", self.id, e))),
        }
    }
}
