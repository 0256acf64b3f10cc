use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub date: String,
    pub start_time: String,
    pub duration: Option<i32>,
    pub end_time: Option<String>,
    pub total_amount: Option<i64>,
    pub booking_type: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
    pub refund_amount: Option<i64>,
    pub reason: Option<String>,
}

/// `start_time`/`end_time` are either venue-local "HH:MM" (with `date`) or
/// RFC 3339 instants.
#[derive(Deserialize)]
pub struct CreateConflictRequest {
    pub date: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct MarkerSlotRequest {
    pub start_hour: i32,
    pub is_available: bool,
}

#[derive(Deserialize)]
pub struct UpsertMarkersRequest {
    pub date: NaiveDate,
    pub slots: Vec<MarkerSlotRequest>,
}
