use crate::domain::models::{
    venue::Venue, booking::Booking, conflict::Conflict, venue_availability::VenueAvailability,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn create(&self, venue: &Venue) -> Result<Venue, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Venue>, AppError>;
    async fn list_active_by_vendor(&self, vendor_id: &str) -> Result<Vec<Venue>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking unless a confirmed booking or active conflict
    /// overlaps it at write time. `None` means the slot was taken.
    async fn create_if_free(&self, booking: &Booking) -> Result<Option<Booking>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    /// Confirmed bookings overlapping `[start, end)`.
    async fn find_overlapping(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Bookings of any status overlapping `[start, end)`, ordered by start.
    async fn list_by_range(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    async fn update_status(&self, booking: &Booking) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait ConflictRepository: Send + Sync {
    async fn create(&self, conflict: &Conflict) -> Result<Conflict, AppError>;
    /// Active conflicts overlapping `[start, end)`.
    async fn find_overlapping(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Conflict>, AppError>;
    async fn list_by_range(&self, venue_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Conflict>, AppError>;
    async fn deactivate(&self, id: &str) -> Result<Conflict, AppError>;
}

#[async_trait]
pub trait VenueAvailabilityRepository: Send + Sync {
    /// Writes all markers in one transaction; on error none of them are kept.
    async fn upsert_many(&self, markers: &[VenueAvailability]) -> Result<Vec<VenueAvailability>, AppError>;
    async fn list_by_date(&self, venue_id: &str, date: NaiveDate) -> Result<Vec<VenueAvailability>, AppError>;
    async fn delete_by_date(&self, venue_id: &str, date: NaiveDate) -> Result<u64, AppError>;
}
