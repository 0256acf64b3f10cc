use chrono::NaiveDate;
use serde::Serialize;
use crate::domain::models::{booking::Booking, conflict::Conflict, venue::Venue};
use crate::domain::services::availability::{Slot, VenueSlot};
use crate::domain::services::operating_window::{format_clock, HoursSource, OperatingWindow};

#[derive(Serialize)]
pub struct PeriodResponse {
    pub open: String,
    pub close: String,
}

#[derive(Serialize)]
pub struct OperatingHoursSummary {
    pub is_open: bool,
    pub open: Option<String>,
    pub close: Option<String>,
    pub periods: Vec<PeriodResponse>,
    /// Hours come from a seasonal or special-date override.
    pub is_custom: bool,
    pub is_special: bool,
    pub source: HoursSource,
    pub reason: Option<String>,
}

impl From<&OperatingWindow> for OperatingHoursSummary {
    fn from(window: &OperatingWindow) -> Self {
        let periods = window.periods();
        let source = window.source();

        Self {
            is_open: window.is_open(),
            open: periods.first().map(|p| format_clock(p.start)),
            close: periods.last().map(|p| format_clock(p.end)),
            periods: periods.iter()
                .map(|p| PeriodResponse { open: format_clock(p.start), close: format_clock(p.end) })
                .collect(),
            is_custom: matches!(source, HoursSource::Seasonal | HoursSource::Special),
            is_special: source == HoursSource::Special,
            source,
            reason: window.reason().map(str::to_string),
        }
    }
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub venue_id: String,
    pub date: NaiveDate,
    pub duration: i32,
    pub timezone: String,
    pub operating_hours: OperatingHoursSummary,
    pub slots: Vec<Slot>,
}

#[derive(Serialize)]
pub struct VenueHoursResponse {
    pub venue_id: String,
    pub venue_name: String,
    pub operating_hours: OperatingHoursSummary,
}

impl VenueHoursResponse {
    pub fn new(venue: &Venue, window: &OperatingWindow) -> Self {
        Self {
            venue_id: venue.id.clone(),
            venue_name: venue.name.clone(),
            operating_hours: window.into(),
        }
    }
}

#[derive(Serialize)]
pub struct VendorAvailabilityResponse {
    pub vendor_id: String,
    pub date: NaiveDate,
    pub duration: i32,
    pub venues: Vec<VenueHoursResponse>,
    pub slots: Vec<VenueSlot>,
}

#[derive(Serialize)]
pub struct TimelineResponse {
    pub venue_id: String,
    pub date: NaiveDate,
    pub bookings: Vec<Booking>,
    pub conflicts: Vec<Conflict>,
}
