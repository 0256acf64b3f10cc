use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::{booking::Booking, conflict::Conflict, venue_availability::VenueAvailability};

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        intervals_overlap(self, other)
    }
}

/// Two half-open intervals overlap iff each one starts before the other ends.
/// Adjacent intervals (`a.end == b.start`) do not overlap.
pub fn intervals_overlap(a: &TimeRange, b: &TimeRange) -> bool {
    a.start < b.end && b.start < a.end
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictingRecord {
    Booking {
        id: String,
        reference: String,
        status: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    Conflict {
        id: String,
        reason: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
}

impl From<&Booking> for ConflictingRecord {
    fn from(b: &Booking) -> Self {
        ConflictingRecord::Booking {
            id: b.id.clone(),
            reference: b.reference.clone(),
            status: b.status.clone(),
            start_time: b.start_time,
            end_time: b.end_time,
        }
    }
}

impl From<&Conflict> for ConflictingRecord {
    fn from(c: &Conflict) -> Self {
        ConflictingRecord::Conflict {
            id: c.id.clone(),
            reason: c.reason.clone(),
            start_time: c.start_time,
            end_time: c.end_time,
        }
    }
}

/// Everything that can make a slot unavailable on one venue-day.
#[derive(Debug, Clone, Default)]
pub struct DayOccupancy {
    pub bookings: Vec<Booking>,
    pub conflicts: Vec<Conflict>,
    pub markers: Vec<VenueAvailability>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotCheck {
    pub is_available: bool,
    pub has_booking: bool,
    pub has_conflict: bool,
    pub conflicting: Option<ConflictingRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SlotCheck {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            has_booking: false,
            has_conflict: false,
            conflicting: None,
            reason: Some(reason.into()),
        }
    }
}

/// Tests `range` against confirmed bookings, active conflicts and, when the
/// date has explicit markers, the marker for `local_start_hour`.
///
/// `ignore_booking` excludes one booking id, used when re-confirming an
/// existing booking.
pub fn check_slot(
    range: &TimeRange,
    local_start_hour: u32,
    occupancy: &DayOccupancy,
    ignore_booking: Option<&str>,
) -> SlotCheck {
    let booking = occupancy.bookings.iter().find(|b| {
        b.is_confirmed()
            && ignore_booking != Some(b.id.as_str())
            && range.overlaps(&TimeRange::new(b.start_time, b.end_time))
    });

    let conflict = occupancy.conflicts.iter().find(|c| {
        c.is_active && range.overlaps(&TimeRange::new(c.start_time, c.end_time))
    });

    let marker_ok = occupancy.markers.is_empty()
        || occupancy.markers.iter().any(|m| m.start_hour as u32 == local_start_hour && m.is_available);

    let reason = if booking.is_some() {
        Some("Slot is already booked".to_string())
    } else if let Some(c) = conflict {
        Some(format!("Slot is blocked: {}", c.reason))
    } else if !marker_ok {
        Some("Slot is not marked available for this date".to_string())
    } else {
        None
    };

    SlotCheck {
        is_available: booking.is_none() && conflict.is_none() && marker_ok,
        has_booking: booking.is_some(),
        has_conflict: conflict.is_some(),
        conflicting: booking.map(ConflictingRecord::from).or_else(|| conflict.map(ConflictingRecord::from)),
        reason,
    }
}

/// Confirmed bookings and active conflicts overlapping one interval.
#[derive(Debug, Clone, Default)]
pub struct Overlaps {
    pub bookings: Vec<Booking>,
    pub conflicts: Vec<Conflict>,
}

impl Overlaps {
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty() && self.conflicts.is_empty()
    }

    pub fn first(&self) -> Option<ConflictingRecord> {
        self.bookings.first().map(ConflictingRecord::from)
            .or_else(|| self.conflicts.first().map(ConflictingRecord::from))
    }
}
