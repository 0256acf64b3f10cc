use std::sync::Arc;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;
use crate::domain::models::venue::Venue;
use crate::domain::ports::{BookingRepository, ConflictRepository, VenueAvailabilityRepository, VenueRepository};
use crate::domain::services::operating_window::{
    format_clock, local_day_bounds, local_range, resolve_operating_window, validate_duration,
    MinuteSpan, OperatingWindow,
};
use crate::domain::services::overlap::{check_slot, DayOccupancy, Overlaps, SlotCheck, TimeRange};
use crate::error::AppError;

const SLOT_STEP_MINUTES: u32 = 60;

#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    /// Venue-local "HH:MM".
    pub start_time: String,
    pub end_time: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(flatten)]
    pub check: SlotCheck,
}

#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub window: OperatingWindow,
    pub slots: Vec<Slot>,
}

impl DayAvailability {
    fn empty(window: OperatingWindow) -> Self {
        Self { window, slots: Vec::new() }
    }
}

/// Slot of one venue in a vendor-wide listing.
#[derive(Debug, Clone, Serialize)]
pub struct VenueSlot {
    pub venue_id: String,
    pub venue_name: String,
    #[serde(flatten)]
    pub slot: Slot,
}

fn build_slot(venue: &Venue, date: NaiveDate, span: MinuteSpan, occupancy: &DayOccupancy) -> Option<Slot> {
    let range = local_range(venue.tz(), date, span)?;
    Some(Slot {
        start_time: format_clock(span.start),
        end_time: format_clock(span.end),
        starts_at: range.start,
        ends_at: range.end,
        check: check_slot(&range, span.start / 60, occupancy, None),
    })
}

/// Enumerates the bookable slots of `venue` on `date`.
///
/// Each open period is walked in whole-hour steps from its opening time; a
/// slot is emitted while `start + duration <= close`, so slots never span a
/// closed gap. A non-positive duration yields no slots rather than an error.
pub fn calculate_slots(
    venue: &Venue,
    date: NaiveDate,
    duration_hours: i32,
    occupancy: &DayOccupancy,
) -> Result<DayAvailability, AppError> {
    let hours = venue.operating_hours()?;
    let window = resolve_operating_window(hours.as_ref(), date);

    if !venue.is_active {
        return Ok(DayAvailability::empty(OperatingWindow::closed("Venue is not active", window.source())));
    }
    if duration_hours <= 0 || !window.is_open() {
        return Ok(DayAvailability::empty(window));
    }

    let duration_min = (duration_hours as u32).saturating_mul(60);
    validate_duration(hours.as_ref().and_then(|h| h.booking_rules.as_ref()), &window, duration_min)?;

    let mut slots = Vec::new();
    for period in window.periods() {
        let mut cursor = period.start;
        while cursor.saturating_add(duration_min) <= period.end {
            if let Some(slot) = build_slot(venue, date, MinuteSpan::new(cursor, cursor + duration_min), occupancy) {
                slots.push(slot);
            }
            cursor += SLOT_STEP_MINUTES;
        }
    }

    slots.sort_by_key(|s| s.starts_at);
    slots.dedup_by_key(|s| s.starts_at);

    Ok(DayAvailability { window, slots })
}

/// Availability of an explicit `[start, start + duration)` request. Unlike the
/// grid in [`calculate_slots`], the start need not fall on the hourly step.
pub fn check_explicit_slot(
    venue: &Venue,
    date: NaiveDate,
    window: &OperatingWindow,
    span: MinuteSpan,
    occupancy: &DayOccupancy,
) -> Option<Slot> {
    let mut slot = build_slot(venue, date, span, occupancy)?;
    if !window.contains(span) {
        slot.check = SlotCheck::unavailable("Requested time is outside operating hours");
    }
    Some(slot)
}

pub struct AvailabilityService {
    venue_repo: Arc<dyn VenueRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    conflict_repo: Arc<dyn ConflictRepository>,
    marker_repo: Arc<dyn VenueAvailabilityRepository>,
}

impl AvailabilityService {
    pub fn new(
        venue_repo: Arc<dyn VenueRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        conflict_repo: Arc<dyn ConflictRepository>,
        marker_repo: Arc<dyn VenueAvailabilityRepository>,
    ) -> Self {
        Self { venue_repo, booking_repo, conflict_repo, marker_repo }
    }

    pub async fn find_venue(&self, venue_id: &str) -> Result<Venue, AppError> {
        self.venue_repo.find_by_id(venue_id).await?
            .ok_or(AppError::NotFound("Venue not found".into()))
    }

    /// Confirmed bookings and active conflicts overlapping `range`.
    pub async fn find_conflicts(&self, venue_id: &str, range: &TimeRange) -> Result<Overlaps, AppError> {
        let bookings = self.booking_repo.find_overlapping(venue_id, range.start, range.end).await?;
        let conflicts = self.conflict_repo.find_overlapping(venue_id, range.start, range.end).await?;
        Ok(Overlaps { bookings, conflicts })
    }

    pub async fn load_occupancy(&self, venue: &Venue, date: NaiveDate) -> Result<DayOccupancy, AppError> {
        let day = local_day_bounds(venue.tz(), date);
        let overlaps = self.find_conflicts(&venue.id, &day).await?;
        let markers = self.marker_repo.list_by_date(&venue.id, date).await?;

        Ok(DayOccupancy {
            bookings: overlaps.bookings,
            conflicts: overlaps.conflicts,
            markers,
        })
    }

    pub async fn venue_day(&self, venue: &Venue, date: NaiveDate, duration_hours: i32) -> Result<DayAvailability, AppError> {
        let occupancy = self.load_occupancy(venue, date).await?;
        calculate_slots(venue, date, duration_hours, &occupancy)
    }

    /// Slots of every active venue of a vendor, ordered by start time and then
    /// venue name. Venues whose rules reject the duration are left out.
    pub async fn vendor_day(
        &self,
        vendor_id: &str,
        date: NaiveDate,
        duration_hours: i32,
    ) -> Result<(Vec<(Venue, OperatingWindow)>, Vec<VenueSlot>), AppError> {
        let venues = self.venue_repo.list_active_by_vendor(vendor_id).await?;

        let mut summaries = Vec::with_capacity(venues.len());
        let mut slots = Vec::new();

        for venue in venues {
            match self.venue_day(&venue, date, duration_hours).await {
                Ok(day) => {
                    slots.extend(day.slots.into_iter().map(|slot| VenueSlot {
                        venue_id: venue.id.clone(),
                        venue_name: venue.name.clone(),
                        slot,
                    }));
                    summaries.push((venue, day.window));
                }
                Err(AppError::Validation(msg)) => {
                    debug!("Skipping venue {} in vendor listing: {}", venue.id, msg);
                    let source = resolve_operating_window(venue.operating_hours()?.as_ref(), date).source();
                    summaries.push((venue, OperatingWindow::closed(msg, source)));
                }
                Err(e) => return Err(e),
            }
        }

        slots.sort_by(|a, b| {
            a.slot.starts_at.cmp(&b.slot.starts_at)
                .then_with(|| a.venue_name.cmp(&b.venue_name))
        });

        Ok((summaries, slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::booking::{Booking, NewBookingParams};
    use crate::domain::models::operating_hours::{
        BookingRules, DayHours, OpenPeriod, OperatingHours, SpecialDateOverride, WeeklySchedule,
    };
    use chrono::TimeZone;

    // 2024-12-25 is a Wednesday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
    }

    fn open(periods: &[(&str, &str)]) -> Option<DayHours> {
        Some(DayHours {
            closed: false,
            periods: periods.iter().map(|(o, c)| OpenPeriod::new(o, c)).collect(),
        })
    }

    fn venue_with(hours: OperatingHours) -> Venue {
        Venue::new("vendor".into(), "Court 1".into(), 1000).with_operating_hours(&hours)
    }

    fn nine_to_nine() -> OperatingHours {
        OperatingHours {
            regular: WeeklySchedule {
                wednesday: open(&[("09:00", "21:00")]),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn confirmed(venue: &Venue, from: u32, to: u32) -> Booking {
        Booking::new(NewBookingParams {
            venue_id: venue.id.clone(),
            vendor_id: venue.vendor_id.clone(),
            booking_date: wednesday(),
            start: Utc.with_ymd_and_hms(2024, 12, 25, from, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 12, 25, to, 0, 0).unwrap(),
            booking_type: "REGULAR".into(),
            total_amount: 0,
            currency: "INR".into(),
            customer_name: None,
            customer_phone: None,
            notes: None,
        })
    }

    #[test]
    fn test_two_hour_slots_end_at_closing() {
        let venue = venue_with(nine_to_nine());
        let day = calculate_slots(&venue, wednesday(), 2, &DayOccupancy::default()).unwrap();

        let starts: Vec<&str> = day.slots.iter().map(|s| s.start_time.as_str()).collect();
        assert_eq!(starts.first(), Some(&"09:00"));
        assert_eq!(starts.last(), Some(&"19:00"));
        assert_eq!(day.slots.last().unwrap().end_time, "21:00");
        assert_eq!(day.slots.len(), 11);

        for slot in &day.slots {
            assert_eq!(slot.ends_at - slot.starts_at, chrono::Duration::hours(2));
            assert!(slot.start_time.as_str() >= "09:00" && slot.end_time.as_str() <= "21:00");
        }
    }

    #[test]
    fn test_split_periods_never_span_gap() {
        let hours = OperatingHours {
            regular: WeeklySchedule {
                wednesday: open(&[("08:00", "12:00"), ("14:00", "18:00")]),
                ..Default::default()
            },
            ..Default::default()
        };
        let venue = venue_with(hours);
        let day = calculate_slots(&venue, wednesday(), 2, &DayOccupancy::default()).unwrap();

        let starts: Vec<&str> = day.slots.iter().map(|s| s.start_time.as_str()).collect();
        assert_eq!(starts, vec!["08:00", "09:00", "10:00", "14:00", "15:00", "16:00"]);
    }

    #[test]
    fn test_non_positive_duration_is_empty_not_error() {
        let venue = venue_with(nine_to_nine());
        assert!(calculate_slots(&venue, wednesday(), 0, &DayOccupancy::default()).unwrap().slots.is_empty());
        assert!(calculate_slots(&venue, wednesday(), -3, &DayOccupancy::default()).unwrap().slots.is_empty());
    }

    #[test]
    fn test_special_closure_reports_reason() {
        let mut hours = nine_to_nine();
        hours.special_dates.push(SpecialDateOverride {
            date: wednesday(),
            closed: true,
            reason: Some("Christmas".into()),
            periods: vec![],
        });
        let venue = venue_with(hours);
        let day = calculate_slots(&venue, wednesday(), 1, &DayOccupancy::default()).unwrap();

        assert!(day.slots.is_empty());
        assert_eq!(day.window.reason(), Some("Christmas"));
    }

    #[test]
    fn test_inactive_venue_has_no_slots() {
        let mut venue = venue_with(nine_to_nine());
        venue.is_active = false;
        let day = calculate_slots(&venue, wednesday(), 1, &DayOccupancy::default()).unwrap();
        assert!(day.slots.is_empty());
        assert_eq!(day.window.reason(), Some("Venue is not active"));
    }

    #[test]
    fn test_duration_rules_raise_validation() {
        let mut hours = nine_to_nine();
        hours.booking_rules = Some(BookingRules { min_duration_hours: Some(1), max_duration_hours: Some(3) });
        let venue = venue_with(hours);

        let err = calculate_slots(&venue, wednesday(), 4, &DayOccupancy::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Maximum")));
    }

    #[test]
    fn test_duration_longer_than_any_period_is_rejected() {
        let venue = venue_with(nine_to_nine());
        assert!(matches!(
            calculate_slots(&venue, wednesday(), 13, &DayOccupancy::default()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_booked_slots_flagged_and_recomputation_is_stable() {
        let venue = venue_with(nine_to_nine());
        let occupancy = DayOccupancy { bookings: vec![confirmed(&venue, 15, 17)], ..Default::default() };

        let first = calculate_slots(&venue, wednesday(), 2, &occupancy).unwrap();
        let second = calculate_slots(&venue, wednesday(), 2, &occupancy).unwrap();
        assert_eq!(
            serde_json::to_value(&first.slots).unwrap(),
            serde_json::to_value(&second.slots).unwrap()
        );

        let by_start = |t: &str| first.slots.iter().find(|s| s.start_time == t).unwrap().clone();
        assert!(!by_start("14:00").check.is_available);
        assert!(by_start("14:00").check.has_booking);
        assert!(!by_start("16:00").check.is_available);
        assert!(by_start("13:00").check.is_available);
        assert!(by_start("17:00").check.is_available);
    }

    #[test]
    fn test_slots_are_converted_from_venue_timezone() {
        let mut venue = venue_with(nine_to_nine());
        venue.timezone = "Asia/Kolkata".into();
        let day = calculate_slots(&venue, wednesday(), 1, &DayOccupancy::default()).unwrap();

        let first = &day.slots[0];
        assert_eq!(first.start_time, "09:00");
        assert_eq!(first.starts_at.to_rfc3339(), "2024-12-25T03:30:00+00:00");
    }

    #[test]
    fn test_explicit_slot_outside_hours() {
        let venue = venue_with(nine_to_nine());
        let window = resolve_operating_window(venue.operating_hours().unwrap().as_ref(), wednesday());

        let inside = check_explicit_slot(&venue, wednesday(), &window, MinuteSpan::new(600, 690), &DayOccupancy::default()).unwrap();
        assert!(inside.check.is_available);
        assert_eq!(inside.start_time, "10:00");
        assert_eq!(inside.end_time, "11:30");

        let outside = check_explicit_slot(&venue, wednesday(), &window, MinuteSpan::new(1200, 1320), &DayOccupancy::default()).unwrap();
        assert!(!outside.check.is_available);
    }
}
