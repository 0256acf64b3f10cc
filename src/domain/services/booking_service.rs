use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use crate::domain::models::booking::{Booking, BookingStatus, NewBookingParams};
use crate::domain::ports::BookingRepository;
use crate::domain::services::availability::AvailabilityService;
use crate::domain::services::operating_window::{
    local_range, parse_clock, resolve_operating_window, validate_duration, MinuteSpan, OperatingWindow,
    MINUTES_PER_DAY,
};
use crate::domain::services::overlap::{check_slot, TimeRange};
use crate::error::AppError;

const DEFAULT_BOOKING_TYPE: &str = "REGULAR";
const UNAVAILABLE_MESSAGE: &str = "Venue is not available for the selected time slot";

/// Raw booking request as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub venue_id: String,
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

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: String,
    pub refund_amount: Option<i64>,
    pub reason: Option<String>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

/// Resolves the requested local span from a start and either a duration in
/// hours or an explicit end. When both are given they must agree.
pub fn requested_span(start_time: &str, duration: Option<i32>, end_time: Option<&str>) -> Result<MinuteSpan, AppError> {
    let start = parse_clock(start_time)
        .filter(|m| *m < MINUTES_PER_DAY)
        .ok_or(AppError::Validation("Invalid start time format (HH:MM)".into()))?;

    let explicit_end = end_time
        .map(|e| parse_clock(e).ok_or(AppError::Validation("Invalid end time format (HH:MM)".into())))
        .transpose()?;

    let end = match (duration, explicit_end) {
        (Some(d), _) if d <= 0 => {
            return Err(AppError::Validation("Duration must be a positive number of hours".into()));
        }
        (Some(d), Some(end)) => {
            if end as i64 != start as i64 + d as i64 * 60 {
                return Err(AppError::Validation("End time does not match start time plus duration".into()));
            }
            end
        }
        (Some(d), None) => {
            let end = start as i64 + d as i64 * 60;
            if end > MINUTES_PER_DAY as i64 {
                return Err(AppError::Validation("Booking cannot extend past midnight".into()));
            }
            end as u32
        }
        (None, Some(end)) => end,
        (None, None) => {
            return Err(AppError::Validation("Either duration or end_time is required".into()));
        }
    };

    if end <= start {
        return Err(AppError::Validation("End time must be after start time".into()));
    }

    Ok(MinuteSpan::new(start, end))
}

fn normalize_booking_type(value: Option<String>) -> String {
    value
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_BOOKING_TYPE.to_string())
}

pub struct BookingService {
    booking_repo: Arc<dyn BookingRepository>,
    availability: Arc<AvailabilityService>,
}

impl BookingService {
    pub fn new(booking_repo: Arc<dyn BookingRepository>, availability: Arc<AvailabilityService>) -> Self {
        Self { booking_repo, availability }
    }

    pub async fn find(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    /// Validates the draft, re-runs the overlap check and persists a
    /// CONFIRMED booking.
    pub async fn create_booking(&self, draft: BookingDraft) -> Result<Booking, AppError> {
        let venue = self.availability.find_venue(&draft.venue_id).await?;
        if !venue.is_active {
            return Err(AppError::Validation("Venue is not active".into()));
        }

        let date = parse_date(&draft.date)?;
        let span = requested_span(&draft.start_time, draft.duration, draft.end_time.as_deref())?;

        let hours = venue.operating_hours()?;
        let window = resolve_operating_window(hours.as_ref(), date);
        if let OperatingWindow::Closed { reason, .. } = &window {
            return Err(AppError::Validation(format!("Venue is closed on {}: {}", date, reason)));
        }
        if !window.contains(span) {
            return Err(AppError::Validation("Requested time is outside operating hours".into()));
        }
        validate_duration(hours.as_ref().and_then(|h| h.booking_rules.as_ref()), &window, span.len())?;

        let range = local_range(venue.tz(), date, span)
            .ok_or(AppError::Validation("Requested time falls on a daylight saving change in the venue's timezone".into()))?;

        let occupancy = self.availability.load_occupancy(&venue, date).await?;
        let check = check_slot(&range, span.start / 60, &occupancy, None);
        if !check.is_available {
            let reason = check.reason.unwrap_or_default();
            warn!("Booking rejected for venue {} on {} {}: {}", venue.id, date, draft.start_time, reason);
            return Err(AppError::Conflict(format!("{}: {}", UNAVAILABLE_MESSAGE, reason)));
        }

        let total_amount = match draft.total_amount {
            Some(amount) if amount < 0 => {
                return Err(AppError::Validation("Total amount cannot be negative".into()));
            }
            Some(amount) => amount,
            None => venue.price_per_hour * span.len() as i64 / 60,
        };

        let booking = Booking::new(NewBookingParams {
            venue_id: venue.id.clone(),
            vendor_id: venue.vendor_id.clone(),
            booking_date: date,
            start: range.start,
            end: range.end,
            booking_type: normalize_booking_type(draft.booking_type),
            total_amount,
            currency: venue.currency.clone(),
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            notes: draft.notes,
        });

        let created = self.booking_repo.create_if_free(&booking).await?
            .ok_or_else(|| {
                warn!("Booking for venue {} lost a concurrent write race at {}", venue.id, range.start);
                AppError::Conflict(format!("{}: Slot was booked concurrently", UNAVAILABLE_MESSAGE))
            })?;

        info!("Booking confirmed: {} ({}) for venue {}", created.id, created.reference, venue.id);
        Ok(created)
    }

    /// Applies a whitelisted status transition. Confirming re-checks the slot;
    /// cancelling may record a refund of at most the booking total.
    pub async fn change_status(&self, booking_id: &str, change: StatusChange) -> Result<Booking, AppError> {
        let mut booking = self.find(booking_id).await?;

        let next: BookingStatus = change.status.parse().map_err(AppError::Validation)?;
        let current = booking.status()
            .ok_or_else(|| AppError::InternalWithMsg(format!("Booking {} has unknown status {}", booking.id, booking.status)))?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidTransition { from: current, to: next });
        }

        if change.refund_amount.is_some() && next != BookingStatus::Cancelled {
            return Err(AppError::Validation("Refund amount is only accepted when cancelling".into()));
        }

        match next {
            BookingStatus::Confirmed => {
                let range = TimeRange::new(booking.start_time, booking.end_time);
                let overlaps = self.availability.find_conflicts(&booking.venue_id, &range).await?;
                let blocking = overlaps.bookings.iter().any(|b| b.id != booking.id) || !overlaps.conflicts.is_empty();
                if blocking {
                    return Err(AppError::Conflict(UNAVAILABLE_MESSAGE.into()));
                }
            }
            BookingStatus::Cancelled => {
                if let Some(refund) = change.refund_amount {
                    if refund < 0 || refund > booking.total_amount {
                        return Err(AppError::Validation(format!(
                            "Refund amount must be between 0 and {}", booking.total_amount
                        )));
                    }
                    booking.refund_amount = Some(refund);
                }
                booking.cancellation_reason = change.reason;
            }
            _ => {}
        }

        booking.status = next.to_string();
        booking.updated_at = Utc::now();

        let updated = self.booking_repo.update_status(&booking).await?;
        info!("Booking {} moved from {} to {}", updated.id, current, next);
        Ok(updated)
    }
}
