use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::responses::{AvailabilityResponse, VendorAvailabilityResponse, VenueHoursResponse, TimelineResponse};
use crate::domain::services::availability::{calculate_slots, check_explicit_slot};
use crate::domain::services::booking_service::{parse_date, requested_span};
use crate::domain::services::operating_window::{format_clock, local_day_bounds};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const DEFAULT_DURATION_HOURS: i32 = 1;

fn duration_param(params: &HashMap<String, String>) -> Result<i32, AppError> {
    match params.get("duration") {
        None => Ok(DEFAULT_DURATION_HOURS),
        Some(raw) => raw.trim().parse()
            .map_err(|_| AppError::Validation("Invalid duration (whole hours)".into())),
    }
}

fn date_param(params: &HashMap<String, String>) -> Result<chrono::NaiveDate, AppError> {
    let date_str = params.get("date").ok_or(AppError::Validation("Date required".into()))?;
    parse_date(date_str)
}

pub async fn get_venue_availability(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date = date_param(&params)?;
    let duration = duration_param(&params)?;

    let venue = state.availability_service.find_venue(&venue_id).await?;
    let occupancy = state.availability_service.load_occupancy(&venue, date).await?;
    let day = calculate_slots(&venue, date, duration, &occupancy)?;

    let slots = match params.get("start_time") {
        None => day.slots,
        Some(_) if duration <= 0 || !day.window.is_open() => Vec::new(),
        Some(start) => {
            let span = requested_span(start, Some(duration), None)?;
            let label = format_clock(span.start);
            match day.slots.into_iter().find(|s| s.start_time == label) {
                Some(slot) => vec![slot],
                None => check_explicit_slot(&venue, date, &day.window, span, &occupancy)
                    .into_iter()
                    .collect(),
            }
        }
    };

    info!("Availability for venue {} on {} (duration {}h): {} slots", venue.id, date, duration, slots.len());

    Ok(Json(AvailabilityResponse {
        venue_id: venue.id,
        date,
        duration,
        timezone: venue.timezone,
        operating_hours: (&day.window).into(),
        slots,
    }))
}

pub async fn get_vendor_availability(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date = date_param(&params)?;
    let duration = duration_param(&params)?;

    let (venues, slots) = state.availability_service.vendor_day(&vendor_id, date, duration).await?;

    info!("Vendor availability for {} on {}: {} venues, {} slots", vendor_id, date, venues.len(), slots.len());

    Ok(Json(VendorAvailabilityResponse {
        vendor_id,
        date,
        duration,
        venues: venues.iter().map(|(venue, window)| VenueHoursResponse::new(venue, window)).collect(),
        slots,
    }))
}

pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date = date_param(&params)?;
    let venue = state.availability_service.find_venue(&venue_id).await?;
    let day = local_day_bounds(venue.tz(), date);

    let bookings = state.booking_repo.list_by_range(&venue.id, day.start, day.end).await?;
    let conflicts = state.conflict_repo.list_by_range(&venue.id, day.start, day.end).await?;

    Ok(Json(TimelineResponse {
        venue_id: venue.id,
        date,
        bookings,
        conflicts,
    }))
}
