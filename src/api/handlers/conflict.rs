use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateConflictRequest;
use crate::domain::models::{conflict::Conflict, venue::Venue};
use crate::domain::services::booking_service::parse_date;
use crate::domain::services::operating_window::{local_day_bounds, local_range, parse_clock, MinuteSpan, MINUTES_PER_DAY};
use crate::domain::services::overlap::TimeRange;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const DEFAULT_CONFLICT_REASON: &str = "Blocked";

fn parse_instant(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation("Invalid ISO time format".into()))
}

fn conflict_range(venue: &Venue, payload: &CreateConflictRequest) -> Result<TimeRange, AppError> {
    if payload.start_time.contains('T') || payload.end_time.contains('T') {
        return Ok(TimeRange::new(parse_instant(&payload.start_time)?, parse_instant(&payload.end_time)?));
    }

    let date_str = payload.date.as_ref()
        .ok_or(AppError::Validation("Date required for local times".into()))?;
    let date = parse_date(date_str)?;

    let start = parse_clock(&payload.start_time)
        .filter(|m| *m < MINUTES_PER_DAY)
        .ok_or(AppError::Validation("Invalid start time format (HH:MM)".into()))?;
    let end = parse_clock(&payload.end_time)
        .ok_or(AppError::Validation("Invalid end time format (HH:MM)".into()))?;
    if end <= start {
        return Err(AppError::Validation("End time must be after start time".into()));
    }

    local_range(venue.tz(), date, MinuteSpan::new(start, end))
        .ok_or(AppError::Validation("Requested time falls on a daylight saving change in the venue's timezone".into()))
}

pub async fn create_conflict(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Json(payload): Json<CreateConflictRequest>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.availability_service.find_venue(&venue_id).await?;
    let range = conflict_range(&venue, &payload)?;
    if range.end <= range.start {
        return Err(AppError::Validation("End time must be after start time".into()));
    }

    let reason = payload.reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFLICT_REASON.to_string());

    let conflict = Conflict::new(venue.id.clone(), range.start, range.end, reason);
    let saved = state.conflict_repo.create(&conflict).await?;

    info!("Blocked venue {} from {} to {}: {}", venue.id, saved.start_time, saved.end_time, saved.reason);
    Ok(Json(saved))
}

pub async fn list_conflicts(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.availability_service.find_venue(&venue_id).await?;

    let date_str = params.get("date").ok_or(AppError::Validation("Date required".into()))?;
    let day = local_day_bounds(venue.tz(), parse_date(date_str)?);

    let conflicts = state.conflict_repo.list_by_range(&venue.id, day.start, day.end).await?;
    Ok(Json(conflicts))
}

pub async fn deactivate_conflict(
    State(state): State<Arc<AppState>>,
    Path(conflict_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let conflict = state.conflict_repo.deactivate(&conflict_id).await?;
    info!("Deactivated conflict {} on venue {}", conflict.id, conflict.venue_id);
    Ok(Json(conflict))
}
