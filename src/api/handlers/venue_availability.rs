use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::UpsertMarkersRequest;
use crate::domain::models::venue_availability::VenueAvailability;
use crate::domain::services::booking_service::parse_date;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn upsert_markers(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Json(payload): Json<UpsertMarkersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.availability_service.find_venue(&venue_id).await?;

    if let Some(bad) = payload.slots.iter().find(|s| !(0..24).contains(&s.start_hour)) {
        return Err(AppError::Validation(format!("Invalid start hour {} (0-23)", bad.start_hour)));
    }

    let markers: Vec<VenueAvailability> = payload.slots
        .iter()
        .map(|slot| VenueAvailability::new(venue.id.clone(), payload.date, slot.start_hour, slot.is_available))
        .collect();
    state.marker_repo.upsert_many(&markers).await?;

    info!("Upserted {} availability markers for venue {} on {}", payload.slots.len(), venue.id, payload.date);

    let markers = state.marker_repo.list_by_date(&venue.id, payload.date).await?;
    Ok(Json(markers))
}

pub async fn list_markers(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.availability_service.find_venue(&venue_id).await?;

    let date_str = params.get("date").ok_or(AppError::Validation("Date required".into()))?;
    let date = parse_date(date_str)?;

    let markers = state.marker_repo.list_by_date(&venue.id, date).await?;
    Ok(Json(markers))
}

pub async fn delete_markers(
    State(state): State<Arc<AppState>>,
    Path((venue_id, date_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let venue = state.availability_service.find_venue(&venue_id).await?;
    let date = parse_date(&date_str)?;

    let removed = state.marker_repo.delete_by_date(&venue.id, date).await?;
    info!("Deleted {} availability markers for venue {} on {}", removed, venue.id, date);
    Ok(Json(serde_json::json!({"status": "deleted", "removed": removed})))
}
