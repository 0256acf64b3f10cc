use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateBookingRequest, UpdateBookingStatusRequest};
use crate::domain::services::booking_service::{BookingDraft, StatusChange};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_booking: venue {} on {} at {}", venue_id, payload.date, payload.start_time);

    let draft = BookingDraft {
        venue_id,
        date: payload.date,
        start_time: payload.start_time,
        duration: payload.duration,
        end_time: payload.end_time,
        total_amount: payload.total_amount,
        booking_type: payload.booking_type,
        customer_name: payload.customer_name,
        customer_phone: payload.customer_phone,
        notes: payload.notes,
    };

    let booking = state.booking_service.create_booking(draft).await?;
    Ok(Json(booking))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.find(&booking_id).await?;
    Ok(Json(booking))
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let change = StatusChange {
        status: payload.status,
        refund_amount: payload.refund_amount,
        reason: payload.reason,
    };

    let updated = state.booking_service.change_status(&booking_id, change).await?;
    Ok(Json(updated))
}
