use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put, delete, patch},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, availability, booking, conflict, venue_availability};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Availability
        .route("/api/v1/venues/{venue_id}/availability", get(availability::get_venue_availability))
        .route("/api/v1/vendors/{vendor_id}/availability", get(availability::get_vendor_availability))
        .route("/api/v1/venues/{venue_id}/timeline", get(availability::get_timeline))

        // Bookings
        .route("/api/v1/venues/{venue_id}/bookings", post(booking::create_booking))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/status", patch(booking::update_booking_status))

        // Blocks
        .route("/api/v1/venues/{venue_id}/conflicts", post(conflict::create_conflict).get(conflict::list_conflicts))
        .route("/api/v1/conflicts/{conflict_id}", delete(conflict::deactivate_conflict))

        // Explicit hourly markers
        .route("/api/v1/venues/{venue_id}/availability-markers", put(venue_availability::upsert_markers).get(venue_availability::list_markers))
        .route("/api/v1/venues/{venue_id}/availability-markers/{date}", delete(venue_availability::delete_markers))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
