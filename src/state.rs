use std::sync::Arc;
use crate::domain::ports::{
    VenueRepository, BookingRepository, ConflictRepository, VenueAvailabilityRepository,
};
use crate::domain::services::{availability::AvailabilityService, booking_service::BookingService};

#[derive(Clone)]
pub struct AppState {
    pub venue_repo: Arc<dyn VenueRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub conflict_repo: Arc<dyn ConflictRepository>,
    pub marker_repo: Arc<dyn VenueAvailabilityRepository>,
    pub availability_service: Arc<AvailabilityService>,
    pub booking_service: Arc<BookingService>,
}

impl AppState {
    /// Wires the services on top of one set of repositories.
    pub fn new(
        venue_repo: Arc<dyn VenueRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        conflict_repo: Arc<dyn ConflictRepository>,
        marker_repo: Arc<dyn VenueAvailabilityRepository>,
    ) -> Self {
        let availability_service = Arc::new(AvailabilityService::new(
            venue_repo.clone(),
            booking_repo.clone(),
            conflict_repo.clone(),
            marker_repo.clone(),
        ));
        let booking_service = Arc::new(BookingService::new(booking_repo.clone(), availability_service.clone()));

        Self {
            venue_repo,
            booking_repo,
            conflict_repo,
            marker_repo,
            availability_service,
            booking_service,
        }
    }
}
