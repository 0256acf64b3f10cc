pub mod sqlite_venue_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_conflict_repo;
pub mod sqlite_venue_availability_repo;

pub mod postgres_venue_repo;
pub mod postgres_booking_repo;
pub mod postgres_conflict_repo;
pub mod postgres_venue_availability_repo;
