pub mod health;
pub mod availability;
pub mod booking;
pub mod conflict;
pub mod venue_availability;
