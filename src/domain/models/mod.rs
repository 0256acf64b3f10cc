pub mod venue;
pub mod operating_hours;
pub mod booking;
pub mod conflict;
pub mod venue_availability;
