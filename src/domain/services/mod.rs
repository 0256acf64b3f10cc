pub mod operating_window;
pub mod overlap;
pub mod availability;
pub mod booking_service;
