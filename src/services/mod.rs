//! Business logic services

pub mod booking;
pub mod geo;
pub mod geocoding;
pub mod nominatim;
pub mod scheduler;
pub mod task_inbox;
pub mod travel;
