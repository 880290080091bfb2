//! Collision avoidance against existing bookings

use chrono::NaiveDate;

use crate::types::{Appointment, TimeSlot};

/// Appointments starting on `date` (calendar-day equality), sorted by start.
/// The sort is stable so equal starts keep their input order.
pub fn appointments_on(date: NaiveDate, appointments: &[Appointment]) -> Vec<&Appointment> {
    let mut day: Vec<&Appointment> = appointments
        .iter()
        .filter(|apt| apt.start.date() == date)
        .collect();
    day.sort_by_key(|apt| apt.start);
    day
}

/// Drop candidates that overlap any of the day's appointments
pub fn remove_collisions(candidates: Vec<TimeSlot>, day_appointments: &[&Appointment]) -> Vec<TimeSlot> {
    candidates
        .into_iter()
        .filter(|slot| !day_appointments.iter().any(|apt| apt.overlaps(slot)))
        .collect()
}
