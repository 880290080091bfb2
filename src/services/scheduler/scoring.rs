//! Marginal travel cost of inserting a job into a day's route

use crate::services::travel::TravelEstimator;
use crate::types::{Appointment, GeoLocation, ScoredSlot, TimeSlot};

/// Chronological neighbors of a candidate within its day
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighbors<'a> {
    /// Latest appointment ending at or before the candidate start
    pub prev: Option<&'a Appointment>,
    /// First appointment starting at or after the candidate end
    pub next: Option<&'a Appointment>,
}

/// Single forward scan over appointments sorted by start
pub fn find_neighbors<'a>(slot: &TimeSlot, day_appointments: &[&'a Appointment]) -> Neighbors<'a> {
    let mut neighbors = Neighbors::default();
    for &apt in day_appointments {
        if apt.end <= slot.start {
            neighbors.prev = Some(apt);
        }
        if neighbors.next.is_none() && apt.start >= slot.end {
            neighbors.next = Some(apt);
        }
    }
    neighbors
}

/// Score one collision-free candidate.
///
/// Returns `None` when the gap to either neighbor is shorter than the travel
/// time it needs, so every scored slot is reachable under the travel model.
pub fn score_slot<E: TravelEstimator + ?Sized>(
    slot: &TimeSlot,
    target: &GeoLocation,
    day_appointments: &[&Appointment],
    home_base: &GeoLocation,
    estimator: &E,
) -> Option<ScoredSlot> {
    let Neighbors { prev, next } = find_neighbors(slot, day_appointments);

    let prev_loc = prev.map_or(home_base, |apt| &apt.location);
    let next_loc = next.map_or(home_base, |apt| &apt.location);

    let travel_to_client = estimator.estimate_minutes(prev_loc, target);
    let travel_from_client = estimator.estimate_minutes(target, next_loc);
    let baseline = estimator.estimate_minutes(prev_loc, next_loc);

    if let Some(apt) = prev {
        let gap_secs = (slot.start - apt.end).num_seconds();
        if gap_secs < travel_to_client * 60 {
            return None;
        }
    }
    if let Some(apt) = next {
        let gap_secs = (apt.start - slot.end).num_seconds();
        if gap_secs < travel_from_client * 60 {
            return None;
        }
    }

    // Not clamped: a target lying on the existing path may shorten the day
    let score = travel_to_client + travel_from_client - baseline;

    Some(ScoredSlot {
        slot: *slot,
        score,
        travel_to_client,
        travel_from_client,
        reason: format!(
            "Fits between {} and {}",
            if prev.is_some() { "appointment" } else { "start" },
            if next.is_some() { "appointment" } else { "end" },
        ),
    })
}
