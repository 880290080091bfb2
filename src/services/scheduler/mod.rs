//! Smart slot suggester
//!
//! Recommends appointment windows for a new job ranked by the travel time it
//! adds to the technician's day. The pipeline is strictly forward:
//!
//! 1. enumerate fixed-duration candidates on a half-hour grid for each day
//! 2. drop candidates that overlap an existing appointment on that day
//! 3. score each survivor by its marginal detour between its two anchors,
//!    rejecting ones the technician cannot physically reach in time
//! 4. rank ascending by score and keep the best few
//!
//! Every call is pure: no state survives between invocations and "now" is
//! supplied by the caller.

pub mod collision;
pub mod generator;
pub mod ranking;
pub mod scoring;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::defaults::{MAX_DAYS_TO_CHECK, MAX_SUGGESTIONS, SLOT_STEP_MINUTES};
use crate::error::SchedulingError;
use crate::services::travel::{HaversineEstimator, TravelEstimator};
use crate::types::{Appointment, GeoLocation, ScoredSlot, UserPreferences};

/// Reject horizons that would make the search unbounded
pub fn check_horizon(days_to_check: u32) -> Result<(), SchedulingError> {
    if days_to_check > MAX_DAYS_TO_CHECK {
        return Err(SchedulingError::HorizonTooLong {
            days: days_to_check,
            max: MAX_DAYS_TO_CHECK,
        });
    }
    Ok(())
}

/// Slot suggester parameterised by the travel model
pub struct SlotSuggester<E = HaversineEstimator> {
    preferences: UserPreferences,
    estimator: E,
}

impl SlotSuggester<HaversineEstimator> {
    /// Suggester using the Haversine travel model
    pub fn new(preferences: UserPreferences) -> Self {
        Self::with_estimator(preferences, HaversineEstimator::new())
    }
}

impl<E: TravelEstimator> SlotSuggester<E> {
    pub fn with_estimator(preferences: UserPreferences, estimator: E) -> Self {
        Self { preferences, estimator }
    }

    /// Suggest the best slots for a job at `target` over `days_to_check`
    /// calendar days starting at `now`'s date.
    pub fn suggest(
        &self,
        now: NaiveDateTime,
        target: &GeoLocation,
        appointments: &[Appointment],
        days_to_check: u32,
    ) -> Result<Vec<ScoredSlot>, SchedulingError> {
        let scored = self.feasible_slots(now, target, appointments, days_to_check)?;

        let total = scored.len();
        let ranked = ranking::rank(scored, MAX_SUGGESTIONS);
        debug!(
            "Ranked {} feasible slots with {} estimator, returning {}",
            total,
            self.estimator.name(),
            ranked.len()
        );

        Ok(ranked)
    }

    /// Every reachable, collision-free candidate in generation order, unranked
    pub fn feasible_slots(
        &self,
        now: NaiveDateTime,
        target: &GeoLocation,
        appointments: &[Appointment],
        days_to_check: u32,
    ) -> Result<Vec<ScoredSlot>, SchedulingError> {
        self.preferences.validate()?;
        check_horizon(days_to_check)?;
        for apt in appointments {
            apt.validate()?;
        }

        let mut scored = Vec::new();

        for day in generator::generate_slots(now.date(), days_to_check, &self.preferences, SLOT_STEP_MINUTES) {
            let day_appointments = collision::appointments_on(day.date, appointments);
            let candidate_count = day.slots.len();
            let free = collision::remove_collisions(day.slots, &day_appointments);
            let free_count = free.len();

            let before = scored.len();
            scored.extend(free.iter().filter_map(|slot| {
                scoring::score_slot(
                    slot,
                    target,
                    &day_appointments,
                    &self.preferences.home_base,
                    &self.estimator,
                )
            }));

            debug!(
                "{}: {} candidates, {} collision-free, {} feasible ({} appointments)",
                day.date,
                candidate_count,
                free_count,
                scored.len() - before,
                day_appointments.len()
            );
        }

        Ok(scored)
    }
}

/// Best slots starting today, using the Haversine travel model
pub fn find_best_slots(
    target: &GeoLocation,
    appointments: &[Appointment],
    preferences: &UserPreferences,
    days_to_check: u32,
) -> Result<Vec<ScoredSlot>, SchedulingError> {
    find_best_slots_at(Local::now().naive_local(), target, appointments, preferences, days_to_check)
}

/// Same as [`find_best_slots`] with an explicit clock
pub fn find_best_slots_at(
    now: NaiveDateTime,
    target: &GeoLocation,
    appointments: &[Appointment],
    preferences: &UserPreferences,
    days_to_check: u32,
) -> Result<Vec<ScoredSlot>, SchedulingError> {
    SlotSuggester::new(preferences.clone()).suggest(now, target, appointments, days_to_check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Timelike};
    use uuid::Uuid;

    fn home() -> GeoLocation {
        GeoLocation::new(0.0, 0.0, "Home")
    }

    /// Approx 11 km east of home
    fn loc_a() -> GeoLocation {
        GeoLocation::new(0.0, 0.1, "Loc A")
    }

    fn prefs() -> UserPreferences {
        UserPreferences {
            work_start_hour: 8,
            work_end_hour: 17,
            appointment_duration_minutes: 60,
            home_base: home(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    /// Monday 2026-03-02, 07:00
    fn now() -> NaiveDateTime {
        at(2, 7, 0)
    }

    fn appointment(name: &str, location: GeoLocation, start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            client_name: name.to_string(),
            location,
            start,
            end,
            notes: None,
        }
    }

    fn busy_week() -> Vec<Appointment> {
        vec![
            appointment("Olsza", GeoLocation::new(0.02, 0.05, "Olsza"), at(2, 9, 0), at(2, 10, 0)),
            appointment("Ruczaj", GeoLocation::new(-0.03, 0.12, "Ruczaj"), at(2, 13, 0), at(2, 14, 30)),
            appointment("Kazimierz", GeoLocation::new(0.01, 0.09, "Kazimierz"), at(3, 8, 0), at(3, 11, 0)),
            appointment("Bronowice", GeoLocation::new(0.05, -0.02, "Bronowice"), at(4, 12, 0), at(4, 13, 0)),
            appointment("Podgórze", GeoLocation::new(-0.01, 0.03, "Podgórze"), at(4, 15, 0), at(4, 16, 0)),
        ]
    }

    #[test]
    fn test_empty_schedule_starts_at_work_start() {
        let slots = find_best_slots_at(now(), &loc_a(), &[], &prefs(), 1).unwrap();

        assert!(!slots.is_empty());
        assert_eq!(slots[0].start().hour(), 8);
        assert_eq!(slots[0].start().minute(), 0);
    }

    #[test]
    fn test_fully_booked_day_has_no_candidates() {
        let booked = vec![
            appointment("a", home(), at(2, 8, 0), at(2, 11, 0)),
            appointment("b", home(), at(2, 11, 0), at(2, 14, 0)),
            appointment("c", home(), at(2, 14, 0), at(2, 17, 0)),
        ];

        let today = find_best_slots_at(now(), &loc_a(), &booked, &prefs(), 1).unwrap();
        assert!(today.is_empty());

        let two_days = find_best_slots_at(now(), &loc_a(), &booked, &prefs(), 2).unwrap();
        assert!(!two_days.is_empty());
        assert!(two_days.iter().all(|s| s.start().date() == day(3)));
    }

    #[test]
    fn test_candidate_without_travel_time_to_next_is_excluded() {
        let booked = vec![appointment("next", home(), at(2, 10, 5), at(2, 11, 0))];

        let slots = SlotSuggester::new(prefs())
            .feasible_slots(now(), &loc_a(), &booked, 1)
            .unwrap();

        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start().time()).collect();
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        // 9:00-10:00 leaves 5 minutes for a 28 minute drive
        assert!(!starts.contains(&hm(9, 0)));
        // 11:00 leaves no time to get from the appointment to the client
        assert!(!starts.contains(&hm(11, 0)));
        assert!(starts.contains(&hm(8, 30)));
        assert!(starts.contains(&hm(11, 30)));
    }

    #[test]
    fn test_detour_cheaper_than_baseline_ranks_first() {
        let congested = |from: &GeoLocation, to: &GeoLocation| -> i64 {
            if (from.lng - to.lng).abs() > 0.15 { 40 } else { 15 }
        };
        let prefs = UserPreferences {
            home_base: GeoLocation::new(0.0, 1.0, "Far home"),
            ..prefs()
        };
        let booked = vec![
            appointment("prev", GeoLocation::new(0.0, 0.0, "P"), at(2, 8, 0), at(2, 9, 0)),
            appointment("next", GeoLocation::new(0.0, 0.2, "N"), at(2, 12, 0), at(2, 13, 0)),
        ];

        let slots = SlotSuggester::with_estimator(prefs, congested)
            .suggest(now(), &loc_a(), &booked, 1)
            .unwrap();

        assert!(slots[0].score < 0);
        assert_eq!(slots[0].score, -10);
        assert_eq!(slots[0].start(), at(2, 9, 30));
        assert_eq!(slots[0].reason, "Fits between appointment and appointment");
        assert!(slots.iter().skip(3).all(|s| s.score >= 0));
    }

    #[test]
    fn test_results_respect_hours_duration_and_bookings() {
        let appointments = busy_week();
        let slots = SlotSuggester::new(prefs())
            .feasible_slots(now(), &loc_a(), &appointments, 7)
            .unwrap();

        assert!(!slots.is_empty());
        for slot in &slots {
            assert!(slot.start().time() >= NaiveTime::from_hms_opt(8, 0, 0).unwrap());
            assert!(slot.end().time() <= NaiveTime::from_hms_opt(17, 0, 0).unwrap());
            assert_eq!(slot.start().date(), slot.end().date());
            assert_eq!(slot.slot.duration_minutes(), 60);
            for apt in &appointments {
                if apt.start.date() == slot.start().date() {
                    assert!(!apt.overlaps(&slot.slot), "{:?} overlaps {}", slot.slot, apt.client_name);
                }
            }
        }
    }

    #[test]
    fn test_ranking_is_monotonic_and_bounded() {
        let appointments = busy_week();
        let slots = find_best_slots_at(now(), &loc_a(), &appointments, &prefs(), 7).unwrap();

        assert!(slots.len() <= 5);
        for pair in slots.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }

        let feasible = SlotSuggester::new(prefs())
            .feasible_slots(now(), &loc_a(), &appointments, 7)
            .unwrap();
        let all = ranking::rank(feasible, usize::MAX);
        assert!(slots.len() <= all.len());
        assert_eq!(slots[..], all[..slots.len()]);
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let appointments = busy_week();
        let first = find_best_slots_at(now(), &loc_a(), &appointments, &prefs(), 7).unwrap();
        let second = find_best_slots_at(now(), &loc_a(), &appointments, &prefs(), 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unsorted_input_is_handled() {
        let mut appointments = busy_week();
        let sorted = find_best_slots_at(now(), &loc_a(), &appointments, &prefs(), 3).unwrap();
        appointments.reverse();
        let reversed = find_best_slots_at(now(), &loc_a(), &appointments, &prefs(), 3).unwrap();
        assert_eq!(sorted, reversed);
    }

    #[test]
    fn test_invalid_preferences_fail_fast() {
        let bad = UserPreferences {
            work_start_hour: 17,
            work_end_hour: 8,
            ..prefs()
        };
        let err = find_best_slots_at(now(), &loc_a(), &[], &bad, 7).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidPreferences(_)));
    }

    #[test]
    fn test_invalid_appointment_is_reported() {
        let broken = appointment("broken", home(), at(20, 10, 0), at(20, 9, 0));
        let err = find_best_slots_at(now(), &loc_a(), &[broken.clone()], &prefs(), 7).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::InvalidAppointment {
                id: broken.id,
                start: broken.start,
                end: broken.end,
            }
        );
    }

    #[test]
    fn test_longest_allowed_horizon_is_searched() {
        let slots = find_best_slots_at(now(), &loc_a(), &[], &prefs(), MAX_DAYS_TO_CHECK).unwrap();
        assert_eq!(slots.len(), 5);
    }

    #[test]
    fn test_oversized_horizon_is_rejected_before_generation() {
        for days in [MAX_DAYS_TO_CHECK + 1, 2_000_000, u32::MAX] {
            let err = find_best_slots_at(now(), &loc_a(), &[], &prefs(), days).unwrap_err();
            assert_eq!(
                err,
                SchedulingError::HorizonTooLong {
                    days,
                    max: MAX_DAYS_TO_CHECK,
                }
            );
        }
    }

    #[test]
    fn test_invalid_preferences_reported_before_horizon() {
        let bad = UserPreferences {
            appointment_duration_minutes: 0,
            ..prefs()
        };
        let err = find_best_slots_at(now(), &loc_a(), &[], &bad, u32::MAX).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidPreferences(_)));
    }

    #[test]
    fn test_zero_day_horizon_is_empty() {
        let slots = find_best_slots_at(now(), &loc_a(), &[], &prefs(), 0).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_default_entry_point_uses_today() {
        let before = Local::now().date_naive();
        let slots = find_best_slots(&loc_a(), &[], &prefs(), 1).unwrap();
        let after = Local::now().date_naive();

        assert_eq!(slots.len(), 5);
        let day = slots[0].start().date();
        // The call may straddle midnight
        assert!(day == before || day == after);
        assert!(slots.iter().all(|s| s.start().date() == day));
    }
}
