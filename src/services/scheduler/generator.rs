//! Candidate window enumeration

use chrono::{Days, Duration, NaiveDate, NaiveTime};

use crate::types::{TimeSlot, UserPreferences};

/// Candidate windows for one calendar day
#[derive(Debug, Clone)]
pub struct DayCandidates {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

/// Every fixed-duration window on `date` whose start lies on the `step_minutes`
/// grid from `workStartHour:00` and whose end is no later than `workEndHour:00`.
pub fn generate_day_slots(date: NaiveDate, prefs: &UserPreferences, step_minutes: u32) -> Vec<TimeSlot> {
    let (Some(open), Some(close)) = (
        NaiveTime::from_hms_opt(prefs.work_start_hour, 0, 0),
        NaiveTime::from_hms_opt(prefs.work_end_hour, 0, 0),
    ) else {
        return vec![];
    };
    if step_minutes == 0 {
        return vec![];
    }

    let day_start = date.and_time(open);
    let day_end = date.and_time(close);
    let duration = Duration::minutes(i64::from(prefs.appointment_duration_minutes));
    let step = Duration::minutes(i64::from(step_minutes));

    let mut slots = Vec::new();
    let mut start = day_start;
    while start + duration <= day_end {
        slots.push(TimeSlot::new(start, start + duration));
        start += step;
    }
    slots
}

/// Candidates for `days_to_check` consecutive calendar days starting at `today`.
///
/// Days are produced lazily so only one day's windows are alive at a time.
pub fn generate_slots<'a>(
    today: NaiveDate,
    days_to_check: u32,
    prefs: &'a UserPreferences,
    step_minutes: u32,
) -> impl Iterator<Item = DayCandidates> + 'a {
    (0..days_to_check)
        .map_while(move |offset| today.checked_add_days(Days::new(u64::from(offset))))
        .map(move |date| DayCandidates {
            date,
            slots: generate_day_slots(date, prefs, step_minutes),
        })
}
