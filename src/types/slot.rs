//! Candidate and scored slot types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A fixed-duration candidate window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSlot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A feasible candidate together with its marginal travel cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSlot {
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Added travel minutes; lower is better and may be negative
    pub score: i64,
    /// Minutes from the previous anchor to the client
    pub travel_to_client: i64,
    /// Minutes from the client to the next anchor
    pub travel_from_client: i64,
    pub reason: String,
}

impl ScoredSlot {
    pub fn start(&self) -> NaiveDateTime {
        self.slot.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.slot.end
    }
}

/// Request to suggest slots for a new job.
/// Either free text (geocoded by the worker) or an already resolved location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSlotsRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<crate::types::GeoLocation>,
    /// Horizon in calendar days, starting today
    #[serde(default)]
    pub days_to_check: Option<u32>,
}

/// Response of a slot suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSlotsResponse {
    pub location: crate::types::GeoLocation,
    pub slots: Vec<ScoredSlot>,
    /// Number of appointments considered
    pub existing_appointments: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_scored_slot_flattens_interval() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let scored = ScoredSlot {
            slot: TimeSlot::new(
                day.and_hms_opt(8, 0, 0).unwrap(),
                day.and_hms_opt(9, 0, 0).unwrap(),
            ),
            score: 12,
            travel_to_client: 9,
            travel_from_client: 8,
            reason: "Fits between start and end".to_string(),
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["start"], "2026-03-02T08:00:00");
        assert_eq!(json["end"], "2026-03-02T09:00:00");
        assert_eq!(json["travelToClient"], 9);
        assert_eq!(scored.slot.duration_minutes(), 60);
    }
}
