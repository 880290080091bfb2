//! Appointment and location types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SchedulingError;
use crate::types::TimeSlot;

/// A geocoded point. `address` is display-only and never used for computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            address: address.into(),
        }
    }
}

/// A committed appointment, owned by the appointment store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub client_name: String,
    pub location: GeoLocation,
    /// Local wall-clock start
    pub start: NaiveDateTime,
    /// Local wall-clock end
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    /// Ensure `start < end`
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.start >= self.end {
            return Err(SchedulingError::InvalidAppointment {
                id: self.id,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Closed-open overlap: touching at a single instant is not a collision
    pub fn overlaps(&self, slot: &TimeSlot) -> bool {
        self.start < slot.end && slot.start < self.end
    }
}

/// Request to book a new appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSlotRequest {
    pub client_name: String,
    pub location: GeoLocation,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ConfirmSlotRequest {
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            client_name: self.client_name,
            location: self.location,
            start: self.start,
            end: self.end,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn appointment(start: NaiveDateTime, end: NaiveDateTime) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            client_name: "Jan Kowalski".to_string(),
            location: GeoLocation::new(50.0647, 19.9450, "Kraków Rynek"),
            start,
            end,
            notes: None,
        }
    }

    #[test]
    fn test_validate_rejects_empty_interval() {
        let apt = appointment(at(9, 0), at(9, 0));
        let err = apt.validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_APPOINTMENT");
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let apt = appointment(at(9, 0), at(10, 0));

        assert!(!apt.overlaps(&TimeSlot::new(at(8, 0), at(9, 0))));
        assert!(!apt.overlaps(&TimeSlot::new(at(10, 0), at(11, 0))));
        assert!(apt.overlaps(&TimeSlot::new(at(9, 30), at(10, 30))));
        assert!(apt.overlaps(&TimeSlot::new(at(8, 0), at(12, 0))));
    }

    #[test]
    fn test_appointment_serializes_camel_case() {
        let apt = appointment(at(9, 0), at(10, 0));
        let json = serde_json::to_value(&apt).unwrap();

        assert_eq!(json["clientName"], "Jan Kowalski");
        assert_eq!(json["start"], "2026-03-02T09:00:00");
        assert!(json.get("notes").is_none());
    }
}
