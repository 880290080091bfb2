//! Working-hour preferences

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::SchedulingError;
use crate::types::GeoLocation;

/// Technician working-hour preferences and home base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// First hour of the working day (0-23)
    pub work_start_hour: u32,
    /// Hour at which the working day ends (0-23)
    pub work_end_hour: u32,
    pub appointment_duration_minutes: u32,
    /// Anchor used when a day has no appointment before or after a slot
    pub home_base: GeoLocation,
}

impl UserPreferences {
    /// Fail fast on preferences the slot generator cannot work with
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.work_end_hour > 23 {
            return Err(SchedulingError::InvalidPreferences(format!(
                "workEndHour must be within 0-23 (got {})",
                self.work_end_hour
            )));
        }
        if self.work_start_hour >= self.work_end_hour {
            return Err(SchedulingError::InvalidPreferences(format!(
                "workStartHour ({}) must be before workEndHour ({})",
                self.work_start_hour, self.work_end_hour
            )));
        }
        if self.appointment_duration_minutes == 0 {
            return Err(SchedulingError::InvalidPreferences(
                "appointmentDurationMinutes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            work_start_hour: defaults::DEFAULT_WORK_START_HOUR,
            work_end_hour: defaults::DEFAULT_WORK_END_HOUR,
            appointment_duration_minutes: defaults::DEFAULT_APPOINTMENT_DURATION_MINUTES,
            home_base: defaults::default_home_base(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences_are_valid() {
        let prefs = UserPreferences::default();
        assert!(prefs.validate().is_ok());
        assert_eq!(prefs.work_start_hour, 8);
        assert_eq!(prefs.work_end_hour, 17);
        assert_eq!(prefs.appointment_duration_minutes, 60);
    }

    #[test]
    fn test_start_after_end_is_invalid() {
        let prefs = UserPreferences {
            work_start_hour: 17,
            work_end_hour: 8,
            ..Default::default()
        };
        assert!(matches!(prefs.validate(), Err(SchedulingError::InvalidPreferences(_))));
    }

    #[test]
    fn test_equal_hours_are_invalid() {
        let prefs = UserPreferences {
            work_start_hour: 9,
            work_end_hour: 9,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let prefs = UserPreferences {
            appointment_duration_minutes: 0,
            ..Default::default()
        };
        let err = prefs.validate().unwrap_err();
        assert!(err.to_string().contains("appointmentDurationMinutes"));
    }

    #[test]
    fn test_end_hour_out_of_range_is_invalid() {
        let prefs = UserPreferences {
            work_start_hour: 8,
            work_end_hour: 24,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }
}
