use crate::types::GeoLocation;

pub const DEFAULT_WORK_START_HOUR: u32 = 8;
pub const DEFAULT_WORK_END_HOUR: u32 = 17;
pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: u32 = 60;

/// Calendar days searched when a request does not say otherwise
pub const DEFAULT_DAYS_TO_CHECK: u32 = 7;

/// Longest search horizon a caller may ask for
pub const MAX_DAYS_TO_CHECK: u32 = 31;

/// Candidate starts are aligned to this grid
pub const SLOT_STEP_MINUTES: u32 = 30;

/// Upper bound on suggestions returned to the caller
pub const MAX_SUGGESTIONS: usize = 5;

pub const DEFAULT_TASK_QUEUE_CAPACITY: usize = 100;

/// Kraków main square
pub fn default_home_base() -> GeoLocation {
    GeoLocation::new(50.0647, 19.9450, "Base (Kraków Main Square)")
}
