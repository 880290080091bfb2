//! Domain error types
//!
//! Handlers keep using `anyhow` for plumbing; these enums cover the failures a
//! caller is expected to react to, and each maps to a stable NATS error code.

use thiserror::Error;
use uuid::Uuid;

/// Failures raised by the slot engine before any candidate is generated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    #[error("invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error("daysToCheck {days} exceeds the maximum of {max}")]
    HorizonTooLong { days: u32, max: u32 },

    #[error("invalid appointment {id}: start {start} is not before end {end}")]
    InvalidAppointment {
        id: Uuid,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },
}

impl SchedulingError {
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::InvalidPreferences(_) => "INVALID_PREFERENCES",
            SchedulingError::HorizonTooLong { .. } => "INVALID_REQUEST",
            SchedulingError::InvalidAppointment { .. } => "INVALID_APPOINTMENT",
        }
    }
}

/// Failures of the geocoding collaborator
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("location could not be resolved: {0}")]
    LocationUnresolved(String),

    #[error("geocoding service temporarily unavailable (circuit breaker open)")]
    Unavailable,

    #[error("geocoding request failed: {0}")]
    Backend(#[from] anyhow::Error),
}

impl GeocodeError {
    pub fn code(&self) -> &'static str {
        match self {
            GeocodeError::LocationUnresolved(_) => "LOCATION_UNRESOLVED",
            GeocodeError::Unavailable => "GEOCODER_UNAVAILABLE",
            GeocodeError::Backend(_) => "GEOCODER_ERROR",
        }
    }
}

/// Failures of the inbound task channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task text must not be empty")]
    EmptyText,

    #[error("task queue is full (capacity {0})")]
    QueueFull(usize),

    #[error("task queue is closed")]
    Closed,
}

impl TaskError {
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::EmptyText => "INVALID_REQUEST",
            TaskError::QueueFull(_) => "QUEUE_FULL",
            TaskError::Closed => "QUEUE_CLOSED",
        }
    }
}

/// Failures of appointment persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("appointment store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("appointment store contains malformed data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{start} - {end} overlaps the appointment with {client_name}")]
    SlotTaken {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
        client_name: String,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::SlotTaken { .. } => "SLOT_TAKEN",
            _ => "STORE_ERROR",
        }
    }
}

/// Failure surfaced to a NATS or CLI caller as a stable code plus message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("INVALID_REQUEST", message)
    }
}

impl From<SchedulingError> for ServiceError {
    fn from(e: SchedulingError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}

impl From<GeocodeError> for ServiceError {
    fn from(e: GeocodeError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}

impl From<TaskError> for ServiceError {
    fn from(e: TaskError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}
