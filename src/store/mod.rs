//! Appointment persistence
//!
//! The slot engine only reads appointments; durability is entirely the
//! store's concern. `save` replaces the whole collection.

mod json_file;
mod postgres;

pub use json_file::JsonFileAppointmentStore;
pub use postgres::PgAppointmentStore;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::config::Config;
use crate::error::StoreError;
use crate::types::{Appointment, TimeSlot};

/// Appointment store abstraction (Postgres, JSON file, in-memory)
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Appointment>, StoreError>;

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError>;

    /// Append one appointment unless it overlaps a stored one.
    ///
    /// Implementations hold their write lock across the check and the append.
    async fn add(&self, appointment: Appointment) -> Result<(), StoreError>;

    /// Get store name for logging
    fn name(&self) -> &'static str;
}

/// Process-local store for tests and development
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: Mutex::new(appointments),
        }
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn load(&self) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.appointments.lock().clone())
    }

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        *self.appointments.lock() = appointments.to_vec();
        Ok(())
    }

    async fn add(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut appointments = self.appointments.lock();
        ensure_free(&appointments, &appointment)?;
        appointments.push(appointment);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// `SlotTaken` when `appointment` overlaps any of `existing`
pub(crate) fn ensure_free(existing: &[Appointment], appointment: &Appointment) -> Result<(), StoreError> {
    let slot = TimeSlot::new(appointment.start, appointment.end);
    match existing.iter().find(|apt| apt.overlaps(&slot)) {
        Some(taken) => Err(StoreError::SlotTaken {
            start: appointment.start,
            end: appointment.end,
            client_name: taken.client_name.clone(),
        }),
        None => Ok(()),
    }
}

/// Postgres (migrated on connect) when `DATABASE_URL` is set, otherwise the JSON file
pub async fn create_store(config: &Config) -> anyhow::Result<Box<dyn AppointmentStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgAppointmentStore::connect(url).await?;
            info!("Connected to PostgreSQL appointment store");
            store.run_migrations().await?;
            Ok(Box::new(store))
        }
        None => {
            info!("Using JSON appointment file {}", config.appointments_file.display());
            Ok(Box::new(JsonFileAppointmentStore::new(&config.appointments_file)))
        }
    }
}
