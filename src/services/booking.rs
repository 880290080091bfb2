//! Suggest-and-book workflow
//!
//! Glue around the slot engine: resolve the job's location, load the current
//! appointments, suggest slots, and persist the one the user confirms.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::services::geocoding::Geocoder;
use crate::services::scheduler::find_best_slots_at;
use crate::store::AppointmentStore;
use crate::types::{
    Appointment, ConfirmSlotRequest, GeoLocation, SuggestSlotsRequest, SuggestSlotsResponse,
    UserPreferences,
};

/// Client name used when the job text carries none
const FALLBACK_CLIENT_NAME: &str = "Client";

/// First word of the job text, as typed by the user
pub fn client_name_from_text(text: &str) -> String {
    text.split_whitespace()
        .next()
        .map(|word| word.trim_end_matches(',').to_string())
        .filter(|word| !word.is_empty())
        .unwrap_or_else(|| FALLBACK_CLIENT_NAME.to_string())
}

#[derive(Clone)]
pub struct BookingService {
    geocoder: Arc<dyn Geocoder>,
    store: Arc<dyn AppointmentStore>,
    preferences: UserPreferences,
    days_to_check: u32,
}

impl BookingService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        store: Arc<dyn AppointmentStore>,
        preferences: UserPreferences,
        days_to_check: u32,
    ) -> Self {
        Self {
            geocoder,
            store,
            preferences,
            days_to_check,
        }
    }

    /// Location given directly, or geocoded from free text
    pub async fn resolve_location(&self, req: &SuggestSlotsRequest) -> Result<GeoLocation, ServiceError> {
        if let Some(location) = &req.location {
            return Ok(location.clone());
        }

        let text = req
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::invalid_request("either text or location is required"))?;

        let result = self.geocoder.resolve(text).await?;
        if result.is_low_confidence() {
            warn!(
                "Low-confidence location for {:?} from {} ({:.2})",
                text,
                self.geocoder.name(),
                result.confidence
            );
        }
        Ok(result.location)
    }

    pub async fn suggest(&self, req: SuggestSlotsRequest) -> Result<SuggestSlotsResponse, ServiceError> {
        self.suggest_at(Local::now().naive_local(), req).await
    }

    pub async fn suggest_at(
        &self,
        now: NaiveDateTime,
        req: SuggestSlotsRequest,
    ) -> Result<SuggestSlotsResponse, ServiceError> {
        let location = self.resolve_location(&req).await?;
        let appointments = self.store.load().await?;
        let days_to_check = req.days_to_check.unwrap_or(self.days_to_check);

        let slots = find_best_slots_at(now, &location, &appointments, &self.preferences, days_to_check)?;

        if slots.is_empty() {
            info!("No feasible slot for {:?} within {} days", location.address, days_to_check);
        } else {
            info!(
                "Suggested {} slots for {:?}, best adds {} min",
                slots.len(),
                location.address,
                slots[0].score
            );
        }

        Ok(SuggestSlotsResponse {
            location,
            slots,
            existing_appointments: appointments.len(),
        })
    }

    /// Persist a confirmed slot unless it collides with a stored appointment
    pub async fn confirm(&self, req: ConfirmSlotRequest) -> Result<Appointment, ServiceError> {
        let mut appointment = req.into_appointment();
        appointment.validate()?;
        if appointment.client_name.trim().is_empty() {
            appointment.client_name = FALLBACK_CLIENT_NAME.to_string();
        }

        // The store re-checks overlaps under its own write lock
        self.store.add(appointment.clone()).await?;
        info!(
            "Booked {} at {} for {}",
            appointment.client_name, appointment.start, appointment.location.address
        );
        Ok(appointment)
    }

    /// All stored appointments, earliest first
    pub async fn list(&self) -> Result<Vec<Appointment>, ServiceError> {
        let mut appointments = self.store.load().await?;
        appointments.sort_by_key(|apt| apt.start);
        Ok(appointments)
    }
}
