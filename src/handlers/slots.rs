//! Slot suggestion and booking handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};

use super::{handle_requests, SUBJECT_APPOINTMENTS_LIST, SUBJECT_SLOTS_CONFIRM, SUBJECT_SLOTS_SUGGEST};
use crate::services::booking::BookingService;
use crate::types::{ConfirmSlotRequest, EmptyPayload, SuggestSlotsRequest};

/// Handle slot suggestions
pub async fn handle_suggest(client: Client, subscriber: Subscriber, booking: Arc<BookingService>) -> Result<()> {
    handle_requests(client, subscriber, SUBJECT_SLOTS_SUGGEST, move |req: SuggestSlotsRequest| {
        let booking = booking.clone();
        async move { booking.suggest(req).await }
    })
    .await
}

/// Handle confirmation of a suggested slot
pub async fn handle_confirm(client: Client, subscriber: Subscriber, booking: Arc<BookingService>) -> Result<()> {
    handle_requests(client, subscriber, SUBJECT_SLOTS_CONFIRM, move |req: ConfirmSlotRequest| {
        let booking = booking.clone();
        async move { booking.confirm(req).await }
    })
    .await
}

/// Handle listing of stored appointments
pub async fn handle_list(client: Client, subscriber: Subscriber, booking: Arc<BookingService>) -> Result<()> {
    handle_requests(client, subscriber, SUBJECT_APPOINTMENTS_LIST, move |_: EmptyPayload| {
        let booking = booking.clone();
        async move { booking.list().await }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::super::process_message;
    use super::*;
    use crate::services::geocoding::DistrictGeocoder;
    use crate::store::InMemoryAppointmentStore;
    use crate::types::{Request, UserPreferences};
    use serde_json::{json, Value};

    fn booking() -> Arc<BookingService> {
        Arc::new(BookingService::new(
            Arc::new(DistrictGeocoder::new()),
            Arc::new(InMemoryAppointmentStore::new()),
            UserPreferences::default(),
            7,
        ))
    }

    #[tokio::test]
    async fn suggest_message_returns_ranked_slots() {
        let booking = booking();
        let handler = move |req: SuggestSlotsRequest| {
            let booking = booking.clone();
            async move { booking.suggest(req).await }
        };
        let request = Request::new(json!({ "text": "Bronowice, boiler", "daysToCheck": 2 }));

        let bytes = process_message(&serde_json::to_vec(&request).unwrap(), &handler).await.unwrap();
        let reply: Value = serde_json::from_slice(&bytes).unwrap();

        let slots = reply["payload"]["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 5);
        assert_eq!(reply["payload"]["location"]["lat"], 50.0863);
    }

    #[tokio::test]
    async fn suggest_message_with_huge_horizon_is_rejected() {
        let booking = booking();
        let handler = move |req: SuggestSlotsRequest| {
            let booking = booking.clone();
            async move { booking.suggest(req).await }
        };
        let request = Request::new(json!({ "text": "Olsza", "daysToCheck": 4_000_000_000u32 }));

        let bytes = process_message(&serde_json::to_vec(&request).unwrap(), &handler).await.unwrap();
        let reply: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(reply["id"], request.id.to_string());
        assert_eq!(reply["error"]["code"], "INVALID_REQUEST");
        assert!(reply.get("payload").is_none());
    }

    #[tokio::test]
    async fn confirm_message_with_bad_interval_is_rejected() {
        let booking = booking();
        let handler = move |req: ConfirmSlotRequest| {
            let booking = booking.clone();
            async move { booking.confirm(req).await }
        };
        let request = Request::new(json!({
            "clientName": "Jan",
            "location": { "lat": 50.0811, "lng": 19.9606, "address": "Olsza" },
            "start": "2026-03-02T10:00:00",
            "end": "2026-03-02T09:00:00"
        }));

        let bytes = process_message(&serde_json::to_vec(&request).unwrap(), &handler).await.unwrap();
        let reply: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(reply["error"]["code"], "INVALID_APPOINTMENT");
    }
}
