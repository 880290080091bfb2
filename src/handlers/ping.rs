//! Ping handler for health checks

use anyhow::Result;
use async_nats::{Client, Subscriber};
use serde::{Deserialize, Serialize};

use super::{handle_requests, SUBJECT_PING};
use crate::error::ServiceError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PingRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PongResponse {
    pub message: String,
    pub timestamp: String,
}

pub fn pong(request: PingRequest) -> PongResponse {
    PongResponse {
        message: request
            .message
            .map(|m| format!("Pong: {}", m))
            .unwrap_or_else(|| "Pong".to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handle ping messages
pub async fn handle_ping(client: Client, subscriber: Subscriber) -> Result<()> {
    handle_requests(client, subscriber, SUBJECT_PING, |req: PingRequest| async move {
        Ok::<_, ServiceError>(pong(req))
    })
    .await
}
