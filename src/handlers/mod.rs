//! NATS message handlers

pub mod ping;
pub mod slots;
pub mod tasks;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::select;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::services::booking::BookingService;
use crate::services::task_inbox::{TaskInbox, TaskSender};
use crate::types::{ErrorResponse, Request, SuccessResponse};

pub const SUBJECT_PING: &str = "serviceroute.ping";
pub const SUBJECT_SLOTS_SUGGEST: &str = "serviceroute.slots.suggest";
pub const SUBJECT_SLOTS_CONFIRM: &str = "serviceroute.slots.confirm";
pub const SUBJECT_APPOINTMENTS_LIST: &str = "serviceroute.appointments.list";
pub const SUBJECT_TASKS_RECEIVE: &str = "serviceroute.tasks.receive";
pub const SUBJECT_TASKS_POLL: &str = "serviceroute.tasks.poll";

/// Decode a request envelope and encode the reply envelope
pub(crate) async fn process_message<T, R, F, Fut>(payload: &[u8], handler: &F) -> Result<Vec<u8>>
where
    T: DeserializeOwned,
    R: Serialize,
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<R, ServiceError>>,
{
    let request: Request<T> = match serde_json::from_slice(payload) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse request: {}", e);
            let response = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
            return Ok(serde_json::to_vec(&response)?);
        }
    };

    let bytes = match handler(request.payload).await {
        Ok(payload) => serde_json::to_vec(&SuccessResponse::new(request.id, payload))?,
        Err(e) => {
            warn!("Request {} failed: {}", request.id, e);
            serde_json::to_vec(&ErrorResponse::new(request.id, e.code, e.message))?
        }
    };
    Ok(bytes)
}

/// Request/reply loop shared by every subject
pub(crate) async fn handle_requests<T, R, F, Fut>(
    client: Client,
    mut subscriber: Subscriber,
    subject: &'static str,
    handler: F,
) -> Result<()>
where
    T: DeserializeOwned,
    R: Serialize,
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<R, ServiceError>>,
{
    while let Some(msg) = subscriber.next().await {
        debug!("Received {} message", subject);

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("{} message without reply subject", subject);
                continue;
            }
        };

        let bytes = process_message(&msg.payload, &handler).await?;
        if let Err(e) = client.publish(reply, bytes.into()).await {
            error!("Failed to publish {} reply: {}", subject, e);
        }
    }

    Ok(())
}

/// Subscribe every subject and run until one handler stops
pub async fn start_handlers(
    client: Client,
    booking: BookingService,
    task_sender: TaskSender,
    task_inbox: TaskInbox,
) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let suggest_sub = client.subscribe(SUBJECT_SLOTS_SUGGEST).await?;
    let confirm_sub = client.subscribe(SUBJECT_SLOTS_CONFIRM).await?;
    let list_sub = client.subscribe(SUBJECT_APPOINTMENTS_LIST).await?;
    let receive_sub = client.subscribe(SUBJECT_TASKS_RECEIVE).await?;
    let poll_sub = client.subscribe(SUBJECT_TASKS_POLL).await?;

    let booking = Arc::new(booking);
    // The poll handler is the only consumer of the inbox
    let task_inbox = Arc::new(Mutex::new(task_inbox));

    let ping_handle = tokio::spawn(ping::handle_ping(client.clone(), ping_sub));
    let suggest_handle = tokio::spawn(slots::handle_suggest(client.clone(), suggest_sub, booking.clone()));
    let confirm_handle = tokio::spawn(slots::handle_confirm(client.clone(), confirm_sub, booking.clone()));
    let list_handle = tokio::spawn(slots::handle_list(client.clone(), list_sub, booking));
    let receive_handle = tokio::spawn(tasks::handle_receive(client.clone(), receive_sub, task_sender));
    let poll_handle = tokio::spawn(tasks::handle_poll(client, poll_sub, task_inbox));

    info!("All handlers started, waiting for messages...");

    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = suggest_handle => {
            error!("Slot suggest handler finished: {:?}", result);
        }
        result = confirm_handle => {
            error!("Slot confirm handler finished: {:?}", result);
        }
        result = list_handle => {
            error!("Appointment list handler finished: {:?}", result);
        }
        result = receive_handle => {
            error!("Task receive handler finished: {:?}", result);
        }
        result = poll_handle => {
            error!("Task poll handler finished: {:?}", result);
        }
    }

    Ok(())
}
