//! Inbound task handlers
//!
//! `tasks.receive` is the webhook entry point (e.g. an iOS shortcut posting
//! free text); `tasks.poll` drains whatever arrived since the last poll.

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use tokio::sync::Mutex;
use tracing::info;

use super::{handle_requests, SUBJECT_TASKS_POLL, SUBJECT_TASKS_RECEIVE};
use crate::error::ServiceError;
use crate::services::task_inbox::{TaskInbox, TaskSender};
use crate::types::{EmptyPayload, PollTasksResponse, ReceiveTaskRequest, ReceiveTaskResponse};

pub fn receive(sender: &TaskSender, req: ReceiveTaskRequest) -> Result<ReceiveTaskResponse, ServiceError> {
    let text = req
        .text
        .ok_or_else(|| ServiceError::invalid_request("text field required"))?;
    let task = sender.submit(&text)?;
    info!("Received new task {}: {:?}", task.id, task.raw_text);

    Ok(ReceiveTaskResponse {
        success: true,
        task_id: task.id,
    })
}

pub async fn poll(inbox: &Mutex<TaskInbox>) -> PollTasksResponse {
    PollTasksResponse {
        tasks: inbox.lock().await.drain(),
    }
}

/// Handle incoming webhook tasks
pub async fn handle_receive(client: Client, subscriber: Subscriber, sender: TaskSender) -> Result<()> {
    handle_requests(client, subscriber, SUBJECT_TASKS_RECEIVE, move |req: ReceiveTaskRequest| {
        let result = receive(&sender, req);
        async move { result }
    })
    .await
}

/// Handle polling of pending tasks
pub async fn handle_poll(client: Client, subscriber: Subscriber, inbox: Arc<Mutex<TaskInbox>>) -> Result<()> {
    handle_requests(client, subscriber, SUBJECT_TASKS_POLL, move |_: EmptyPayload| {
        let inbox = inbox.clone();
        async move { Ok::<_, ServiceError>(poll(&inbox).await) }
    })
    .await
}
