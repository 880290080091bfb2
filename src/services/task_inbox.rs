//! Inbound task channel
//!
//! Free-text jobs arrive from an external shortcut/webhook and wait here until
//! the client polls for them. The queue is a bounded `mpsc` channel: producers
//! hold a cloneable [`TaskSender`], the single consumer owns the [`TaskInbox`]
//! and drains it on every poll.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::error::TaskError;
use crate::types::InboundTask;

/// Producer side of the inbox
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: mpsc::Sender<InboundTask>,
    capacity: usize,
}

/// Consumer side of the inbox
#[derive(Debug)]
pub struct TaskInbox {
    rx: mpsc::Receiver<InboundTask>,
}

/// Create a bounded inbox holding at most `capacity` pending tasks
pub fn channel(capacity: usize) -> (TaskSender, TaskInbox) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (TaskSender { tx, capacity }, TaskInbox { rx })
}

impl TaskSender {
    /// Enqueue a task without waiting; a full queue is reported, not awaited
    pub fn submit(&self, raw_text: &str) -> Result<InboundTask, TaskError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }

        let task = InboundTask::new(text);
        match self.tx.try_send(task.clone()) {
            Ok(()) => {
                debug!("Queued inbound task {}", task.id);
                Ok(task)
            }
            Err(TrySendError::Full(_)) => {
                warn!("Inbound task queue full ({} pending)", self.capacity);
                Err(TaskError::QueueFull(self.capacity))
            }
            Err(TrySendError::Closed(_)) => Err(TaskError::Closed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl TaskInbox {
    /// Take every pending task in arrival order without blocking
    pub fn drain(&mut self) -> Vec<InboundTask> {
        let mut tasks = Vec::new();
        while let Ok(task) = self.rx.try_recv() {
            tasks.push(task);
        }
        tasks
    }
}
