//! Per-node work queue and scheduled request (action-call) worker.
//!
//! Built on top of `node-runtime`'s multi-provider queue client abstraction
//! (Azure Service Bus / AWS SQS / in-memory), the same client the teacher
//! used for per-bot delivery, repurposed here with the node id as the
//! session key so per-node ordering falls out of session support instead of
//! a bespoke queue. The single-active-execution constraint per node is
//! enforced by an in-process guard map, in the spirit of the teacher's
//! `Arc<RwLock<InternalState>>` circuit breaker state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use node_runtime::{Message, QueueClient, QueueError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::node_router::Event;
use crate::ErrorCategory;

/// Identifier for a node instance within a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A due scheduled action call, created via `ScheduleActionCall`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub node_id: NodeId,
    pub execution_id: Uuid,
    pub action: String,
    pub params: JsonValue,
    pub run_at: DateTime<Utc>,
    pub user_accessible: bool,
}

impl Request {
    pub fn new(
        node_id: NodeId,
        execution_id: Uuid,
        action: impl Into<String>,
        params: JsonValue,
        run_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            execution_id,
            action: action.into(),
            params,
            run_at,
            user_accessible: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum NodeQueueError {
    #[error("queue client error: {0}")]
    Queue(#[from] QueueError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("execution already finished; request dropped")]
    ExecutionFinished,
}

impl NodeQueueError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Queue(e) => e.is_transient(),
            Self::Serialization(_) => false,
            Self::ExecutionFinished => false,
        }
    }

    pub fn error_category(&self) -> ErrorCategory {
        if self.is_transient() {
            ErrorCategory::Transient
        } else {
            ErrorCategory::Permanent
        }
    }
}

/// Per-node single-flight guard: ensures exactly one Execution advances at a
/// time for a given node, regardless of how many workers are polling.
#[derive(Default)]
pub struct NodeExecutionGuard {
    locks: RwLock<HashMap<NodeId, Arc<AsyncMutex<()>>>>,
}

impl NodeExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, node_id: NodeId) -> Arc<AsyncMutex<()>> {
        if let Some(lock) = self.locks.read().unwrap().get(&node_id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().unwrap();
        locks
            .entry(node_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Run `work` with exclusive access to `node_id`'s execution slot.
    pub async fn with_exclusive<F, Fut, T>(&self, node_id: NodeId, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let lock = self.lock_for(node_id);
        let _guard = lock.lock().await;
        work().await
    }
}

/// Translates the node id into a `node-runtime` queue/session pair and
/// delivers the event, giving per-node FIFO ordering via session support.
pub struct NodeQueueWorker<C> {
    client: C,
    queue_name: node_runtime::QueueName,
}

impl<C: QueueClient> NodeQueueWorker<C> {
    pub fn new(client: C, queue_name: node_runtime::QueueName) -> Self {
        Self { client, queue_name }
    }

    pub async fn enqueue(&self, node_id: NodeId, event: Event) -> Result<(), NodeQueueError> {
        let body = serde_json::to_vec(&EventEnvelopeForQueue::from(&event))
            .map_err(|e| NodeQueueError::Serialization(e.to_string()))?;

        let session_id = node_runtime::SessionId::new(node_id.to_string())
            .map_err(|e| NodeQueueError::Serialization(e.to_string()))?;

        let message = Message::new(body.into())
            .with_session_id(session_id)
            .with_attribute("node_id".to_string(), node_id.to_string())
            .with_attribute("channel".to_string(), event.channel.clone());

        self.client.send_message(&self.queue_name, message).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: QueueClient + Send + Sync> crate::node_router::NodeEnqueue for NodeQueueWorker<C> {
    async fn enqueue(&self, node_id: &NodeId, event: Event) -> Result<(), String> {
        NodeQueueWorker::enqueue(self, *node_id, event)
            .await
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EventEnvelopeForQueue {
    id: Uuid,
    channel: String,
    event_type: String,
    data: JsonValue,
}

impl From<&Event> for EventEnvelopeForQueue {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            channel: event.channel.clone(),
            event_type: event.event_type.clone(),
            data: event.data.clone(),
        }
    }
}

/// Polls due [`Request`]s and hands them to the node executor's
/// `HandleAction` path. The source of due requests is left abstract so the
/// persistence backend (SQL row claim, in-memory heap, ...) stays pluggable.
#[async_trait]
pub trait RequestSource: Send + Sync {
    async fn next_due(&self) -> Option<Request>;

    /// Whether the execution a dequeued `Request` targets has already
    /// reached a terminal state. `poll_once` drops the request rather than
    /// invoking its handler when this returns `true`.
    async fn is_execution_finished(&self, execution_id: Uuid) -> bool;
}

pub struct RequestWorker<S> {
    source: S,
    guard: Arc<NodeExecutionGuard>,
}

impl<S: RequestSource> RequestWorker<S> {
    pub fn new(source: S, guard: Arc<NodeExecutionGuard>) -> Self {
        Self { source, guard }
    }

    /// Pop the next due request and run `handle` for it under the node's
    /// single-flight guard. Returns `Ok(None)` when no request was due.
    pub async fn poll_once<F, Fut>(
        &self,
        handle: F,
    ) -> Result<Option<Request>, NodeQueueError>
    where
        F: FnOnce(Request) -> Fut,
        Fut: std::future::Future<Output = Result<(), NodeQueueError>>,
    {
        let Some(request) = self.source.next_due().await else {
            return Ok(None);
        };

        if self.source.is_execution_finished(request.execution_id).await {
            return Err(NodeQueueError::ExecutionFinished);
        }

        let node_id = request.node_id;
        let request_for_handler = request.clone();
        self.guard
            .with_exclusive(node_id, move || handle(request_for_handler))
            .await?;

        Ok(Some(request))
    }
}

#[cfg(test)]
#[path = "node_queue_tests.rs"]
mod tests;
