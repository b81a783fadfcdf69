//! Canvas-topology event routing.
//!
//! Generalizes [`crate::queue_integration::DefaultEventRouter`] (which fanned
//! a normalized webhook event out to bot queues via `BotConfiguration`) into
//! routing an [`Event`] emitted by one node to its downstream nodes per
//! canvas topology. Per-source ordering (FIFO) and at-least-once delivery
//! with poison-event parking follow the same shape as the queue-keeper
//! implementation; the routing table just comes from graph edges instead of
//! static subscriptions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::node_queue::NodeId;
use crate::ErrorCategory;

/// An event emitted by a node on one of its output channels.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub source_node_id: NodeId,
    pub channel: String,
    pub event_type: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        source_node_id: NodeId,
        channel: impl Into<String>,
        event_type: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_node_id,
            channel: channel.into(),
            event_type: event_type.into(),
            data,
            created_at: Utc::now(),
        }
    }
}

/// A single downstream fan-out target: a node and the connection it arrived over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub node_id: NodeId,
}

/// Resolves an event's downstream nodes from canvas connections.
///
/// Implementations are expected to be backed by the persisted canvas graph;
/// this trait exists so the router itself stays free of storage concerns.
pub trait CanvasTopology: Send + Sync {
    /// Nodes connected to `source_node_id`'s `channel` output, in declaration order.
    fn downstream_of(&self, source_node_id: &NodeId, channel: &str) -> Vec<RouteTarget>;
}

/// Result of routing one event: which downstream nodes it was queued for,
/// and which failed (with transience classification for retry decisions).
#[derive(Debug, Clone, Default)]
pub struct RouteResult {
    pub queued: Vec<NodeId>,
    pub failed: Vec<FailedRoute>,
}

impl RouteResult {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_complete_failure(&self) -> bool {
        self.queued.is_empty() && !self.failed.is_empty()
    }

    pub fn is_no_op(&self) -> bool {
        self.queued.is_empty() && self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FailedRoute {
    pub node_id: NodeId,
    pub error: String,
    pub is_transient: bool,
}

/// Errors surfaced by routing, classified the way `QueueDeliveryError` is.
#[derive(Debug, Error)]
pub enum NodeRouterError {
    #[error("failed to deliver to all {total} downstream nodes ({failed} failed)")]
    PartialDelivery { total: usize, failed: usize },

    #[error("failed to deliver to any of {0} downstream nodes")]
    CompleteFailure(usize),

    #[error("event {event_id} exceeded its retry budget and was parked")]
    Poisoned { event_id: Uuid },
}

impl NodeRouterError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PartialDelivery { .. })
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::PartialDelivery { .. } => ErrorCategory::Transient,
            Self::CompleteFailure(_) => ErrorCategory::Transient,
            Self::Poisoned { .. } => ErrorCategory::Permanent,
        }
    }
}

/// A sink an event is parked in once it exceeds its retry budget.
///
/// Kept minimal and storage-agnostic; `fabric-api::dlq_storage` provides the
/// persisted implementation used by the service binary.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn park(&self, event: &Event, reason: &str, attempts: u32);
}

/// Enqueues one event to one downstream node. Implemented by the node queue
/// (§C4); kept as a trait here so the router has no direct dependency on the
/// queue's transport.
#[async_trait]
pub trait NodeEnqueue: Send + Sync {
    async fn enqueue(&self, node_id: &NodeId, event: Event) -> Result<(), String>;
}

#[async_trait]
pub trait NodeRouter: Send + Sync {
    async fn route_event(&self, event: Event) -> Result<RouteResult, NodeRouterError>;
}

/// Default router: resolves downstream targets from canvas topology and
/// enqueues the event to each, in the order connections were declared.
pub struct DefaultNodeRouter<T, Q, D> {
    topology: T,
    enqueue: Q,
    dead_letter: D,
    max_attempts: u32,
}

impl<T, Q, D> DefaultNodeRouter<T, Q, D>
where
    T: CanvasTopology,
    Q: NodeEnqueue,
    D: DeadLetterSink,
{
    pub fn new(topology: T, enqueue: Q, dead_letter: D, max_attempts: u32) -> Self {
        Self {
            topology,
            enqueue,
            dead_letter,
            max_attempts,
        }
    }
}

#[async_trait]
impl<T, Q, D> NodeRouter for DefaultNodeRouter<T, Q, D>
where
    T: CanvasTopology,
    Q: NodeEnqueue,
    D: DeadLetterSink,
{
    async fn route_event(&self, event: Event) -> Result<RouteResult, NodeRouterError> {
        let targets = self.topology.downstream_of(&event.source_node_id, &event.channel);

        let mut result = RouteResult::default();
        if targets.is_empty() {
            return Ok(result);
        }

        for target in targets {
            match self.enqueue.enqueue(&target.node_id, event.clone()).await {
                Ok(()) => result.queued.push(target.node_id),
                Err(error) => result.failed.push(FailedRoute {
                    node_id: target.node_id,
                    error,
                    is_transient: true,
                }),
            }
        }

        if result.is_complete_success() || result.is_no_op() {
            Ok(result)
        } else if result.is_complete_failure() {
            if self.max_attempts <= 1 {
                self.dead_letter
                    .park(&event, "exhausted retry budget", self.max_attempts)
                    .await;
                return Err(NodeRouterError::Poisoned { event_id: event.id });
            }
            Err(NodeRouterError::CompleteFailure(result.failed.len()))
        } else {
            Err(NodeRouterError::PartialDelivery {
                total: result.queued.len() + result.failed.len(),
                failed: result.failed.len(),
            })
        }
    }
}

#[cfg(test)]
#[path = "node_router_tests.rs"]
mod tests;
