//! Node execution state machine.
//!
//! Drives a node through `created → Setup → pending → Execute/HandleAction →
//! {finished | waitingAction | failed} → Cleanup`, enforcing the
//! exactly-one-emit-per-execution invariant. The node's capability set is
//! modeled as a trait with default no-op methods (a sum type + dispatch
//! table, per the system-level design note) rather than a class hierarchy,
//! so a node only overrides the capabilities it actually has.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::config_schema::Configuration;
use crate::node_queue::{NodeId, Request};
use crate::ErrorCategory;

/// Opaque identifier for one activation of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named outlet a node may emit on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChannel {
    pub name: String,
    pub label: String,
}

impl OutputChannel {
    pub const DEFAULT: &'static str = "default";

    pub fn default_channel() -> Self {
        Self {
            name: Self::DEFAULT.to_string(),
            label: "Default".to_string(),
        }
    }
}

/// Terminal/non-terminal state of an [`ExecutionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExecutionState {
    Pending,
    Running,
    WaitingAction,
    Finished,
    Cancelled,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled | Self::Failed)
    }
}

/// Persisted record of one execution.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub node_id: NodeId,
    pub state: ExecutionState,
    pub emitted_channel: Option<String>,
    pub payloads: Vec<JsonValue>,
    pub failure_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            id: ExecutionId::new(),
            node_id,
            state: ExecutionState::Pending,
            emitted_channel: None,
            payloads: Vec::new(),
            failure_reason: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("execution already emitted on channel '{channel}'; a second emit is not allowed")]
    AlreadyEmitted { channel: String },

    #[error("node execution failed: {reason}")]
    NodeFailed { reason: String },

    #[error("cannot act on a terminal execution")]
    AlreadyTerminal,
}

impl ExecutorError {
    pub fn is_transient(&self) -> bool {
        false
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::NodeFailed { .. } => ErrorCategory::Transient,
            _ => ErrorCategory::Permanent,
        }
    }
}

/// Shared state accessor handed to every node-facing context: records the
/// execution's terminal emit and exposes it to the router.
pub struct ExecutionStateHandle {
    record: Mutex<ExecutionRecord>,
}

impl ExecutionStateHandle {
    pub fn new(record: ExecutionRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    pub fn snapshot(&self) -> ExecutionRecord {
        self.record.lock().unwrap().clone()
    }

    /// Mark the execution finished on `channel` with `payloads`. Exactly one
    /// emit is allowed per execution.
    pub fn emit(&self, channel: impl Into<String>, payloads: Vec<JsonValue>) -> Result<(), ExecutorError> {
        let mut record = self.record.lock().unwrap();
        if let Some(existing) = &record.emitted_channel {
            return Err(ExecutorError::AlreadyEmitted {
                channel: existing.clone(),
            });
        }
        record.emitted_channel = Some(channel.into());
        record.payloads = payloads;
        record.state = ExecutionState::Finished;
        record.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_waiting(&self) {
        let mut record = self.record.lock().unwrap();
        if !record.state.is_terminal() {
            record.state = ExecutionState::WaitingAction;
        }
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        let mut record = self.record.lock().unwrap();
        record.state = ExecutionState::Failed;
        record.failure_reason = Some(reason.into());
        record.finished_at = Some(Utc::now());
    }

    pub fn mark_cancelled(&self) {
        let mut record = self.record.lock().unwrap();
        record.state = ExecutionState::Cancelled;
        record.finished_at = Some(Utc::now());
    }
}

/// Opaque per-node/per-execution key-value store, available across Setup,
/// Execute, HandleAction, and Cancel for the same execution.
#[derive(Default)]
pub struct Metadata {
    values: Mutex<BTreeMap<String, JsonValue>>,
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<JsonValue> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: JsonValue) {
        self.values.lock().unwrap().insert(key.into(), value);
    }
}

/// Context passed to `Setup`: configuration and a place to register
/// subscriptions/webhooks ahead of the node's first execution.
pub struct SetupContext<'a> {
    pub configuration: &'a Configuration,
    pub metadata: &'a Metadata,
}

/// Context passed to `Execute`/`HandleAction`.
pub struct ExecutionContext<'a> {
    pub configuration: &'a Configuration,
    pub metadata: &'a Metadata,
    pub state: &'a ExecutionStateHandle,
    pub requests: &'a dyn RequestScheduler,
}

/// Context passed to `HandleAction` specifically, carrying the action's parameters.
pub struct ActionContext<'a> {
    pub base: ExecutionContext<'a>,
    pub action: &'a str,
    pub params: &'a JsonValue,
}

/// Schedules a future self-call (`ScheduleActionCall`), the mechanism behind
/// the `poll` pattern and user-invocable actions.
pub trait RequestScheduler: Send + Sync {
    fn schedule_action_call(
        &self,
        action: &str,
        params: JsonValue,
        after: chrono::Duration,
    ) -> Request;
}

/// Capability set a node implements. Every method has a default so nodes
/// only override what they need — a Trigger typically has no `Execute`, a
/// stateless Component typically has no `HandleAction`/`Cancel`.
#[async_trait]
pub trait NodeBehavior: Send + Sync {
    fn output_channels(&self) -> Vec<OutputChannel> {
        vec![OutputChannel::default_channel()]
    }

    async fn setup(&self, _ctx: SetupContext<'_>) -> Result<(), ExecutorError> {
        Ok(())
    }

    async fn execute(&self, _ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        Ok(())
    }

    async fn handle_action(&self, _ctx: ActionContext<'_>) -> Result<(), ExecutorError> {
        Ok(())
    }

    async fn cancel(&self, _ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        Ok(())
    }

    async fn cleanup(&self, _ctx: SetupContext<'_>) -> Result<(), ExecutorError> {
        Ok(())
    }
}

/// Drives one execution through the node's lifecycle.
pub struct Executor<N> {
    node: N,
}

impl<N: NodeBehavior> Executor<N> {
    pub fn new(node: N) -> Self {
        Self { node }
    }

    pub async fn run_setup(&self, ctx: SetupContext<'_>) -> Result<(), ExecutorError> {
        self.node.setup(ctx).await
    }

    /// Advance a pending execution via `Execute`. On node error the
    /// execution transitions to `Failed`; on success without an emit the
    /// execution is left `WaitingAction` (the node scheduled a poll).
    pub async fn run_execute(&self, ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        match self.node.execute(ctx).await {
            Ok(()) => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub async fn run_handle_action(&self, ctx: ActionContext<'_>) -> Result<(), ExecutorError> {
        self.node.handle_action(ctx).await
    }

    pub async fn run_cancel(&self, ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        ctx.state.mark_cancelled();
        self.node.cancel(ctx).await
    }

    pub async fn run_cleanup(&self, ctx: SetupContext<'_>) -> Result<(), ExecutorError> {
        self.node.cleanup(ctx).await
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
