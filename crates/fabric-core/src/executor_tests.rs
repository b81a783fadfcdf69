use super::*;
use crate::node_queue::NodeId;
use async_trait::async_trait;

struct EmitOnceNode;

#[async_trait]
impl NodeBehavior for EmitOnceNode {
    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        ctx.state.emit(OutputChannel::DEFAULT, vec![serde_json::json!({"ok": true})])
    }
}

struct NoopScheduler;

impl RequestScheduler for NoopScheduler {
    fn schedule_action_call(
        &self,
        action: &str,
        params: JsonValue,
        _after: chrono::Duration,
    ) -> Request {
        Request::new(NodeId::new(), Uuid::new_v4(), action, params, Utc::now())
    }
}

#[tokio::test]
async fn execute_emits_exactly_once() {
    let node = EmitOnceNode;
    let executor = Executor::new(node);
    let config = Configuration::new();
    let metadata = Metadata::default();
    let state = ExecutionStateHandle::new(ExecutionRecord::new(NodeId::new()));
    let scheduler = NoopScheduler;

    executor
        .run_execute(ExecutionContext {
            configuration: &config,
            metadata: &metadata,
            state: &state,
            requests: &scheduler,
        })
        .await
        .unwrap();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.state, ExecutionState::Finished);
    assert_eq!(snapshot.emitted_channel.as_deref(), Some(OutputChannel::DEFAULT));

    // A second emit on the same handle must fail.
    let err = state.emit(OutputChannel::DEFAULT, vec![]).unwrap_err();
    assert!(matches!(err, ExecutorError::AlreadyEmitted { .. }));
}

struct WaitingNode;

#[async_trait]
impl NodeBehavior for WaitingNode {
    async fn execute(&self, ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        ctx.state.mark_waiting();
        Ok(())
    }
}

#[tokio::test]
async fn execute_without_emit_leaves_execution_waiting() {
    let executor = Executor::new(WaitingNode);
    let config = Configuration::new();
    let metadata = Metadata::default();
    let state = ExecutionStateHandle::new(ExecutionRecord::new(NodeId::new()));
    let scheduler = NoopScheduler;

    executor
        .run_execute(ExecutionContext {
            configuration: &config,
            metadata: &metadata,
            state: &state,
            requests: &scheduler,
        })
        .await
        .unwrap();

    assert_eq!(state.snapshot().state, ExecutionState::WaitingAction);
}

struct FailingNode;

#[async_trait]
impl NodeBehavior for FailingNode {
    async fn execute(&self, _ctx: ExecutionContext<'_>) -> Result<(), ExecutorError> {
        Err(ExecutorError::NodeFailed {
            reason: "boom".to_string(),
        })
    }
}

#[tokio::test]
async fn execute_error_propagates_and_leaves_execution_non_terminal_until_marked() {
    let executor = Executor::new(FailingNode);
    let config = Configuration::new();
    let metadata = Metadata::default();
    let state = ExecutionStateHandle::new(ExecutionRecord::new(NodeId::new()));
    let scheduler = NoopScheduler;

    let err = executor
        .run_execute(ExecutionContext {
            configuration: &config,
            metadata: &metadata,
            state: &state,
            requests: &scheduler,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutorError::NodeFailed { .. }));
    state.mark_failed(err.to_string());
    assert_eq!(state.snapshot().state, ExecutionState::Failed);
}

#[tokio::test]
async fn cancel_marks_execution_cancelled() {
    let executor = Executor::new(WaitingNode);
    let config = Configuration::new();
    let metadata = Metadata::default();
    let state = ExecutionStateHandle::new(ExecutionRecord::new(NodeId::new()));
    let scheduler = NoopScheduler;

    executor
        .run_cancel(ExecutionContext {
            configuration: &config,
            metadata: &metadata,
            state: &state,
            requests: &scheduler,
        })
        .await
        .unwrap();

    assert_eq!(state.snapshot().state, ExecutionState::Cancelled);
}
