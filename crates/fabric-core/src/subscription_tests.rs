use super::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingTarget {
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl SubscriptionTarget for CountingTarget {
    async fn on_integration_message(&self, _subscription: &Subscription, _payload: &JsonValue) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn send_message_delivers_to_the_matching_subscription() {
    let bus = SubscriptionBus::new();
    let integration_id = IntegrationId::new();
    let count = Arc::new(AtomicUsize::new(0));
    let id = bus.subscribe(
        integration_id,
        serde_json::json!({"repo": "hello"}),
        Arc::new(CountingTarget { count: count.clone() }),
    );

    bus.send_message(id, serde_json::json!({"push": true})).await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unsubscribed_node_no_longer_receives_messages() {
    let bus = SubscriptionBus::new();
    let integration_id = IntegrationId::new();
    let count = Arc::new(AtomicUsize::new(0));
    let id = bus.subscribe(
        integration_id,
        serde_json::json!({}),
        Arc::new(CountingTarget { count: count.clone() }),
    );

    bus.unsubscribe(id);

    let err = bus.send_message(id, serde_json::json!({})).await.unwrap_err();
    assert!(matches!(err, SubscriptionError::NotFound(_)));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn broadcast_reaches_every_subscription_for_the_integration() {
    let bus = SubscriptionBus::new();
    let integration_id = IntegrationId::new();
    let other_integration_id = IntegrationId::new();
    let count = Arc::new(AtomicUsize::new(0));

    bus.subscribe(
        integration_id,
        serde_json::json!({}),
        Arc::new(CountingTarget { count: count.clone() }),
    );
    bus.subscribe(
        integration_id,
        serde_json::json!({}),
        Arc::new(CountingTarget { count: count.clone() }),
    );
    bus.subscribe(
        other_integration_id,
        serde_json::json!({}),
        Arc::new(CountingTarget { count: count.clone() }),
    );

    bus.broadcast(integration_id, serde_json::json!({})).await;

    assert_eq!(count.load(Ordering::SeqCst), 2);
}
