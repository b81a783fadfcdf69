//! In-process subscription bus between integrations and triggers.
//!
//! Grounded on the per-target independent-delivery shape of
//! [`crate::queue_integration::DefaultEventRouter::route_event`]: each
//! subscriber is offered the message independently and failures are
//! collected rather than aborting the whole dispatch, narrowed here to
//! in-process delivery instead of queue delivery. No filtering happens
//! inside the bus itself — that is the receiving trigger's job.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::integration::IntegrationId;
use crate::ErrorCategory;

/// Opaque identifier returned from `Integration.Subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One registered subscription: an integration and the trigger-supplied
/// configuration that tells the integration what it's listening for.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub integration_id: IntegrationId,
    pub config: JsonValue,
}

/// Receives messages dispatched to a subscription. Implemented by the
/// owning trigger node (`OnIntegrationMessage`).
#[async_trait]
pub trait SubscriptionTarget: Send + Sync {
    async fn on_integration_message(&self, subscription: &Subscription, payload: &JsonValue);
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("no subscription with id {0:?}")]
    NotFound(SubscriptionId),
}

impl SubscriptionError {
    pub fn is_transient(&self) -> bool {
        false
    }

    pub fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Permanent
    }
}

/// In-process registry of subscriptions and their dispatch targets.
#[derive(Default)]
pub struct SubscriptionBus {
    subscriptions: RwLock<HashMap<SubscriptionId, (Subscription, std::sync::Arc<dyn SubscriptionTarget>)>>,
}

impl SubscriptionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger's subscription. Idempotency (re-subscribing only
    /// when the trigger has no stored id in its node metadata) is the
    /// caller's responsibility, since only the caller has that metadata.
    pub fn subscribe(
        &self,
        integration_id: IntegrationId,
        config: JsonValue,
        target: std::sync::Arc<dyn SubscriptionTarget>,
    ) -> SubscriptionId {
        let subscription = Subscription {
            id: SubscriptionId::new(),
            integration_id,
            config,
        };
        let id = subscription.id;
        self.subscriptions
            .write()
            .unwrap()
            .insert(id, (subscription, target));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.write().unwrap().remove(&id);
    }

    pub fn list_subscriptions(&self, integration_id: IntegrationId) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .unwrap()
            .values()
            .filter(|(s, _)| s.integration_id == integration_id)
            .map(|(s, _)| s.clone())
            .collect()
    }

    /// Deliver `payload` to one subscription by id.
    pub async fn send_message(
        &self,
        id: SubscriptionId,
        payload: JsonValue,
    ) -> Result<(), SubscriptionError> {
        let entry = self
            .subscriptions
            .read()
            .unwrap()
            .get(&id)
            .map(|(s, t)| (s.clone(), t.clone()));

        let (subscription, target) = entry.ok_or(SubscriptionError::NotFound(id))?;
        target.on_integration_message(&subscription, &payload).await;
        Ok(())
    }

    /// Deliver `payload` to every subscription registered for `integration_id`,
    /// independently (one subscriber's panic-free failure does not affect others).
    pub async fn broadcast(&self, integration_id: IntegrationId, payload: JsonValue) {
        let targets: Vec<_> = self
            .subscriptions
            .read()
            .unwrap()
            .values()
            .filter(|(s, _)| s.integration_id == integration_id)
            .map(|(s, t)| (s.clone(), t.clone()))
            .collect();

        for (subscription, target) in targets {
            target.on_integration_message(&subscription, &payload).await;
        }
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
