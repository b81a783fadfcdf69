//! Webhook provisioning: create/reuse/delete external webhooks with
//! reference-counted sharing between nodes.
//!
//! Extends the configuration shape introduced by
//! [`crate::webhook::generic_provider::GenericProviderConfig`] with the
//! `CompareConfig`/`Merge`/`Cleanup` operations a Trigger's `Setup` relies on
//! to avoid creating a duplicate external webhook when an existing one
//! already covers what it needs. None of this sharing logic exists in the
//! configuration-driven provider as shipped; it is new, built in the same
//! declarative-config idiom.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::integration::IntegrationId;
use crate::node_queue::NodeId;
use crate::ErrorCategory;

/// Opaque identifier for a provisioned (possibly shared) webhook row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct WebhookId(Uuid);

impl WebhookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WebhookId {
    fn default() -> Self {
        Self::new()
    }
}

/// One provisioned external webhook, possibly referenced by several nodes.
#[derive(Debug, Clone)]
pub struct ProvisionedWebhook {
    pub id: WebhookId,
    pub integration_id: IntegrationId,
    pub external_scope: String,
    pub config: JsonValue,
    pub metadata: BTreeMap<String, JsonValue>,
    pub reference_count: u32,
    pub referencing_nodes: Vec<NodeId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum WebhookProvisionError {
    #[error("webhook setup failed: {reason}")]
    SetupFailed { reason: String },

    #[error("webhook merge failed: {reason}")]
    MergeFailed { reason: String },

    #[error("webhook cleanup failed: {reason}")]
    CleanupFailed { reason: String },

    #[error("node '{node_id}' does not reference webhook '{webhook_id}'")]
    NotReferenced { node_id: NodeId, webhook_id: WebhookId },
}

impl WebhookProvisionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SetupFailed { .. } | Self::MergeFailed { .. })
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::SetupFailed { .. } | Self::MergeFailed { .. } => ErrorCategory::Transient,
            Self::CleanupFailed { .. } => ErrorCategory::Transient,
            Self::NotReferenced { .. } => ErrorCategory::Permanent,
        }
    }
}

/// Handler contract a Trigger's webhook source implements.
///
/// `CompareConfig` returns `true` iff `existing` is a superset usable by
/// `desired` (e.g. its event set is a superset and scope matches exactly).
/// `Merge` is only tried among same-scope candidates that did not already
/// satisfy `CompareConfig`.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Externally create a webhook for `desired`, returning implementation
    /// metadata (e.g. a remote UUID) to persist alongside the row.
    async fn setup(&self, desired: &JsonValue) -> Result<BTreeMap<String, JsonValue>, WebhookProvisionError>;

    /// `true` iff `existing` already covers everything `desired` needs.
    fn compare_config(&self, existing: &JsonValue, desired: &JsonValue) -> bool;

    /// Attempt to widen `existing` to also cover `desired`. Returns the
    /// (possibly unchanged) merged config and whether an external update
    /// is required.
    async fn merge(
        &self,
        existing: &JsonValue,
        desired: &JsonValue,
    ) -> Result<(JsonValue, bool), WebhookProvisionError>;

    /// Remove the external webhook. Must be idempotent: an empty/absent
    /// remote identifier in `metadata` is a no-op.
    async fn cleanup(&self, metadata: &BTreeMap<String, JsonValue>) -> Result<(), WebhookProvisionError>;
}

/// In-process provisioner state. Persistence (the actual webhook table) is
/// left to the service binary; this type models the reference-counting and
/// dispatch logic precisely so it can be unit-tested without a database.
#[derive(Default)]
pub struct WebhookProvisioner {
    webhooks: RwLock<Vec<ProvisionedWebhook>>,
}

impl WebhookProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a webhook on behalf of `node_id`. Reuses or merges into an
    /// existing same-scope webhook when possible; otherwise calls
    /// `handler.setup` to create a new one.
    pub async fn request_webhook(
        &self,
        handler: &dyn WebhookHandler,
        integration_id: IntegrationId,
        node_id: NodeId,
        external_scope: impl Into<String>,
        desired: JsonValue,
    ) -> Result<WebhookId, WebhookProvisionError> {
        let external_scope = external_scope.into();

        // 1. Look for an existing webhook in the same scope that already covers `desired`.
        {
            let mut webhooks = self.webhooks.write().unwrap();
            if let Some(existing) = webhooks
                .iter_mut()
                .find(|w| w.integration_id == integration_id && w.external_scope == external_scope
                    && handler.compare_config(&w.config, &desired))
            {
                existing.reference_count += 1;
                existing.referencing_nodes.push(node_id);
                return Ok(existing.id);
            }
        }

        // 2. Try merging into any same-scope webhook that doesn't already cover `desired`.
        let merge_target = {
            let webhooks = self.webhooks.read().unwrap();
            webhooks
                .iter()
                .find(|w| w.integration_id == integration_id && w.external_scope == external_scope)
                .map(|w| (w.id, w.config.clone()))
        };

        if let Some((webhook_id, existing_config)) = merge_target {
            let (merged, changed) = handler.merge(&existing_config, &desired).await?;
            let mut webhooks = self.webhooks.write().unwrap();
            if let Some(webhook) = webhooks.iter_mut().find(|w| w.id == webhook_id) {
                if changed {
                    webhook.config = merged;
                }
                webhook.reference_count += 1;
                webhook.referencing_nodes.push(node_id);
                return Ok(webhook.id);
            }
        }

        // 3. No usable candidate: create a new external webhook.
        let metadata = handler.setup(&desired).await?;
        let webhook = ProvisionedWebhook {
            id: WebhookId::new(),
            integration_id,
            external_scope,
            config: desired,
            metadata,
            reference_count: 1,
            referencing_nodes: vec![node_id],
            created_at: Utc::now(),
        };
        let id = webhook.id;
        self.webhooks.write().unwrap().push(webhook);
        Ok(id)
    }

    /// Drop `node_id`'s reference to `webhook_id`. At reference count zero,
    /// the external webhook is cleaned up and the row removed.
    pub async fn release_webhook(
        &self,
        handler: &dyn WebhookHandler,
        webhook_id: WebhookId,
        node_id: NodeId,
    ) -> Result<(), WebhookProvisionError> {
        let metadata_if_empty = {
            let mut webhooks = self.webhooks.write().unwrap();
            let Some(index) = webhooks.iter().position(|w| w.id == webhook_id) else {
                return Err(WebhookProvisionError::NotReferenced { node_id, webhook_id });
            };

            let webhook = &mut webhooks[index];
            let Some(pos) = webhook.referencing_nodes.iter().position(|n| *n == node_id) else {
                return Err(WebhookProvisionError::NotReferenced { node_id, webhook_id });
            };
            webhook.referencing_nodes.remove(pos);
            webhook.reference_count = webhook.reference_count.saturating_sub(1);

            if webhook.reference_count == 0 {
                let metadata = webhook.metadata.clone();
                webhooks.remove(index);
                Some(metadata)
            } else {
                None
            }
        };

        if let Some(metadata) = metadata_if_empty {
            handler.cleanup(&metadata).await?;
        }

        Ok(())
    }

    pub fn reference_count(&self, webhook_id: WebhookId) -> Option<u32> {
        self.webhooks
            .read()
            .unwrap()
            .iter()
            .find(|w| w.id == webhook_id)
            .map(|w| w.reference_count)
    }
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
