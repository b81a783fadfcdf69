//! Integration plugin lifecycle: Sync, resource listing, inbound request
//! handling, and cleanup.
//!
//! Generalizes the provider-configuration idiom in [`crate::webhook::generic_provider`]
//! (a YAML-declared, code-free way to onboard a webhook source) into the full
//! lifecycle an installed integration goes through: credentials are synced,
//! the plugin becomes `Ready` or `Error`, its components/triggers/resources
//! become available to canvases, and on deletion its state is torn down.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::config_schema::{Configuration, Field};
use crate::ErrorCategory;

/// Opaque, immutable identifier for an installed integration instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntegrationId(Uuid);

impl IntegrationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IntegrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IntegrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an installed integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IntegrationState {
    Pending,
    Ready,
    Error,
}

/// Persisted record for one installed integration instance.
#[derive(Debug, Clone)]
pub struct IntegrationRecord {
    pub id: IntegrationId,
    pub plugin_name: String,
    pub config: Configuration,
    pub metadata: BTreeMap<String, JsonValue>,
    pub state: IntegrationState,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntegrationRecord {
    pub fn new(plugin_name: impl Into<String>, config: Configuration) -> Self {
        let now = Utc::now();
        Self {
            id: IntegrationId::new(),
            plugin_name: plugin_name.into(),
            config,
            metadata: BTreeMap::new(),
            state: IntegrationState::Pending,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An inbound HTTP request forwarded to `HandleRequest`.
#[derive(Debug, Clone)]
pub struct IntegrationRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Response a plugin returns from `HandleRequest`.
#[derive(Debug, Clone)]
pub struct IntegrationResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl IntegrationResponse {
    pub fn accepted() -> Self {
        Self {
            status: 200,
            body: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            body: message.into().into_bytes(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: 403,
            body: message.into().into_bytes(),
        }
    }
}

/// A selectable external resource surfaced through `ListResources`, used to
/// populate `integration-resource` fields in the canvas editor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Resource {
    pub id: String,
    pub label: String,
}

/// Errors an integration plugin may surface.
#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    #[error("sync failed: {reason}")]
    SyncFailed { reason: String },

    #[error("credentials rejected: {reason}")]
    CredentialsRejected { reason: String },

    #[error("transient integration failure: {reason}")]
    Transient { reason: String },

    #[error("unsupported resource type: {resource_type}")]
    UnsupportedResourceType { resource_type: String },

    #[error("cleanup failed: {reason}")]
    CleanupFailed { reason: String },
}

impl IntegrationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::Transient { .. } => ErrorCategory::Transient,
            Self::CredentialsRejected { .. } => ErrorCategory::Security,
            Self::SyncFailed { .. } | Self::CleanupFailed { .. } => ErrorCategory::Permanent,
            Self::UnsupportedResourceType { .. } => ErrorCategory::Permanent,
        }
    }
}

/// Capability contract an installed integration plugin implements.
///
/// Every method has a sensible default so a plugin only overrides the
/// capabilities it actually has (the sum-type + dispatch-table idiom: not
/// every integration serves inbound requests or lists resources).
#[async_trait]
pub trait IntegrationPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn label(&self) -> &str {
        self.name()
    }
    fn description(&self) -> &str {
        ""
    }
    fn icon(&self) -> Option<&str> {
        None
    }
    fn instructions(&self) -> Option<&str> {
        None
    }

    /// Configuration schema consumed by [`crate::config_schema::validate`].
    fn configuration(&self) -> Vec<Field>;

    /// Validate credentials/config end-to-end and populate `metadata`.
    /// Leaves the record `Pending`/`Error` on failure.
    async fn sync(
        &self,
        record: &mut IntegrationRecord,
    ) -> Result<(), IntegrationError>;

    /// Enumerate selectable resources of `resource_type` for `integration-resource` fields.
    async fn list_resources(
        &self,
        _record: &IntegrationRecord,
        resource_type: &str,
    ) -> Result<Vec<Resource>, IntegrationError> {
        Err(IntegrationError::UnsupportedResourceType {
            resource_type: resource_type.to_string(),
        })
    }

    /// Serve an inbound HTTP request addressed at this integration instance.
    async fn handle_request(
        &self,
        _record: &IntegrationRecord,
        _request: IntegrationRequest,
    ) -> Result<IntegrationResponse, IntegrationError> {
        Ok(IntegrationResponse {
            status: 404,
            body: b"integration does not accept inbound requests".to_vec(),
        })
    }

    /// Tear down any external state owned by this integration instance.
    /// Called only after dependent webhooks/subscriptions have been removed.
    async fn cleanup(&self, _record: &IntegrationRecord) -> Result<(), IntegrationError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "integration_tests.rs"]
mod tests;
