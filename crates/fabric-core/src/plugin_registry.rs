//! Process-wide registry of integration plugins.
//!
//! Populated once at startup and treated as immutable afterwards: plugins
//! register themselves (or are registered by the service binary) keyed by a
//! stable name, and every other component (webhook dispatch, canvas editor
//! resource pickers, the node executor) looks plugins up by that name.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::ErrorCategory;
use crate::integration::IntegrationPlugin;

/// Error returned when registering or looking up a plugin.
#[derive(Debug, Clone, Error)]
pub enum PluginRegistryError {
    #[error("integration '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("no integration registered under '{name}'")]
    NotFound { name: String },
}

impl PluginRegistryError {
    pub fn is_transient(&self) -> bool {
        false
    }

    pub fn error_category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Immutable-after-init registry of integration plugins, keyed by stable name.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn IntegrationPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its own [`IntegrationPlugin::name`].
    ///
    /// Fails fast on a duplicate name; callers at startup should treat this
    /// as fatal, matching the teacher's `expect()` on its known-good default
    /// provider registration.
    pub fn register(&mut self, plugin: Arc<dyn IntegrationPlugin>) -> Result<(), PluginRegistryError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(PluginRegistryError::AlreadyRegistered { name });
        }
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn IntegrationPlugin>, PluginRegistryError> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| PluginRegistryError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "plugin_registry_tests.rs"]
mod tests;
