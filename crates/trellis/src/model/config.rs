//! Per-model configuration.
//!
//! Models read a [`ModelConfig`] once, at construction. Configurations can be
//! built in code with [`ModelConfig::builder`] or loaded from TOML or JSON.
//!
//! # Example
//!
//! ```
//! use trellis::model::ModelConfig;
//!
//! let config = ModelConfig::builder()
//!     .name("files")
//!     .prune_unobserved_handles(false)
//!     .build();
//! assert_eq!(config.name.as_deref(), Some("files"));
//!
//! let config = ModelConfig::from_toml_str("prune_unobserved_handles = false").unwrap();
//! assert!(!config.prune_unobserved_handles);
//! ```

use serde::{Deserialize, Serialize};
use trellis_core::{ModelError, Result};

/// Configuration shared by every model type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Drop persistent handles nobody observes after each committed
    /// transaction.
    ///
    /// When disabled, a handle stays registered (and keeps being remapped)
    /// until the item it tracks is deleted or
    /// `ItemModel::prune_persistent_indexes` is called.
    pub prune_unobserved_handles: bool,
    /// Assert that transactions run on the thread that created the model.
    pub debug_thread_checks: bool,
    /// Label used in log events and debug output.
    pub name: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            prune_unobserved_handles: true,
            debug_thread_checks: cfg!(debug_assertions),
            name: None,
        }
    }
}

impl ModelConfig {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::new()
    }

    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ModelError::config(e.to_string()))
    }

    /// Parses a configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| ModelError::config(e.to_string()))
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ModelError::config(e.to_string()))
    }

    /// Name used in logs, `"model"` if none is set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("model")
    }
}

/// Builder for [`ModelConfig`].
#[derive(Debug, Clone, Default)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether unobserved persistent handles are pruned after each commit.
    pub fn prune_unobserved_handles(mut self, prune: bool) -> Self {
        self.config.prune_unobserved_handles = prune;
        self
    }

    /// Sets whether transactions assert thread affinity.
    pub fn debug_thread_checks(mut self, enabled: bool) -> Self {
        self.config.debug_thread_checks = enabled;
        self
    }

    /// Sets the model's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ModelConfig {
        self.config
    }
}
