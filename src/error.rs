//! Driver error types

use thiserror::Error;

/// Errors from plugin discovery and construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    /// An extension module could not enumerate its plugins
    #[error("Plugin module '{module}' can't be loaded and is likely out of date: {reason}")]
    ModuleUnloadable { module: String, reason: String },

    /// No discovered plugin has this path
    #[error("No constructor found for '{0}'")]
    DescriptorNotFound(String),

    /// The plugin was found but building it failed
    #[error("Unable to construct object '{path}': {reason}")]
    ConstructionFailed { path: String, reason: String },

    /// A constructor needed something the caller did not provide
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),

    /// A stored setting could not be read as the expected type
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}

impl PluginError {
    pub fn invalid_setting(key: &str, reason: impl ToString) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration and profile file loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
