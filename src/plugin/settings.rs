// Plugin settings
// Serializable per-plugin configuration and the read-only view handed to constructors

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::PluginError;

fn default_enable() -> bool {
    true
}

/// One stored property of a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSetting {
    pub property: String,
    pub value: Value,
}

/// Settings record for one pipeline stage, addressed by plugin path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    /// Descriptor path of the plugin these settings configure
    pub path: String,
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default)]
    pub settings: Vec<PluginSetting>,
}

impl PluginSettings {
    /// Empty, enabled settings for `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            enable: true,
            settings: Vec::new(),
        }
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    /// Insert or replace a property
    pub fn set(&mut self, property: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.settings.iter_mut().find(|s| s.property == property) {
            Some(existing) => existing.value = value,
            None => self.settings.push(PluginSetting {
                property: property.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.settings
            .iter()
            .find(|s| s.property == property)
            .map(|s| &s.value)
    }
}

/// Read-only settings view passed to plugin constructors
///
/// Plugins pull typed values out of it by property name; a plugin built
/// without stored settings gets an empty provider and uses its defaults.
#[derive(Debug, Clone, Default)]
pub struct SettingsProvider {
    values: HashMap<String, Value>,
}

impl SettingsProvider {
    pub fn new(settings: &PluginSettings) -> Self {
        let values = settings
            .settings
            .iter()
            .map(|s| (s.property.clone(), s.value.clone()))
            .collect();
        Self { values }
    }

    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// Typed value of `property`, `None` when not stored
    pub fn get<T: DeserializeOwned>(&self, property: &str) -> Result<Option<T>, PluginError> {
        match self.values.get(property) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| PluginError::invalid_setting(property, e)),
        }
    }

    /// Typed value of `property`, or `default` when not stored
    pub fn get_or<T: DeserializeOwned>(
        &self,
        property: &str,
        default: T,
    ) -> Result<T, PluginError> {
        Ok(self.get(property)?.unwrap_or(default))
    }
}

impl From<&PluginSettings> for SettingsProvider {
    fn from(settings: &PluginSettings) -> Self {
        Self::new(settings)
    }
}
