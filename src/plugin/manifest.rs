// Extension module manifests
// Each module declares its plugins explicitly: path, contracts, platform
// restrictions, display name and a constructor.

use std::fmt;
use std::sync::Arc;

use super::contract::{CapabilityContract, PluginObject};
use super::settings::SettingsProvider;
use crate::device::InputDevice;
use crate::error::PluginError;
use crate::platform::Platform;

/// Dependencies available to a plugin constructor
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginContext<'a> {
    /// Device the instance is being built for, if any
    pub device: Option<&'a InputDevice>,
}

impl<'a> PluginContext<'a> {
    /// Context with no dependencies
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_device(device: &'a InputDevice) -> Self {
        Self {
            device: Some(device),
        }
    }

    /// The device, or `MissingDependency` for device-bound plugins
    pub fn require_device(&self) -> Result<&'a InputDevice, PluginError> {
        self.device.ok_or(PluginError::MissingDependency("InputDevice"))
    }
}

/// Plugin constructor: `(settings, context, requested contract) -> instance`
///
/// The contract argument is the one the caller asked for, which matters for
/// entries registered under several contracts.
pub type ConstructFn = dyn Fn(
        &SettingsProvider,
        &PluginContext<'_>,
        CapabilityContract,
    ) -> Result<PluginObject, PluginError>
    + Send
    + Sync;

/// One plugin declared by an extension module
#[derive(Clone)]
pub struct PluginEntry {
    pub(crate) path: String,
    pub(crate) display_name: Option<String>,
    pub(crate) contracts: Vec<CapabilityContract>,
    pub(crate) platforms: Option<Vec<Platform>>,
    pub(crate) ignored: bool,
    pub(crate) construct: Arc<ConstructFn>,
}

impl PluginEntry {
    pub fn new<F>(path: impl Into<String>, contract: CapabilityContract, construct: F) -> Self
    where
        F: Fn(
                &SettingsProvider,
                &PluginContext<'_>,
                CapabilityContract,
            ) -> Result<PluginObject, PluginError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            path: path.into(),
            display_name: None,
            contracts: vec![contract],
            platforms: None,
            ignored: false,
            construct: Arc::new(construct),
        }
    }

    /// Human-readable name shown in plugin lists
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Additional contract this plugin satisfies
    ///
    /// The constructor must then build an object for whichever contract it
    /// is handed.
    pub fn also(mut self, contract: CapabilityContract) -> Self {
        if !self.contracts.contains(&contract) {
            self.contracts.push(contract);
        }
        self
    }

    /// Restrict the plugin to the given platforms
    pub fn platforms(mut self, platforms: &[Platform]) -> Self {
        self.platforms = Some(platforms.to_vec());
        self
    }

    /// Keep the plugin resolvable by path but out of query results
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Unrestricted plugins run everywhere
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms
            .as_ref()
            .map(|p| p.contains(&platform))
            .unwrap_or(true)
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("path", &self.path)
            .field("display_name", &self.display_name)
            .field("contracts", &self.contracts)
            .field("platforms", &self.platforms)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

/// Everything one extension module provides
#[derive(Debug, Clone, Default)]
pub struct PluginManifest {
    pub entries: Vec<PluginEntry>,
}

impl PluginManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, entry: PluginEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// A loaded source of plugins
///
/// `manifest` may fail (e.g. a module built against an incompatible
/// version); the registry skips such modules with a warning.
pub trait ExtensionModule: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "0.0.0"
    }

    fn manifest(&self) -> Result<PluginManifest, PluginError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Passthrough;

    fn entry() -> PluginEntry {
        PluginEntry::new("Test.Filter", CapabilityContract::Filter, |_, _, _| {
            Ok(PluginObject::Filter(Box::new(Passthrough)))
        })
    }

    #[test]
    fn test_unrestricted_entry_supports_all() {
        let entry = entry();
        assert!(Platform::ALL.iter().all(|&p| entry.supports(p)));
    }

    #[test]
    fn test_platform_restriction() {
        let entry = entry().platforms(&[Platform::Linux]);
        assert!(entry.supports(Platform::Linux));
        assert!(!entry.supports(Platform::Windows));
    }

    #[test]
    fn test_also_dedupes() {
        let entry = entry()
            .also(CapabilityContract::Filter)
            .also(CapabilityContract::OutputMode);
        assert_eq!(
            entry.contracts,
            vec![CapabilityContract::Filter, CapabilityContract::OutputMode]
        );
    }

    #[test]
    fn test_require_device() {
        assert!(matches!(
            PluginContext::empty().require_device(),
            Err(PluginError::MissingDependency("InputDevice"))
        ));
    }
}
