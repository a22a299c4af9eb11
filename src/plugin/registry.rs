// Capability registry
// Aggregates extension module manifests into the set of discoverable plugins

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use super::contract::{CapabilityContract, PluginObject};
use super::factory::panic_message;
use super::manifest::{ConstructFn, ExtensionModule, PluginContext, PluginEntry};
use super::settings::SettingsProvider;
use crate::builtin::BuiltinModule;
use crate::error::PluginError;
use crate::platform::Platform;

/// A discovered plugin type
///
/// Produced once per scan and immutable afterwards.
#[derive(Clone)]
pub struct PluginDescriptor {
    path: String,
    display_name: Option<String>,
    contracts: Vec<CapabilityContract>,
    platforms: Option<Vec<Platform>>,
    ignored: bool,
    module: String,
    construct: Arc<ConstructFn>,
}

impl PluginDescriptor {
    fn from_entry(module: &str, entry: PluginEntry) -> Self {
        Self {
            path: entry.path,
            display_name: entry.display_name,
            contracts: entry.contracts,
            platforms: entry.platforms,
            ignored: entry.ignored,
            module: module.to_string(),
            construct: entry.construct,
        }
    }

    /// Unique, stable plugin path (settings are keyed by it)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Display name, falling back to the path
    pub fn label(&self) -> &str {
        self.display_name().unwrap_or(&self.path)
    }

    pub fn contracts(&self) -> &[CapabilityContract] {
        &self.contracts
    }

    pub fn implements(&self, contract: CapabilityContract) -> bool {
        self.contracts.contains(&contract)
    }

    /// Platforms the plugin is restricted to, `None` if unrestricted
    pub fn platforms(&self) -> Option<&[Platform]> {
        self.platforms.as_deref()
    }

    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms
            .as_ref()
            .map(|p| p.contains(&platform))
            .unwrap_or(true)
    }

    /// Excluded from queries, still resolvable by path
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Name of the module that provided this plugin
    pub fn module(&self) -> &str {
        &self.module
    }

    pub(crate) fn instantiate(
        &self,
        settings: &SettingsProvider,
        ctx: &PluginContext<'_>,
        contract: CapabilityContract,
    ) -> Result<PluginObject, PluginError> {
        (self.construct)(settings, ctx, contract)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("path", &self.path)
            .field("display_name", &self.display_name)
            .field("contracts", &self.contracts)
            .field("platforms", &self.platforms)
            .field("ignored", &self.ignored)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// Registry of discovered plugin types
///
/// Built by a single scan and read-only afterwards, so it can be shared
/// between threads freely.
pub struct CapabilityRegistry {
    platform: Platform,
    descriptors: Vec<PluginDescriptor>,
    by_path: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Scan `modules` for the running platform, accepting every contract
    pub fn scan(modules: &[&dyn ExtensionModule]) -> Self {
        Self::scan_for(Platform::current(), &CapabilityContract::ALL, modules)
    }

    /// Scan `modules`, keeping entries that implement one of `contracts`
    /// and support `platform`
    ///
    /// A module whose manifest cannot be read, or panics while building it,
    /// is skipped with a warning.
    pub fn scan_for(
        platform: Platform,
        contracts: &[CapabilityContract],
        modules: &[&dyn ExtensionModule],
    ) -> Self {
        let mut registry = Self {
            platform,
            descriptors: Vec::new(),
            by_path: HashMap::new(),
        };

        for module in modules {
            let manifest = match panic::catch_unwind(AssertUnwindSafe(|| module.manifest())) {
                Ok(Ok(manifest)) => manifest,
                Ok(Err(e)) => {
                    warn!(
                        module = module.name(),
                        version = module.version(),
                        "Skipping plugin module: {e}"
                    );
                    continue;
                }
                Err(payload) => {
                    let e = PluginError::ModuleUnloadable {
                        module: module.name().to_string(),
                        reason: format!("manifest panicked: {}", panic_message(&*payload)),
                    };
                    warn!(
                        module = module.name(),
                        version = module.version(),
                        "Skipping plugin module: {e}"
                    );
                    continue;
                }
            };

            for entry in manifest.entries {
                if !entry.contracts.iter().any(|c| contracts.contains(c)) {
                    debug!(path = entry.path(), "Not a plugin type, skipping");
                    continue;
                }
                if !entry.supports(platform) {
                    debug!(path = entry.path(), %platform, "Plugin unsupported on this platform");
                    continue;
                }
                registry.insert(module.name(), entry);
            }
        }

        info!(
            plugins = registry.descriptors.len(),
            modules = modules.len(),
            %platform,
            "Plugin scan complete"
        );
        registry
    }

    /// Registry populated from the built-in module
    pub fn with_builtins() -> Self {
        Self::scan(&[&BuiltinModule])
    }

    fn insert(&mut self, module: &str, entry: PluginEntry) {
        if let Some(&existing) = self.by_path.get(entry.path()) {
            warn!(
                path = entry.path(),
                module,
                registered_by = self.descriptors[existing].module(),
                "Duplicate plugin path, keeping first registration"
            );
            return;
        }
        let descriptor = PluginDescriptor::from_entry(module, entry);
        self.by_path
            .insert(descriptor.path.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
    }

    /// Platform the scan filtered for
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Every discovered descriptor, ignored ones included
    pub fn descriptors(&self) -> &[PluginDescriptor] {
        &self.descriptors
    }

    /// Discoverable plugins implementing `contract`
    ///
    /// Excludes ignored plugins and anything unsupported on the platform.
    pub fn query(&self, contract: CapabilityContract) -> Vec<&PluginDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.implements(contract))
            .filter(|d| d.supports(self.platform))
            .filter(|d| !d.is_ignored())
            .collect()
    }

    /// Exact lookup by plugin path
    pub fn resolve(&self, path: &str) -> Option<&PluginDescriptor> {
        self.by_path.get(path).map(|&i| &self.descriptors[i])
    }

    /// Human-readable name of the plugin at `path`, if it declares one
    pub fn display_name(&self, path: &str) -> Option<&str> {
        self.resolve(path).and_then(|d| d.display_name())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Global plugin registry singleton
/// Use `plugin_registry()` to access
static REGISTRY: OnceLock<CapabilityRegistry> = OnceLock::new();

/// Get the global plugin registry
/// Scans the built-in module on first access
pub fn plugin_registry() -> &'static CapabilityRegistry {
    REGISTRY.get_or_init(CapabilityRegistry::with_builtins)
}
