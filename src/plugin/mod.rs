// Plugin system
// Discovery (registry), construction (factory) and configuration (settings)
// of report parsers, output modes and filters supplied by extension modules.

pub mod contract;
pub mod factory;
pub mod manifest;
pub mod registry;
pub mod settings;

pub use contract::{CapabilityContract, FromPluginObject, PluginObject};
pub use factory::PluginFactory;
pub use manifest::{ConstructFn, ExtensionModule, PluginContext, PluginEntry, PluginManifest};
pub use registry::{plugin_registry, CapabilityRegistry, PluginDescriptor};
pub use settings::{PluginSetting, PluginSettings, SettingsProvider};
