// Tablet Driver - Shared Library
// Plugin discovery and construction, device configuration, profiles and the
// per-device input pipeline

pub mod builtin;
pub mod device;
pub mod error;
pub mod filter;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod platform;
pub mod plugin;
pub mod profile;

pub use device::{InputDevice, TabletConfiguration};
pub use error::{LoadError, PluginError};
pub use filter::Filter;
pub use output::{OutputMode, PointerPosition, PointerState};
pub use pipeline::{DevicePipeline, PipelineOutput};
pub use platform::Platform;
pub use plugin::{
    plugin_registry, CapabilityContract, CapabilityRegistry, ExtensionModule, PluginContext,
    PluginFactory, PluginSettings,
};
pub use profile::{Profile, ProfileCollection, ProfileEvent};

pub use tablet_report;
