// Profile types
// Per-device configuration: which output mode and filters run, and how the pen binds

use serde::{Deserialize, Serialize};

use crate::builtin::DEFAULT_OUTPUT_MODE;
use crate::device::InputDevice;
use crate::plugin::{CapabilityContract, CapabilityRegistry, PluginSettings};

fn default_tip_threshold() -> f32 {
    1.0
}

/// Pen bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingSettings {
    /// Pressure, in percent, at which the tip counts as pressed
    #[serde(default = "default_tip_threshold")]
    pub tip_activation_threshold: f32,
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            tip_activation_threshold: default_tip_threshold(),
        }
    }
}

impl BindingSettings {
    /// Whether normalized `pressure` activates the tip
    pub fn tip_pressed(&self, pressure: f32) -> bool {
        pressure > 0.0 && pressure * 100.0 >= self.tip_activation_threshold
    }
}

/// Configuration for one device
///
/// `tablet` is the device's name and the profile's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub tablet: String,
    pub output_mode: PluginSettings,
    #[serde(default)]
    pub filters: Vec<PluginSettings>,
    #[serde(default)]
    pub bindings: BindingSettings,
}

impl Profile {
    /// Default profile for `device`
    ///
    /// Uses the default output mode when the registry has it, otherwise the
    /// first discoverable one. No filters.
    pub fn defaults(device: &InputDevice, registry: &CapabilityRegistry) -> Self {
        let output_mode = match registry.resolve(DEFAULT_OUTPUT_MODE) {
            Some(d) if !d.is_ignored() => DEFAULT_OUTPUT_MODE.to_string(),
            _ => registry
                .query(CapabilityContract::OutputMode)
                .first()
                .map(|d| d.path().to_string())
                .unwrap_or_else(|| DEFAULT_OUTPUT_MODE.to_string()),
        };

        Self {
            tablet: device.name().to_string(),
            output_mode: PluginSettings::new(output_mode),
            filters: Vec::new(),
            bindings: BindingSettings::default(),
        }
    }

    /// Filters that are switched on, in order
    pub fn enabled_filters(&self) -> impl Iterator<Item = &PluginSettings> {
        self.filters.iter().filter(|f| f.enable)
    }

    pub fn belongs_to(&self, device: &InputDevice) -> bool {
        self.tablet == device.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::paths;
    use crate::device::huion_new_1060_plus;
    use crate::platform::Platform;
    use crate::plugin::{ExtensionModule, PluginEntry, PluginManifest, PluginObject};
    use crate::error::PluginError;
    use crate::filter::Passthrough;

    #[test]
    fn test_defaults() {
        let device = InputDevice::new(huion_new_1060_plus());
        let profile = Profile::defaults(&device, &CapabilityRegistry::with_builtins());

        assert_eq!(profile.tablet, "Huion New 1060 Plus");
        assert_eq!(profile.output_mode.path, paths::ABSOLUTE_MODE);
        assert!(profile.filters.is_empty());
        assert!(profile.belongs_to(&device));
    }

    struct NoAbsolute;

    impl ExtensionModule for NoAbsolute {
        fn name(&self) -> &str {
            "no-absolute"
        }

        fn manifest(&self) -> Result<PluginManifest, PluginError> {
            Ok(PluginManifest::new().register(PluginEntry::new(
                "Test.Output",
                CapabilityContract::OutputMode,
                |_, _, _| Ok(PluginObject::Filter(Box::new(Passthrough))),
            )))
        }
    }

    #[test]
    fn test_defaults_fall_back_to_first_output_mode() {
        let device = InputDevice::new(huion_new_1060_plus());
        let registry =
            CapabilityRegistry::scan_for(Platform::Linux, &CapabilityContract::ALL, &[&NoAbsolute]);
        let profile = Profile::defaults(&device, &registry);
        assert_eq!(profile.output_mode.path, "Test.Output");
    }

    #[test]
    fn test_tip_threshold() {
        let bindings = BindingSettings {
            tip_activation_threshold: 5.0,
        };
        assert!(!bindings.tip_pressed(0.04));
        assert!(bindings.tip_pressed(0.05));
        assert!(!BindingSettings { tip_activation_threshold: 0.0 }.tip_pressed(0.0));
    }

    #[test]
    fn test_enabled_filters() {
        let mut disabled = PluginSettings::new(paths::PRESSURE_DEADZONE);
        disabled.enable = false;
        let profile = Profile {
            tablet: "Test".into(),
            output_mode: PluginSettings::new(paths::ABSOLUTE_MODE),
            filters: vec![PluginSettings::new(paths::SMOOTHING), disabled],
            bindings: BindingSettings::default(),
        };
        let enabled: Vec<_> = profile.enabled_filters().map(|f| f.path.as_str()).collect();
        assert_eq!(enabled, vec![paths::SMOOTHING]);
    }
}
