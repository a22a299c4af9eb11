// Built-in plugins
// The extension module compiled into the driver itself

use crate::error::PluginError;
use crate::filter::{Passthrough, PressureDeadzone, Smoothing};
use crate::output::{AbsoluteMode, LinuxArtistMode, RelativeMode};
use crate::parsers;
use crate::platform::Platform;
use crate::plugin::{CapabilityContract, ExtensionModule, PluginEntry, PluginManifest, PluginObject};

/// Stable plugin paths; profiles store these
pub mod paths {
    pub const TABLET_REPORT_PARSER: &str = "TabletDriver.Parsers.TabletReportParser";
    pub const NEW_1060_PLUS_PARSER: &str = "TabletDriver.Parsers.Huion.New1060PlusReportParser";
    pub const CONFIGURABLE_PARSER: &str = "TabletDriver.Parsers.ConfigurableReportParser";

    pub const ABSOLUTE_MODE: &str = "TabletDriver.Output.AbsoluteMode";
    pub const RELATIVE_MODE: &str = "TabletDriver.Output.RelativeMode";
    pub const LINUX_ARTIST_MODE: &str = "TabletDriver.Output.LinuxArtistMode";

    pub const SMOOTHING: &str = "TabletDriver.Filters.Smoothing";
    pub const PRESSURE_DEADZONE: &str = "TabletDriver.Filters.PressureDeadzone";
    pub const PASSTHROUGH: &str = "TabletDriver.Filters.Passthrough";
}

/// Output mode a new profile starts with
pub const DEFAULT_OUTPUT_MODE: &str = paths::ABSOLUTE_MODE;

pub struct BuiltinModule;

impl ExtensionModule for BuiltinModule {
    fn name(&self) -> &str {
        env!("CARGO_PKG_NAME")
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn manifest(&self) -> Result<PluginManifest, PluginError> {
        use CapabilityContract::{Filter, OutputMode, ReportParser};

        Ok(PluginManifest::new()
            // Report parsers
            .register(PluginEntry::new(paths::TABLET_REPORT_PARSER, ReportParser, |_, _, _| {
                parsers::tablet_report_parser().map(PluginObject::ReportParser)
            }))
            .register(PluginEntry::new(paths::NEW_1060_PLUS_PARSER, ReportParser, |_, _, _| {
                parsers::new_1060_plus_parser().map(PluginObject::ReportParser)
            }))
            .register(
                PluginEntry::new(paths::CONFIGURABLE_PARSER, ReportParser, |settings, ctx, _| {
                    parsers::configurable_parser(settings, ctx).map(PluginObject::ReportParser)
                })
                .display_name("Configurable Parser"),
            )
            // Output modes
            .register(
                PluginEntry::new(paths::ABSOLUTE_MODE, OutputMode, |settings, ctx, _| {
                    let mode = AbsoluteMode::from_settings(settings, ctx)?;
                    Ok(PluginObject::OutputMode(Box::new(mode)))
                })
                .display_name("Absolute Mode"),
            )
            .register(
                PluginEntry::new(paths::RELATIVE_MODE, OutputMode, |settings, ctx, _| {
                    let mode = RelativeMode::from_settings(settings, ctx)?;
                    Ok(PluginObject::OutputMode(Box::new(mode)))
                })
                .display_name("Relative Mode"),
            )
            .register(
                PluginEntry::new(paths::LINUX_ARTIST_MODE, OutputMode, |settings, ctx, _| {
                    let mode = LinuxArtistMode::from_settings(settings, ctx)?;
                    Ok(PluginObject::OutputMode(Box::new(mode)))
                })
                .display_name("Artist Mode")
                .platforms(&[Platform::Linux]),
            )
            // Filters
            .register(
                PluginEntry::new(paths::SMOOTHING, Filter, |settings, _, _| {
                    Ok(PluginObject::Filter(Box::new(Smoothing::from_settings(settings)?)))
                })
                .display_name("Smoothing"),
            )
            .register(
                PluginEntry::new(paths::PRESSURE_DEADZONE, Filter, |settings, _, _| {
                    Ok(PluginObject::Filter(Box::new(PressureDeadzone::from_settings(settings)?)))
                })
                .display_name("Pressure Deadzone"),
            )
            .register(
                PluginEntry::new(paths::PASSTHROUGH, Filter, |_, _, _| {
                    Ok(PluginObject::Filter(Box::new(Passthrough)))
                })
                .ignored(),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::CapabilityRegistry;

    fn scan(platform: Platform) -> CapabilityRegistry {
        CapabilityRegistry::scan_for(platform, &CapabilityContract::ALL, &[&BuiltinModule])
    }

    #[test]
    fn test_manifest_paths_unique() {
        let manifest = BuiltinModule.manifest().unwrap();
        let mut paths: Vec<_> = manifest.entries.iter().map(|e| e.path().to_string()).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), total);
        assert_eq!(total, 9);
    }

    #[test]
    fn test_linux_registry() {
        let registry = scan(Platform::Linux);

        let outputs: Vec<_> = registry
            .query(CapabilityContract::OutputMode)
            .iter()
            .map(|d| d.label().to_string())
            .collect();
        assert_eq!(outputs, vec!["Absolute Mode", "Relative Mode", "Artist Mode"]);

        let filters: Vec<_> = registry
            .query(CapabilityContract::Filter)
            .iter()
            .map(|d| d.path().to_string())
            .collect();
        assert_eq!(filters, vec![paths::SMOOTHING, paths::PRESSURE_DEADZONE]);
        assert!(registry.resolve(paths::PASSTHROUGH).is_some());
    }

    #[test]
    fn test_windows_registry_has_no_artist_mode() {
        let registry = scan(Platform::Windows);
        assert!(registry.resolve(paths::LINUX_ARTIST_MODE).is_none());
        assert_eq!(registry.query(CapabilityContract::OutputMode).len(), 2);
    }

    #[test]
    fn test_parser_display_names() {
        let registry = scan(Platform::Linux);
        assert_eq!(registry.display_name(paths::TABLET_REPORT_PARSER), None);
        assert_eq!(registry.display_name(paths::CONFIGURABLE_PARSER), Some("Configurable Parser"));
    }
}
