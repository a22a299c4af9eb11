// Device pipeline
// raw report -> parser -> output mode -> filters -> pointer state

use tablet_report::{Buttons, RawReport, ReportParser, ReportVariant};
use tracing::{debug, info, warn};

use crate::device::InputDevice;
use crate::filter::Filter;
use crate::output::{OutputMode, PointerState};
use crate::plugin::{PluginContext, PluginFactory};
use crate::profile::{BindingSettings, Profile};

/// Result of processing one report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineOutput {
    /// Pen report, after the output mode and filters
    Pointer(PointerState),
    /// Express key states
    Auxiliary(Buttons),
}

/// Plugins built for one device from its configuration and profile
pub struct DevicePipeline {
    device: InputDevice,
    parser: Box<dyn ReportParser>,
    output_mode: Box<dyn OutputMode>,
    filters: Vec<Box<dyn Filter>>,
    bindings: BindingSettings,
}

impl DevicePipeline {
    /// Build the pipeline for `device`
    ///
    /// Returns `None` if the parser or output mode cannot be built. A filter
    /// that fails to build is left out.
    pub fn build(
        device: &InputDevice,
        profile: &Profile,
        factory: PluginFactory<'_>,
    ) -> Option<Self> {
        let ctx = PluginContext::for_device(device);
        let config = device.configuration();

        let parser: Box<dyn ReportParser> = factory.construct(&config.report_parser, &ctx)?;
        let output_mode: Box<dyn OutputMode> =
            factory.construct_from_settings(Some(&profile.output_mode), &ctx)?;

        let configured = profile.enabled_filters().count();
        let filters: Vec<Box<dyn Filter>> = profile
            .enabled_filters()
            .filter_map(|settings| factory.construct_from_settings(Some(settings), &ctx))
            .collect();
        if filters.len() != configured {
            warn!(
                tablet = device.name(),
                configured,
                built = filters.len(),
                "Some filters could not be built and are disabled"
            );
        }

        info!(
            tablet = device.name(),
            parser = %config.report_parser,
            output_mode = output_mode.name(),
            filters = filters.len(),
            "Device pipeline ready"
        );

        Some(Self {
            device: device.clone(),
            parser,
            output_mode,
            filters,
            bindings: profile.bindings.clone(),
        })
    }

    pub fn device(&self) -> &InputDevice {
        &self.device
    }

    pub fn output_mode(&self) -> &str {
        self.output_mode.name()
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Process one raw report
    ///
    /// Malformed reports are dropped. `None` also means the output mode
    /// chose not to move the pointer.
    pub fn process(&mut self, raw: &RawReport) -> Option<PipelineOutput> {
        let variant = match self.parser.parse(raw) {
            Ok(variant) => variant,
            Err(e) => {
                debug!(tablet = self.device.name(), report = ?raw, "Dropping report: {e}");
                return None;
            }
        };

        let report = match variant {
            ReportVariant::Auxiliary(aux) => {
                return Some(PipelineOutput::Auxiliary(aux.aux_buttons))
            }
            ReportVariant::Baseline(report) | ReportVariant::ModelSpecific(report) => report,
        };

        let state = self.output_mode.transform(&report)?;
        let mut state = self
            .filters
            .iter_mut()
            .fold(state, |state, filter| filter.filter(state));
        state.tip = self.bindings.tip_pressed(state.pressure);
        Some(PipelineOutput::Pointer(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::paths;
    use crate::device::huion_new_1060_plus;
    use crate::output::PointerPosition;
    use crate::plugin::{CapabilityRegistry, PluginSettings};

    fn pen_report(x: u16, y: u16, pressure: u16) -> RawReport {
        let [x0, x1] = x.to_le_bytes();
        let [y0, y1] = y.to_le_bytes();
        let [p0, p1] = pressure.to_le_bytes();
        RawReport::from(vec![0x08, 0x00, x0, x1, y0, y1, p0, p1, 0, 0, 0, 0])
    }

    fn pipeline(profile: &Profile) -> Option<DevicePipeline> {
        let registry = CapabilityRegistry::with_builtins();
        let device = InputDevice::new(huion_new_1060_plus());
        DevicePipeline::build(&device, profile, PluginFactory::new(&registry))
    }

    fn default_profile() -> Profile {
        let device = InputDevice::new(huion_new_1060_plus());
        Profile::defaults(&device, &CapabilityRegistry::with_builtins())
    }

    #[test]
    fn test_pen_report_to_pointer() {
        let mut pipeline = pipeline(&default_profile()).unwrap();
        assert_eq!(pipeline.output_mode(), "Absolute Mode");

        match pipeline.process(&pen_report(25400, 0, 8191)) {
            Some(PipelineOutput::Pointer(state)) => {
                assert_eq!(state.position, PointerPosition::Absolute { x: 0.5, y: 0.0 });
                assert_eq!(state.pressure, 1.0);
                assert!(state.tip);
            }
            other => panic!("Expected pointer output, got {other:?}"),
        }
    }

    #[test]
    fn test_hover_does_not_press_tip() {
        let mut pipeline = pipeline(&default_profile()).unwrap();
        match pipeline.process(&pen_report(100, 100, 0)) {
            Some(PipelineOutput::Pointer(state)) => assert!(!state.tip),
            other => panic!("Expected pointer output, got {other:?}"),
        }
    }

    #[test]
    fn test_aux_report() {
        let mut pipeline = pipeline(&default_profile()).unwrap();
        let raw = RawReport::from(vec![
            0x08,
            0x40,
            0,
            0,
            0b0000_0101,
            0b0000_1000,
            0,
            0,
            0,
            0,
            0,
            0,
        ]);
        match pipeline.process(&raw) {
            Some(PipelineOutput::Auxiliary(buttons)) => {
                assert_eq!(buttons.len(), 12);
                assert!(buttons.get(0) && buttons.get(2) && buttons.get(11));
                assert!(!buttons.get(1));
            }
            other => panic!("Expected aux output, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_report_dropped() {
        let mut pipeline = pipeline(&default_profile()).unwrap();
        assert!(pipeline.process(&RawReport::from(vec![0x08, 0x00, 0x10])).is_none());
        // Still usable afterwards
        assert!(pipeline.process(&pen_report(1, 1, 1)).is_some());
    }

    #[test]
    fn test_failed_filter_is_left_out() {
        let mut profile = default_profile();
        profile.filters = vec![
            PluginSettings::new(paths::SMOOTHING).with("Weight", 5.0),
            PluginSettings::new(paths::PRESSURE_DEADZONE).with("LowerDeadzone", 50.0),
        ];
        let mut pipeline = pipeline(&profile).unwrap();
        assert_eq!(pipeline.filter_names(), vec!["Pressure Deadzone"]);

        match pipeline.process(&pen_report(0, 0, 2000)) {
            Some(PipelineOutput::Pointer(state)) => {
                assert_eq!(state.pressure, 0.0);
                assert!(!state.tip);
            }
            other => panic!("Expected pointer output, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_output_mode_prevents_pipeline() {
        let mut profile = default_profile();
        profile.output_mode = PluginSettings::new("Does.Not.Exist");
        assert!(pipeline(&profile).is_none());
    }

    #[test]
    fn test_relative_mode_first_report_anchors() {
        let mut profile = default_profile();
        profile.output_mode = PluginSettings::new(paths::RELATIVE_MODE);
        let mut pipeline = pipeline(&profile).unwrap();

        assert!(pipeline.process(&pen_report(0, 0, 0)).is_none());
        assert!(matches!(
            pipeline.process(&pen_report(200, 0, 0)),
            Some(PipelineOutput::Pointer(PointerState {
                position: PointerPosition::Relative { .. },
                ..
            }))
        ));
    }

    #[test]
    fn test_pipeline_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<DevicePipeline>();
    }
}
