use serde::{Deserialize, Serialize};
use tablet_report::TabletReport;

use super::{normalize_pressure, OutputMode, PointerState};
use crate::device::{DigitizerSpecifications, InputDevice};
use crate::error::PluginError;
use crate::plugin::{PluginContext, SettingsProvider};

/// Region of the digitizer mapped to the output, in millimeters
///
/// `x` and `y` are the center of the area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabletArea {
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
}

impl TabletArea {
    /// The whole active area of the digitizer
    pub fn full(digitizer: &DigitizerSpecifications) -> Self {
        Self {
            width: digitizer.width,
            height: digitizer.height,
            x: digitizer.width / 2.0,
            y: digitizer.height / 2.0,
        }
    }

    fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    /// Position in millimeters relative to the area, `[0, 1]` inside it
    pub fn normalize(&self, x_mm: f32, y_mm: f32) -> (f32, f32) {
        ((x_mm - self.left()) / self.width, (y_mm - self.top()) / self.height)
    }
}

/// Maps the tablet area onto the output area one to one
pub struct AbsoluteMode {
    digitizer: DigitizerSpecifications,
    max_pressure: u32,
    area: TabletArea,
    clip: bool,
}

impl AbsoluteMode {
    pub fn new(
        device: &InputDevice,
        area: Option<TabletArea>,
        clip: bool,
    ) -> Result<Self, PluginError> {
        let digitizer = device.specifications().digitizer.clone();
        let area = area.unwrap_or_else(|| TabletArea::full(&digitizer));
        if !(area.width > 0.0 && area.height > 0.0) {
            return Err(PluginError::invalid_setting(
                "Area",
                format!("{}x{} mm is not a usable area", area.width, area.height),
            ));
        }

        Ok(Self {
            digitizer,
            max_pressure: device.configuration().max_pressure(),
            area,
            clip,
        })
    }

    /// Constructor used by the plugin registry
    ///
    /// Settings: `Area` (defaults to the full digitizer), `ClipArea`
    /// (defaults to true).
    pub fn from_settings(
        settings: &SettingsProvider,
        ctx: &PluginContext<'_>,
    ) -> Result<Self, PluginError> {
        let device = ctx.require_device()?;
        let area = settings.get::<TabletArea>("Area")?;
        let clip = settings.get_or("ClipArea", true)?;
        Self::new(device, area, clip)
    }

    pub fn area(&self) -> &TabletArea {
        &self.area
    }
}

impl OutputMode for AbsoluteMode {
    fn name(&self) -> &str {
        "Absolute Mode"
    }

    fn transform(&mut self, report: &TabletReport) -> Option<PointerState> {
        let (x_mm, y_mm) = self
            .digitizer
            .to_millimeters(report.position.x, report.position.y);
        let (mut x, mut y) = self.area.normalize(x_mm, y_mm);
        if self.clip {
            x = x.clamp(0.0, 1.0);
            y = y.clamp(0.0, 1.0);
        }

        Some(PointerState::absolute(
            x,
            y,
            normalize_pressure(report.pressure, self.max_pressure),
            report.pen_buttons,
        ))
    }
}

/// Absolute mode driving a virtual pen on Linux, so applications see
/// pressure and pen buttons instead of a mouse
pub struct LinuxArtistMode {
    inner: AbsoluteMode,
}

impl LinuxArtistMode {
    pub fn from_settings(
        settings: &SettingsProvider,
        ctx: &PluginContext<'_>,
    ) -> Result<Self, PluginError> {
        Ok(Self {
            inner: AbsoluteMode::from_settings(settings, ctx)?,
        })
    }
}

impl OutputMode for LinuxArtistMode {
    fn name(&self) -> &str {
        "Artist Mode"
    }

    fn transform(&mut self, report: &TabletReport) -> Option<PointerState> {
        self.inner.transform(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::huion_new_1060_plus;
    use crate::output::PointerPosition;
    use crate::plugin::PluginSettings;
    use tablet_report::{Buttons, Position, RawReport};

    fn report(x: u32, y: u32, pressure: u32) -> TabletReport {
        TabletReport {
            position: Position::new(x, y),
            pressure,
            pen_buttons: Buttons::empty(),
            raw: RawReport::from(vec![0u8; 12]),
        }
    }

    fn device() -> InputDevice {
        InputDevice::new(huion_new_1060_plus())
    }

    #[test]
    fn test_full_area_mapping() {
        let device = device();
        let mut mode = AbsoluteMode::new(&device, None, true).unwrap();

        let state = mode.transform(&report(25400, 31750, 8191)).unwrap();
        assert_eq!(state.position, PointerPosition::Absolute { x: 0.5, y: 1.0 });
        assert_eq!(state.pressure, 1.0);
        assert!(!state.tip);
    }

    #[test]
    fn test_area_from_settings_and_clipping() {
        let device = device();
        // Left half of the tablet
        let settings = PluginSettings::new("Test").with(
            "Area",
            serde_json::json!({ "width": 127.0, "height": 158.75, "x": 63.5, "y": 79.375 }),
        );
        let provider = SettingsProvider::new(&settings);
        let ctx = PluginContext::for_device(&device);
        let mut mode = AbsoluteMode::from_settings(&provider, &ctx).unwrap();

        let state = mode.transform(&report(50800, 0, 0)).unwrap();
        assert_eq!(state.position, PointerPosition::Absolute { x: 1.0, y: 0.0 });

        let unclipped = PluginSettings::new("Test")
            .with("Area", serde_json::to_value(*mode.area()).unwrap())
            .with("ClipArea", false);
        let mut mode = AbsoluteMode::from_settings(
            &SettingsProvider::new(&unclipped),
            &PluginContext::for_device(&device),
        )
        .unwrap();
        let state = mode.transform(&report(50800, 0, 0)).unwrap();
        assert_eq!(state.position, PointerPosition::Absolute { x: 2.0, y: 0.0 });
    }

    #[test]
    fn test_requires_device() {
        let result =
            AbsoluteMode::from_settings(&SettingsProvider::default(), &PluginContext::empty());
        assert!(matches!(result, Err(PluginError::MissingDependency("InputDevice"))));
    }

    #[test]
    fn test_rejects_empty_area() {
        let area = TabletArea {
            width: 0.0,
            height: 10.0,
            x: 0.0,
            y: 0.0,
        };
        assert!(matches!(
            AbsoluteMode::new(&device(), Some(area), true),
            Err(PluginError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_rejects_nan_area() {
        let area = TabletArea {
            width: f32::NAN,
            height: 10.0,
            x: 0.0,
            y: 0.0,
        };
        assert!(matches!(
            AbsoluteMode::new(&device(), Some(area), true),
            Err(PluginError::InvalidSetting { .. })
        ));

        let area = TabletArea {
            height: f32::NAN,
            width: 10.0,
            ..area
        };
        assert!(AbsoluteMode::new(&device(), Some(area), true).is_err());
    }

    #[test]
    fn test_artist_mode_matches_absolute() {
        let device = device();
        let ctx = PluginContext::for_device(&device);
        let provider = SettingsProvider::default();
        let mut artist = LinuxArtistMode::from_settings(&provider, &ctx).unwrap();
        let mut absolute = AbsoluteMode::from_settings(&provider, &ctx).unwrap();

        let r = report(1000, 2000, 4000);
        assert_eq!(artist.transform(&r), absolute.transform(&r));
        assert_eq!(artist.name(), "Artist Mode");
    }
}
