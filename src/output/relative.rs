use tablet_report::{Position, TabletReport};

use super::{normalize_pressure, OutputMode, PointerState};
use crate::device::{DigitizerSpecifications, InputDevice};
use crate::error::PluginError;
use crate::plugin::{PluginContext, SettingsProvider};

/// Moves the pointer by the pen's movement, like a mouse
pub struct RelativeMode {
    digitizer: DigitizerSpecifications,
    max_pressure: u32,
    sensitivity: f32,
    last: Option<Position>,
}

impl RelativeMode {
    pub fn new(device: &InputDevice, sensitivity: f32) -> Result<Self, PluginError> {
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err(PluginError::invalid_setting(
                "Sensitivity",
                format!("{sensitivity} must be a positive number"),
            ));
        }
        Ok(Self {
            digitizer: device.specifications().digitizer.clone(),
            max_pressure: device.configuration().max_pressure(),
            sensitivity,
            last: None,
        })
    }

    /// Settings: `Sensitivity` (defaults to 1.0)
    pub fn from_settings(
        settings: &SettingsProvider,
        ctx: &PluginContext<'_>,
    ) -> Result<Self, PluginError> {
        let device = ctx.require_device()?;
        Self::new(device, settings.get_or("Sensitivity", 1.0)?)
    }

    /// Forget the last position so the next report does not jump
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl OutputMode for RelativeMode {
    fn name(&self) -> &str {
        "Relative Mode"
    }

    fn transform(&mut self, report: &TabletReport) -> Option<PointerState> {
        let previous = self.last.replace(report.position)?;

        let (x0, y0) = self.digitizer.to_millimeters(previous.x, previous.y);
        let (x1, y1) = self
            .digitizer
            .to_millimeters(report.position.x, report.position.y);

        Some(PointerState::relative(
            (x1 - x0) * self.sensitivity,
            (y1 - y0) * self.sensitivity,
            normalize_pressure(report.pressure, self.max_pressure),
            report.pen_buttons,
        ))
    }
}
