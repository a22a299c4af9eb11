// Filters
// Post-process pointer state after the output mode, in profile order

use crate::error::PluginError;
use crate::output::{PointerPosition, PointerState};
use crate::plugin::SettingsProvider;

/// Filter capability
pub trait Filter: Send {
    fn name(&self) -> &str;

    fn filter(&mut self, state: PointerState) -> PointerState;
}

/// Leaves the state untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Filter for Passthrough {
    fn name(&self) -> &str {
        "Passthrough"
    }

    fn filter(&mut self, state: PointerState) -> PointerState {
        state
    }
}

/// Exponential moving average over the pointer position
///
/// `Weight` is the share of the new sample, `(0, 1]`; 1 disables smoothing.
#[derive(Debug, Clone)]
pub struct Smoothing {
    weight: f32,
    last: Option<PointerPosition>,
}

impl Smoothing {
    pub fn new(weight: f32) -> Result<Self, PluginError> {
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(PluginError::invalid_setting(
                "Weight",
                format!("{weight} is outside (0, 1]"),
            ));
        }
        Ok(Self { weight, last: None })
    }

    pub fn from_settings(settings: &SettingsProvider) -> Result<Self, PluginError> {
        Self::new(settings.get_or("Weight", 0.5)?)
    }

    fn blend(&self, previous: f32, current: f32) -> f32 {
        previous + (current - previous) * self.weight
    }
}

impl Filter for Smoothing {
    fn name(&self) -> &str {
        "Smoothing"
    }

    fn filter(&mut self, mut state: PointerState) -> PointerState {
        let smoothed = match (self.last, state.position) {
            (
                Some(PointerPosition::Absolute { x: px, y: py }),
                PointerPosition::Absolute { x, y },
            ) => PointerPosition::Absolute {
                x: self.blend(px, x),
                y: self.blend(py, y),
            },
            (
                Some(PointerPosition::Relative { dx: pdx, dy: pdy }),
                PointerPosition::Relative { dx, dy },
            ) => PointerPosition::Relative {
                dx: self.blend(pdx, dx),
                dy: self.blend(pdy, dy),
            },
            // First sample, or the output mode changed kind
            (_, position) => position,
        };
        self.last = Some(smoothed);
        state.position = smoothed;
        state
    }
}

/// Rescales pressure so the lower deadzone reads as zero and the upper
/// deadzone as full pressure
///
/// Deadzones are percentages of the pressure range.
#[derive(Debug, Clone)]
pub struct PressureDeadzone {
    lower: f32,
    upper: f32,
}

impl PressureDeadzone {
    pub fn new(lower_percent: f32, upper_percent: f32) -> Result<Self, PluginError> {
        if !(0.0..100.0).contains(&lower_percent) {
            return Err(PluginError::invalid_setting(
                "LowerDeadzone",
                format!("{lower_percent} is outside [0, 100)"),
            ));
        }
        if !(upper_percent > lower_percent && upper_percent <= 100.0) {
            return Err(PluginError::invalid_setting(
                "UpperDeadzone",
                format!("{upper_percent} must be above {lower_percent} and at most 100"),
            ));
        }
        Ok(Self {
            lower: lower_percent / 100.0,
            upper: upper_percent / 100.0,
        })
    }

    pub fn from_settings(settings: &SettingsProvider) -> Result<Self, PluginError> {
        Self::new(
            settings.get_or("LowerDeadzone", 0.0)?,
            settings.get_or("UpperDeadzone", 100.0)?,
        )
    }
}

impl Filter for PressureDeadzone {
    fn name(&self) -> &str {
        "Pressure Deadzone"
    }

    fn filter(&mut self, mut state: PointerState) -> PointerState {
        state.pressure =
            ((state.pressure - self.lower) / (self.upper - self.lower)).clamp(0.0, 1.0);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginSettings;
    use tablet_report::Buttons;

    fn at(x: f32, y: f32, pressure: f32) -> PointerState {
        PointerState::absolute(x, y, pressure, Buttons::empty())
    }

    #[test]
    fn test_smoothing_blends_positions() {
        let mut smoothing = Smoothing::new(0.5).unwrap();
        assert_eq!(
            smoothing.filter(at(0.0, 0.0, 0.0)).position,
            PointerPosition::Absolute { x: 0.0, y: 0.0 }
        );
        assert_eq!(
            smoothing.filter(at(1.0, 0.5, 0.0)).position,
            PointerPosition::Absolute { x: 0.5, y: 0.25 }
        );
        assert_eq!(
            smoothing.filter(at(1.0, 0.5, 0.0)).position,
            PointerPosition::Absolute { x: 0.75, y: 0.375 }
        );
    }

    #[test]
    fn test_smoothing_restarts_on_kind_change() {
        let mut smoothing = Smoothing::new(0.5).unwrap();
        smoothing.filter(at(0.0, 0.0, 0.0));
        let relative = PointerState::relative(4.0, 2.0, 0.0, Buttons::empty());
        assert_eq!(smoothing.filter(relative).position, relative.position);
    }

    #[test]
    fn test_smoothing_weight_validation() {
        assert!(Smoothing::new(0.0).is_err());
        assert!(Smoothing::new(1.5).is_err());
        assert!(Smoothing::new(1.0).is_ok());

        let settings = PluginSettings::new("Test").with("Weight", 2.0);
        assert!(matches!(
            Smoothing::from_settings(&SettingsProvider::new(&settings)),
            Err(PluginError::InvalidSetting { ref key, .. }) if key == "Weight"
        ));
    }

    #[test]
    fn test_pressure_deadzone() {
        let settings = PluginSettings::new("Test")
            .with("LowerDeadzone", 10.0)
            .with("UpperDeadzone", 90.0);
        let mut deadzone =
            PressureDeadzone::from_settings(&SettingsProvider::new(&settings)).unwrap();

        assert_eq!(deadzone.filter(at(0.0, 0.0, 0.05)).pressure, 0.0);
        assert_eq!(deadzone.filter(at(0.0, 0.0, 0.95)).pressure, 1.0);
        assert!((deadzone.filter(at(0.0, 0.0, 0.5)).pressure - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pressure_deadzone_validation() {
        assert!(PressureDeadzone::new(50.0, 50.0).is_err());
        assert!(PressureDeadzone::new(-1.0, 50.0).is_err());
        assert!(PressureDeadzone::new(0.0, 101.0).is_err());
    }

    #[test]
    fn test_passthrough() {
        let state = at(0.3, 0.4, 0.5);
        assert_eq!(Passthrough.filter(state), state);
    }
}
