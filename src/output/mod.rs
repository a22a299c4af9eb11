// Output modes
// Turn decoded pen reports into pointer state for the injection backend

mod absolute;
mod relative;

pub use absolute::{AbsoluteMode, LinuxArtistMode, TabletArea};
pub use relative::RelativeMode;

use serde::Serialize;
use tablet_report::{Buttons, TabletReport};

/// Where the pointer should go
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PointerPosition {
    /// Normalized position inside the tablet area, `[0, 1]` on both axes
    /// when clipping is enabled
    Absolute { x: f32, y: f32 },
    /// Movement in millimeters since the previous report
    Relative { dx: f32, dy: f32 },
}

/// Pointer update produced by an output mode and refined by filters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: PointerPosition,
    /// Normalized pressure, `[0, 1]`
    pub pressure: f32,
    pub pen_buttons: Buttons,
    /// Whether the pen tip counts as pressed; set from the profile bindings
    pub tip: bool,
}

impl PointerState {
    pub fn absolute(x: f32, y: f32, pressure: f32, pen_buttons: Buttons) -> Self {
        Self {
            position: PointerPosition::Absolute { x, y },
            pressure,
            pen_buttons,
            tip: false,
        }
    }

    pub fn relative(dx: f32, dy: f32, pressure: f32, pen_buttons: Buttons) -> Self {
        Self {
            position: PointerPosition::Relative { dx, dy },
            pressure,
            pen_buttons,
            tip: false,
        }
    }
}

/// Output mode capability
///
/// One instance per device pipeline. `transform` returns `None` when the
/// report should not move the pointer (e.g. the first report seen by a
/// relative mode).
pub trait OutputMode: Send {
    fn name(&self) -> &str;

    fn transform(&mut self, report: &TabletReport) -> Option<PointerState>;
}

/// Pressure scaled by the pen's maximum, clamped to `[0, 1]`
pub(crate) fn normalize_pressure(pressure: u32, max_pressure: u32) -> f32 {
    (pressure as f32 / max_pressure.max(1) as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pressure() {
        assert_eq!(normalize_pressure(0, 8191), 0.0);
        assert_eq!(normalize_pressure(8191, 8191), 1.0);
        assert_eq!(normalize_pressure(9000, 8191), 1.0);
        assert_eq!(normalize_pressure(5, 0), 1.0);
    }
}
