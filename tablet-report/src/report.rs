//! Typed report values produced by the dispatcher

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Raw input report as delivered by the transport.
///
/// Immutable once received. Cloning shares the underlying buffer, so
/// decoded reports can keep a back-reference for diagnostics at no cost.
#[derive(Clone, PartialEq, Eq)]
pub struct RawReport(Arc<[u8]>);

impl RawReport {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for RawReport {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for RawReport {
    fn from(data: &[u8]) -> Self {
        Self(data.into())
    }
}

impl From<Vec<u8>> for RawReport {
    fn from(data: Vec<u8>) -> Self {
        Self(data.into())
    }
}

impl fmt::Debug for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawReport({:02X?})", &self.0[..])
    }
}

/// Position in device (digitizer) units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Ordered set of button states, stored as a bitset.
///
/// Holds up to [`Buttons::CAPACITY`] buttons; index 0 is the first button
/// declared by the layout.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    bits: u32,
    len: u8,
}

impl Buttons {
    pub const CAPACITY: usize = 32;

    /// Empty set with no buttons
    pub const fn empty() -> Self {
        Self { bits: 0, len: 0 }
    }

    /// Append a button state. Buttons past capacity are ignored.
    pub fn push(&mut self, pressed: bool) {
        if (self.len as usize) < Self::CAPACITY {
            if pressed {
                self.bits |= 1 << self.len;
            }
            self.len += 1;
        }
    }

    /// State of button `index`, `false` if out of range
    pub fn get(&self, index: usize) -> bool {
        index < self.len as usize && self.bits & (1 << index) != 0
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any button is pressed
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

impl FromIterator<bool> for Buttons {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buttons = Buttons::empty();
        for pressed in iter {
            buttons.push(pressed);
        }
        buttons
    }
}

impl fmt::Debug for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Pen report: position, pressure and pen buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabletReport {
    pub position: Position,
    pub pressure: u32,
    pub pen_buttons: Buttons,
    pub raw: RawReport,
}

/// Report from the tablet's own controls (express keys)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxReport {
    pub aux_buttons: Buttons,
    pub raw: RawReport,
}

/// Exactly one of these is produced per raw report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportVariant {
    /// Generic pen report decoded with the device's fallback layout
    Baseline(TabletReport),
    /// Express key / auxiliary control report
    Auxiliary(AuxReport),
    /// Pen report decoded with a model-specific layout
    ModelSpecific(TabletReport),
}

impl ReportVariant {
    /// Pen report, if this is one of the tablet variants
    pub fn tablet(&self) -> Option<&TabletReport> {
        match self {
            Self::Baseline(r) | Self::ModelSpecific(r) => Some(r),
            Self::Auxiliary(_) => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.tablet().map(|r| r.position)
    }

    pub fn pressure(&self) -> Option<u32> {
        self.tablet().map(|r| r.pressure)
    }

    /// Pen buttons for tablet variants, aux buttons otherwise
    pub fn buttons(&self) -> Buttons {
        match self {
            Self::Baseline(r) | Self::ModelSpecific(r) => r.pen_buttons,
            Self::Auxiliary(r) => r.aux_buttons,
        }
    }

    /// The raw report this was decoded from
    pub fn raw(&self) -> &RawReport {
        match self {
            Self::Baseline(r) | Self::ModelSpecific(r) => &r.raw,
            Self::Auxiliary(r) => &r.raw,
        }
    }

    /// Short variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Baseline(_) => "baseline",
            Self::Auxiliary(_) => "auxiliary",
            Self::ModelSpecific(_) => "model-specific",
        }
    }
}
