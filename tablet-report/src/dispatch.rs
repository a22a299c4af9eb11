//! Table-driven report classification
//!
//! A [`DispatchTable`] is configuration data: an ordered list of bit-test
//! predicates, each paired with the layout used to decode a report that
//! matches it, plus a fallback layout. Rules are evaluated in declaration
//! order and the first match wins. Because the fallback always applies,
//! every report long enough for its layout decodes to exactly one variant.
//!
//! Supporting a new device family means writing a new table, not new
//! dispatch code.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{bit_at, byte_at, read_u16_le};
use crate::error::ReportError;
use crate::report::{AuxReport, Buttons, Position, RawReport, ReportVariant, TabletReport};
use crate::ReportParser;

/// Reference to one bit of one byte in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRef {
    pub byte: usize,
    pub bit: u8,
}

impl BitRef {
    pub const fn new(byte: usize, bit: u8) -> Self {
        Self { byte, bit }
    }

    #[inline]
    fn read(&self, raw: &[u8]) -> Result<bool, ReportError> {
        bit_at(raw, self.byte, self.bit)
    }
}

/// Classification test against a single report byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    /// Bit `bit` of byte `byte` is set
    BitSet { byte: usize, bit: u8 },
    /// At least one bit of `mask` is set in byte `byte`
    AnyBitSet { byte: usize, mask: u8 },
    /// Byte `byte` equals `value` (typically a report ID)
    ByteEquals { byte: usize, value: u8 },
}

impl Predicate {
    /// Offset of the byte this predicate inspects
    pub fn byte(&self) -> usize {
        match *self {
            Self::BitSet { byte, .. }
            | Self::AnyBitSet { byte, .. }
            | Self::ByteEquals { byte, .. } => byte,
        }
    }

    /// Evaluate against `raw`. A buffer too short to hold the byte is malformed.
    #[inline]
    pub fn matches(&self, raw: &[u8]) -> Result<bool, ReportError> {
        match *self {
            Self::BitSet { byte, bit } => bit_at(raw, byte, bit),
            Self::AnyBitSet { byte, mask } => byte_at(raw, byte).map(|b| b & mask != 0),
            Self::ByteEquals { byte, value } => byte_at(raw, byte).map(|b| b == value),
        }
    }
}

/// Where the pressure value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PressureField {
    /// Constant pressure, for reports that carry none
    Fixed { value: u32 },
    /// Little-endian u16 at `offset`
    U16Le { offset: usize },
}

/// Byte layout of a pen report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabletLayout {
    /// Offset of the little-endian u16 X coordinate
    pub x: usize,
    /// Offset of the little-endian u16 Y coordinate
    pub y: usize,
    pub pressure: PressureField,
    /// Pen buttons in order
    #[serde(default)]
    pub buttons: Vec<BitRef>,
}

impl TabletLayout {
    /// Minimum report length this layout can decode, `None` if an offset
    /// is past the addressable range
    pub fn checked_min_len(&self) -> Option<usize> {
        let pressure_end = match self.pressure {
            PressureField::Fixed { .. } => 0,
            PressureField::U16Le { offset } => offset.checked_add(2)?,
        };
        let end = self
            .x
            .checked_add(2)?
            .max(self.y.checked_add(2)?)
            .max(pressure_end);
        buttons_end(&self.buttons).map(|b| b.max(end))
    }

    /// Minimum report length this layout can decode
    pub fn min_len(&self) -> usize {
        self.checked_min_len().unwrap_or(usize::MAX)
    }

    pub fn decode(&self, raw: &RawReport) -> Result<TabletReport, ReportError> {
        let position = Position::new(
            read_u16_le(raw, self.x)? as u32,
            read_u16_le(raw, self.y)? as u32,
        );
        let pressure = match self.pressure {
            PressureField::Fixed { value } => value,
            PressureField::U16Le { offset } => read_u16_le(raw, offset)? as u32,
        };
        Ok(TabletReport {
            position,
            pressure,
            pen_buttons: read_buttons(&self.buttons, raw)?,
            raw: raw.clone(),
        })
    }
}

/// Byte layout of an auxiliary (express key) report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxLayout {
    pub buttons: Vec<BitRef>,
}

impl AuxLayout {
    pub fn checked_min_len(&self) -> Option<usize> {
        buttons_end(&self.buttons)
    }

    pub fn min_len(&self) -> usize {
        self.checked_min_len().unwrap_or(usize::MAX)
    }

    pub fn decode(&self, raw: &RawReport) -> Result<AuxReport, ReportError> {
        Ok(AuxReport {
            aux_buttons: read_buttons(&self.buttons, raw)?,
            raw: raw.clone(),
        })
    }
}

/// One past the highest byte any button reads
fn buttons_end(refs: &[BitRef]) -> Option<usize> {
    refs.iter()
        .try_fold(0, |end: usize, r| Some(end.max(r.byte.checked_add(1)?)))
}

fn read_buttons(refs: &[BitRef], raw: &[u8]) -> Result<Buttons, ReportError> {
    let mut buttons = Buttons::empty();
    for r in refs {
        buttons.push(r.read(raw)?);
    }
    Ok(buttons)
}

/// Layout selected by a rule, tagged with the variant it produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "camelCase")]
pub enum ReportLayout {
    Auxiliary(AuxLayout),
    ModelSpecific(TabletLayout),
    Baseline(TabletLayout),
}

impl ReportLayout {
    pub fn checked_min_len(&self) -> Option<usize> {
        match self {
            Self::Auxiliary(l) => l.checked_min_len(),
            Self::ModelSpecific(l) | Self::Baseline(l) => l.checked_min_len(),
        }
    }

    pub fn min_len(&self) -> usize {
        self.checked_min_len().unwrap_or(usize::MAX)
    }

    pub fn decode(&self, raw: &RawReport) -> Result<ReportVariant, ReportError> {
        match self {
            Self::Auxiliary(l) => l.decode(raw).map(ReportVariant::Auxiliary),
            Self::ModelSpecific(l) => l.decode(raw).map(ReportVariant::ModelSpecific),
            Self::Baseline(l) => l.decode(raw).map(ReportVariant::Baseline),
        }
    }

    fn bit_refs(&self) -> &[BitRef] {
        match self {
            Self::Auxiliary(l) => &l.buttons,
            Self::ModelSpecific(l) | Self::Baseline(l) => &l.buttons,
        }
    }
}

/// One entry of a dispatch table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRule {
    pub when: Predicate,
    pub then: ReportLayout,
}

/// Ordered predicates plus the layout used when none matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTable {
    #[serde(default)]
    pub rules: Vec<DispatchRule>,
    pub fallback: ReportLayout,
}

impl DispatchTable {
    /// Table with no rules: every report decodes with `fallback`
    pub fn fallback_only(fallback: ReportLayout) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule after the existing ones
    pub fn rule(mut self, when: Predicate, then: ReportLayout) -> Self {
        self.rules.push(DispatchRule { when, then });
        self
    }

    /// Reject tables that could never decode correctly
    pub fn validate(&self) -> Result<(), ReportError> {
        let layouts = self
            .rules
            .iter()
            .map(|r| &r.then)
            .chain(std::iter::once(&self.fallback));

        for layout in layouts {
            if layout.checked_min_len().is_none() {
                return Err(ReportError::InvalidLayout(format!(
                    "{layout:?} reads past the addressable range"
                )));
            }
            let refs = layout.bit_refs();
            if refs.len() > Buttons::CAPACITY {
                return Err(ReportError::InvalidLayout(format!(
                    "{} buttons declared, at most {} supported",
                    refs.len(),
                    Buttons::CAPACITY
                )));
            }
            if let Some(r) = refs.iter().find(|r| r.bit > 7) {
                return Err(ReportError::InvalidLayout(format!(
                    "bit index {} at byte {} is out of range",
                    r.bit, r.byte
                )));
            }
        }

        if let Some(rule) = self.rules.iter().find(|r| r.when.byte() == usize::MAX) {
            return Err(ReportError::InvalidLayout(format!(
                "predicate {:?} reads past the addressable range",
                rule.when
            )));
        }

        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| matches!(r.when, Predicate::BitSet { bit, .. } if bit > 7))
        {
            return Err(ReportError::InvalidLayout(format!(
                "predicate {:?} tests a bit out of range",
                rule.when
            )));
        }

        Ok(())
    }

    /// Shortest report every rule and layout can handle
    pub fn min_report_len(&self) -> usize {
        self.rules
            .iter()
            .map(|r| r.when.byte().saturating_add(1).max(r.then.min_len()))
            .chain(std::iter::once(self.fallback.min_len()))
            .max()
            .unwrap_or(0)
    }
}

/// Classifies raw reports with a validated [`DispatchTable`]
#[derive(Debug, Clone)]
pub struct ReportDispatcher {
    table: DispatchTable,
}

impl ReportDispatcher {
    pub fn new(table: DispatchTable) -> Result<Self, ReportError> {
        table.validate()?;
        debug!(
            rules = table.rules.len(),
            min_len = table.min_report_len(),
            "Report dispatcher ready"
        );
        Ok(Self { table })
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Classify and decode one report.
    ///
    /// The first rule whose predicate matches decides the layout; reports
    /// matching no rule use the fallback. Reports too short for the
    /// predicate or the selected layout are rejected as malformed.
    pub fn classify(&self, raw: &RawReport) -> Result<ReportVariant, ReportError> {
        for rule in &self.table.rules {
            if rule.when.matches(raw)? {
                return rule.then.decode(raw);
            }
        }
        self.table.fallback.decode(raw)
    }
}

impl ReportParser for ReportDispatcher {
    fn parse(&self, raw: &RawReport) -> Result<ReportVariant, ReportError> {
        self.classify(raw)
    }
}
