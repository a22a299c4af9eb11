//! Report decoding for graphics tablets
//!
//! This crate turns raw, fixed-length input reports into typed pen and
//! express-key reports:
//!
//! - [`codec`]: bounds-checked byte, bit and little-endian field readers
//! - [`dispatch`]: table-driven classification into a [`ReportVariant`]
//! - [`tables`]: dispatch tables for built-in devices
//!
//! Nothing on the decode path allocates, locks or blocks.

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod tables;

pub use codec::{bit_at, byte_at, is_bit_set, read_u16_le};
pub use dispatch::{
    AuxLayout, BitRef, DispatchRule, DispatchTable, Predicate, PressureField, ReportDispatcher,
    ReportLayout, TabletLayout,
};
pub use error::ReportError;
pub use report::{AuxReport, Buttons, Position, RawReport, ReportVariant, TabletReport};

/// Report parser capability - all device decoders implement this
///
/// Parsers are shared between the input thread and whoever built them, so
/// they take `&self` and must be `Send + Sync`.
pub trait ReportParser: Send + Sync {
    /// Decode one raw report into exactly one variant
    fn parse(&self, raw: &RawReport) -> Result<ReportVariant, ReportError>;
}
