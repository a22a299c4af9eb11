//! Built-in dispatch tables
//!
//! Tables for devices that ship with the driver. Other devices supply
//! theirs through configuration (see [`DispatchTable`]'s serde form).

use crate::dispatch::{
    AuxLayout, BitRef, DispatchTable, Predicate, PressureField, ReportLayout, TabletLayout,
};

/// Generic pen report layout
///
/// Format: [report_id, flags, X_lo, X_hi, Y_lo, Y_hi, P_lo, P_hi]
/// Pen buttons are flag bits 1 and 2.
pub fn generic_tablet_layout() -> TabletLayout {
    TabletLayout {
        x: 2,
        y: 4,
        pressure: PressureField::U16Le { offset: 6 },
        buttons: vec![BitRef::new(1, 1), BitRef::new(1, 2)],
    }
}

/// Generic pen report wrapped as a baseline layout
pub fn generic_layout() -> ReportLayout {
    ReportLayout::Baseline(generic_tablet_layout())
}

/// Table for devices that only send generic pen reports
pub fn generic() -> DispatchTable {
    DispatchTable::fallback_only(generic_layout())
}

/// Express key report shared by UC-Logic based tablets
///
/// Keys 0-7 are bits of byte 4, keys 8-11 the low bits of byte 5.
pub fn uclogic_aux_layout() -> AuxLayout {
    let buttons = (0..8)
        .map(|bit| BitRef::new(4, bit))
        .chain((0..4).map(|bit| BitRef::new(5, bit)))
        .collect();
    AuxLayout { buttons }
}

/// Huion New 1060 Plus
///
/// - flags bit 6: express key report
/// - flags bit 1 or 2: pen report without pressure (hover with a button held)
/// - otherwise: generic pen report
pub fn huion_new_1060_plus() -> DispatchTable {
    DispatchTable::fallback_only(generic_layout())
        .rule(
            Predicate::BitSet { byte: 1, bit: 6 },
            ReportLayout::Auxiliary(uclogic_aux_layout()),
        )
        .rule(
            Predicate::AnyBitSet {
                byte: 1,
                mask: 0b0000_0110,
            },
            ReportLayout::ModelSpecific(TabletLayout {
                x: 2,
                y: 4,
                pressure: PressureField::Fixed { value: 1 },
                buttons: vec![BitRef::new(1, 1), BitRef::new(1, 2)],
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_validate() {
        assert!(generic().validate().is_ok());
        assert!(huion_new_1060_plus().validate().is_ok());
    }

    #[test]
    fn test_uclogic_aux_layout() {
        let layout = uclogic_aux_layout();
        assert_eq!(layout.buttons.len(), 12);
        assert_eq!(layout.min_len(), 6);
    }

    #[test]
    fn test_generic_min_len() {
        assert_eq!(generic().min_report_len(), 8);
    }
}
