//! lg4ff device-level output reports.
//!
//! All functions are pure and allocation-free.
//!
//! # Protocol notes
//!
//! Besides the four effect slots (see [`crate::slot`]) the wheel accepts a few
//! device-level commands, each a 7-byte report:
//!
//! ```text
//! {0x0d, loop, 0, 0, 0, 0, 0}    set/unset fixed loop mode
//! {0xf5, 0, 0, 0, 0, 0, 0}       disable autocenter spring
//! {0xfe, 0x0d, a, a, b, 0, 0}    autocenter spring strength
//! {0x14, 0, 0, 0, 0, 0, 0}       enable autocenter spring
//! {0xfe, 0x03, m>>14, m>>14, m, 0, 0}   FF-EX autocenter
//! ```
//!
//! Setting the autocenter on anything but the Formula Force EX is a
//! three-report sequence: disable, strength, enable. A strength of zero stops
//! after the disable. The FF-EX takes a single report with a magnitude in
//! `0..=90`.
//!
//! The strength report expands a 16-bit magnitude into two bytes along a
//! curve with a knee at `0xaaaa`: below it `a` grows by `0x0c` and `b` by
//! `0x80` per unit, above it by `0x06` and `0xff`. `a` is halved, then both
//! are divided by `0xaaaa`.

#![deny(static_mut_refs)]

use crate::ids::{REPORT_LEN, commands, extended};
use crate::types::LogitechModel;

const AUTOCENTER_KNEE: u32 = 0xaaaa;
const FFEX_AUTOCENTER_MAX: u32 = 90;

/// Build the fixed loop mode report (`0x0d`).
pub fn build_fixed_loop_report(enabled: bool) -> [u8; REPORT_LEN] {
    [commands::FIXED_LOOP, u8::from(enabled), 0, 0, 0, 0, 0]
}

/// Build the autocenter disable report (`0xf5`).
pub fn build_autocenter_disable_report() -> [u8; REPORT_LEN] {
    [commands::AUTOCENTER_DISABLE, 0, 0, 0, 0, 0, 0]
}

/// Build the autocenter enable report (`0x14`).
pub fn build_autocenter_enable_report() -> [u8; REPORT_LEN] {
    [commands::AUTOCENTER_ENABLE, 0, 0, 0, 0, 0, 0]
}

/// Build the autocenter strength report for a 16-bit `magnitude`.
pub fn build_autocenter_strength_report(magnitude: u16) -> [u8; REPORT_LEN] {
    let magnitude = u32::from(magnitude);
    let (mut expand_a, expand_b) = if magnitude <= AUTOCENTER_KNEE {
        (0x0c * magnitude, 0x80 * magnitude)
    } else {
        (
            0x0c * AUTOCENTER_KNEE + 0x06 * (magnitude - AUTOCENTER_KNEE),
            0x80 * AUTOCENTER_KNEE + 0xff * (magnitude - AUTOCENTER_KNEE),
        )
    };
    expand_a >>= 1;

    let a = saturate_u8(expand_a / AUTOCENTER_KNEE);
    let b = saturate_u8(expand_b / AUTOCENTER_KNEE);
    [commands::EXTENDED, extended::AUTOCENTER_STRENGTH, a, a, b, 0, 0]
}

/// Build the Formula Force EX autocenter report. `autocenter` is a
/// percentage, clamped to 100.
pub fn build_ffex_autocenter_report(autocenter: u8) -> [u8; REPORT_LEN] {
    let magnitude = FFEX_AUTOCENTER_MAX * u32::from(autocenter.min(100)) / 100;
    let high = saturate_u8(magnitude >> 14);
    [
        commands::EXTENDED,
        extended::FFEX_AUTOCENTER,
        high,
        high,
        saturate_u8(magnitude),
        0,
        0,
    ]
}

/// Map an autocenter percentage (clamped to 100) onto the 16-bit magnitude.
pub fn autocenter_magnitude(autocenter: u8) -> u16 {
    let magnitude = 0xffff * u32::from(autocenter.min(100)) / 100;
    u16::try_from(magnitude).unwrap_or(u16::MAX)
}

/// Ordered reports that set the autocenter spring on one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocenterCommands {
    reports: [[u8; REPORT_LEN]; 3],
    len: usize,
}

impl AutocenterCommands {
    fn one(report: [u8; REPORT_LEN]) -> Self {
        Self {
            reports: [report, [0; REPORT_LEN], [0; REPORT_LEN]],
            len: 1,
        }
    }

    pub fn as_slice(&self) -> &[[u8; REPORT_LEN]] {
        self.reports.get(..self.len).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8; REPORT_LEN]> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Reports that set the autocenter of `model` to `autocenter` percent.
pub fn autocenter_commands(model: LogitechModel, autocenter: u8) -> AutocenterCommands {
    if model.is_ffex() {
        return AutocenterCommands::one(build_ffex_autocenter_report(autocenter));
    }

    let magnitude = autocenter_magnitude(autocenter);
    if magnitude == 0 {
        return AutocenterCommands::one(build_autocenter_disable_report());
    }

    AutocenterCommands {
        reports: [
            build_autocenter_disable_report(),
            build_autocenter_strength_report(magnitude),
            build_autocenter_enable_report(),
        ],
        len: 3,
    }
}

fn saturate_u8(x: u32) -> u8 {
    u8::try_from(x).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_loop_report() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(build_fixed_loop_report(false), [0x0d, 0, 0, 0, 0, 0, 0]);
        assert_eq!(build_fixed_loop_report(true), [0x0d, 1, 0, 0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_autocenter_magnitude() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(autocenter_magnitude(0), 0);
        assert_eq!(autocenter_magnitude(50), 32767);
        assert_eq!(autocenter_magnitude(100), 0xffff);
        assert_eq!(autocenter_magnitude(250), 0xffff);
        Ok(())
    }

    #[test]
    fn test_strength_report_full_scale() -> Result<(), Box<dyn std::error::Error>> {
        let r = build_autocenter_strength_report(0xffff);
        assert_eq!(r, [0xfe, 0x0d, 0x07, 0x07, 0xff, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_strength_report_below_knee() -> Result<(), Box<dyn std::error::Error>> {
        let r = build_autocenter_strength_report(32767);
        assert_eq!(r, [0xfe, 0x0d, 0x04, 0x04, 0x5f, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_ffex_zero_autocenter() -> Result<(), Box<dyn std::error::Error>> {
        let cmds = autocenter_commands(LogitechModel::FormulaForceEx, 0);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds.as_slice(), &[[0xfe, 0x03, 0, 0, 0, 0, 0]]);
        Ok(())
    }

    #[test]
    fn test_standard_zero_autocenter_only_disables() -> Result<(), Box<dyn std::error::Error>> {
        let cmds = autocenter_commands(LogitechModel::G29, 0);
        assert_eq!(cmds.as_slice(), &[[0xf5, 0, 0, 0, 0, 0, 0]]);
        Ok(())
    }

    #[test]
    fn test_standard_autocenter_sequence() -> Result<(), Box<dyn std::error::Error>> {
        let cmds = autocenter_commands(LogitechModel::G27, 100);
        let ops: Vec<u8> = cmds.iter().map(|r| r[0]).collect();
        assert_eq!(ops, vec![0xf5, 0xfe, 0x14]);
        assert_eq!(cmds.as_slice()[1], build_autocenter_strength_report(0xffff));
        Ok(())
    }
}
