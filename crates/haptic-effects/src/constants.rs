//! Haptic constants and limits

/// Replay length meaning "play until stopped"
pub const HAPTIC_INFINITY: u32 = u32::MAX;

/// Device angles span `[0, 0x10000)` for one full turn
pub const DEVICE_ANGLE_FULL_TURN: u32 = 0x10000;

/// Polar and spherical directions are given in hundredths of a degree
pub const DIRECTION_HUNDREDTHS_PER_TURN: i32 = 36000;

/// Number of axes a condition effect carries parameters for
pub const CONDITION_AXES: usize = 3;

/// Largest accepted gain or autocenter percentage
pub const MAX_PERCENT: i32 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEVICE_ANGLE_FULL_TURN, 65536);
        assert_eq!(DIRECTION_HUNDREDTHS_PER_TURN, 360 * 100);
        assert!(CONDITION_AXES >= 1);
    }
}
