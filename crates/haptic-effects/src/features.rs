//! Device feature flags.

use bitflags::bitflags;

bitflags! {
    /// Capabilities a haptic device reports.
    ///
    /// Effect kinds occupy the low 16 bits, device-level controls the high
    /// bits. The layout matches the generic haptic API so the raw value can
    /// be handed to callers unchanged.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HapticFeatures: u32 {
        const CONSTANT = 1 << 0;
        const SINE = 1 << 1;
        const SQUARE = 1 << 2;
        const TRIANGLE = 1 << 3;
        const SAWTOOTHUP = 1 << 4;
        const SAWTOOTHDOWN = 1 << 5;
        const RAMP = 1 << 6;
        const SPRING = 1 << 7;
        const DAMPER = 1 << 8;
        const INERTIA = 1 << 9;
        const FRICTION = 1 << 10;
        const LEFTRIGHT = 1 << 11;
        /// Device gain can be set.
        const GAIN = 1 << 16;
        /// Device autocenter can be set.
        const AUTOCENTER = 1 << 17;
        /// Effect status can be queried.
        const STATUS = 1 << 18;
        /// Playback can be paused.
        const PAUSE = 1 << 19;
    }
}

impl HapticFeatures {
    /// Every periodic waveform bit.
    pub const PERIODIC: HapticFeatures = HapticFeatures::SINE
        .union(HapticFeatures::SQUARE)
        .union(HapticFeatures::TRIANGLE)
        .union(HapticFeatures::SAWTOOTHUP)
        .union(HapticFeatures::SAWTOOTHDOWN);

    /// Feature bits that name effect kinds.
    pub fn effect_kinds(self) -> HapticFeatures {
        self & HapticFeatures::from_bits_truncate(0xffff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EffectKind;

    #[test]
    fn test_bit_layout() {
        assert_eq!(HapticFeatures::CONSTANT.bits(), 0x1);
        assert_eq!(HapticFeatures::FRICTION.bits(), 0x400);
        assert_eq!(HapticFeatures::GAIN.bits(), 0x1_0000);
        assert_eq!(HapticFeatures::PAUSE.bits(), 0x8_0000);
    }

    #[test]
    fn test_every_kind_has_a_distinct_bit() {
        let mut seen = HapticFeatures::empty();
        for kind in EffectKind::ALL {
            let bit = kind.feature();
            assert_eq!(bit.bits().count_ones(), 1, "{kind}");
            assert!(!seen.intersects(bit), "{kind} reuses a bit");
            seen |= bit;
        }
        assert_eq!(seen, seen.effect_kinds());
    }

    #[test]
    fn test_periodic_group() {
        assert!(HapticFeatures::PERIODIC.contains(HapticFeatures::SQUARE));
        assert!(!HapticFeatures::PERIODIC.contains(HapticFeatures::RAMP));
        let device = HapticFeatures::CONSTANT | HapticFeatures::GAIN;
        assert_eq!(device.effect_kinds(), HapticFeatures::CONSTANT);
    }
}
