//! Unit tests for all error variants.
//!
//! Tests Display implementations, std::error::Error implementations,
//! and From conversions.

use hidhaptic_errors::{
    Result,
    common::{ErrorCategory, ErrorSeverity, HapticError},
    device::DeviceError,
    effect::EffectError,
};

mod device_error_tests {
    use super::*;

    #[test]
    fn test_all_variants_display() -> Result<()> {
        let variants = vec![
            DeviceError::unsupported(0x046d, 0xc24f),
            DeviceError::NotHidapi,
            DeviceError::NoDriver,
            DeviceError::transport("g29", "broken pipe"),
            DeviceError::initialization("g29", "slot init"),
            DeviceError::DeviceLost {
                device: "g29".into(),
                consecutive_failures: 250,
            },
            DeviceError::Unsupported { feature: "pause" },
        ];

        for variant in variants {
            assert!(
                !variant.to_string().is_empty(),
                "DeviceError variant should have display message"
            );
        }
        Ok(())
    }

    #[test]
    fn test_from_conversion() -> Result<()> {
        let err: HapticError = DeviceError::NotHidapi.into();
        assert!(matches!(err, HapticError::Device(DeviceError::NotHidapi)));
        assert_eq!(err.category(), ErrorCategory::Device);
        Ok(())
    }

    #[test]
    fn test_unsupported_shorthand() -> Result<()> {
        let err = HapticError::unsupported("resume");
        assert!(err.to_string().contains("resume"));
        assert_eq!(err.severity(), ErrorSeverity::Info);
        Ok(())
    }
}

mod effect_error_tests {
    use super::*;

    #[test]
    fn test_all_variants_display() -> Result<()> {
        let variants = vec![
            EffectError::UnsupportedEffect { kind: "inertia" },
            EffectError::invalid_parameter("period", "zero"),
            EffectError::TypeChanged {
                from: "constant",
                to: "ramp",
            },
            EffectError::SlotExhausted { capacity: 16 },
            EffectError::BadEffectId { id: -1 },
        ];

        for variant in variants {
            assert!(!variant.to_string().is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_unsupported_effect_names_kind() -> Result<()> {
        let err: HapticError = EffectError::UnsupportedEffect { kind: "inertia" }.into();
        assert!(err.to_string().contains("inertia"));
        assert_eq!(err.category(), ErrorCategory::Effect);
        Ok(())
    }

    #[test]
    fn test_question_mark_propagation() -> Result<()> {
        fn inner() -> Result<()> {
            Err(EffectError::BadEffectId { id: 16 })?;
            Ok(())
        }

        let err = inner().err();
        assert_eq!(
            err,
            Some(HapticError::Effect(EffectError::BadEffectId { id: 16 }))
        );
        Ok(())
    }
}
