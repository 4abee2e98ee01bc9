//! Device configuration read at open time.

/// Spring intensity cap in percent.
pub const ENV_SPRING: &str = "HIDHAPTIC_LG4FF_SPRING";
/// Damper intensity cap in percent.
pub const ENV_DAMPER: &str = "HIDHAPTIC_LG4FF_DAMPER";
/// Friction intensity cap in percent.
pub const ENV_FRICTION: &str = "HIDHAPTIC_LG4FF_FRICTION";
/// Persistent device gain, 0 to 65535.
pub const ENV_GAIN: &str = "HIDHAPTIC_LG4FF_GAIN";

pub const DEFAULT_CONDITION_LEVEL: u8 = 30;
pub const MAX_CONDITION_LEVEL: u8 = 100;
pub const DEFAULT_GAIN: u16 = u16::MAX;

/// Intensity caps and device gain for one lg4ff device.
///
/// # Examples
///
/// ```
/// use hidhaptic_lg4ff::Lg4ffConfig;
///
/// let config = Lg4ffConfig::from_lookup(|name| match name {
///     "HIDHAPTIC_LG4FF_SPRING" => Some("150".to_string()),
///     "HIDHAPTIC_LG4FF_GAIN" => Some("32768".to_string()),
///     _ => None,
/// });
/// assert_eq!(config.spring_level, 100);
/// assert_eq!(config.damper_level, 30);
/// assert_eq!(config.gain, 32768);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lg4ffConfig {
    /// Percentage applied to spring saturation.
    pub spring_level: u8,
    /// Percentage applied to damper saturation.
    pub damper_level: u8,
    /// Percentage applied to friction saturation.
    pub friction_level: u8,
    /// Device gain composed with the application gain on every tick.
    pub gain: u16,
}

impl Default for Lg4ffConfig {
    fn default() -> Self {
        Self {
            spring_level: DEFAULT_CONDITION_LEVEL,
            damper_level: DEFAULT_CONDITION_LEVEL,
            friction_level: DEFAULT_CONDITION_LEVEL,
            gain: DEFAULT_GAIN,
        }
    }
}

impl Lg4ffConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// Values outside their range are clamped. Missing or unparsable values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let level = |name: &str| {
            lookup(name)
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(|v| v.clamp(0, i64::from(MAX_CONDITION_LEVEL)))
                .and_then(|v| u8::try_from(v).ok())
                .unwrap_or(DEFAULT_CONDITION_LEVEL)
        };

        let gain = lookup(ENV_GAIN)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|v| v.clamp(0, i64::from(u16::MAX)))
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_GAIN);

        Self {
            spring_level: level(ENV_SPRING),
            damper_level: level(ENV_DAMPER),
            friction_level: level(ENV_FRICTION),
            gain,
        }
    }

    pub fn with_spring_level(mut self, level: u8) -> Self {
        self.spring_level = level.min(MAX_CONDITION_LEVEL);
        self
    }

    pub fn with_damper_level(mut self, level: u8) -> Self {
        self.damper_level = level.min(MAX_CONDITION_LEVEL);
        self
    }

    pub fn with_friction_level(mut self, level: u8) -> Self {
        self.friction_level = level.min(MAX_CONDITION_LEVEL);
        self
    }

    pub fn with_gain(mut self, gain: u16) -> Self {
        self.gain = gain;
        self
    }
}
