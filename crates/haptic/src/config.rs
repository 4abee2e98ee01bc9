//! Settings of the generic haptic layer.

/// Ceiling applied to every application gain, in percent.
pub const ENV_GAIN_MAX: &str = "HIDHAPTIC_GAIN_MAX";

/// Generic layer settings.
///
/// # Examples
///
/// ```
/// use hidhaptic::HapticConfig;
///
/// let config = HapticConfig::from_lookup(|_| Some("80".to_string()));
/// assert_eq!(config.scale_gain(50), 40);
/// assert_eq!(HapticConfig::default().scale_gain(50), 50);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HapticConfig {
    /// Gain ceiling in percent, `None` leaves the gain untouched.
    pub gain_max: Option<u8>,
}

impl HapticConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the settings through `lookup`.
    ///
    /// The ceiling is clamped into `0..=100`. An unparsable value counts as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let gain_max = lookup(ENV_GAIN_MAX)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|v| v.clamp(0, 100))
            .and_then(|v| u8::try_from(v).ok());
        Self { gain_max }
    }

    pub fn with_gain_max(mut self, gain_max: Option<u8>) -> Self {
        self.gain_max = gain_max.map(|g| g.min(100));
        self
    }

    /// Scale an application gain in percent linearly by the ceiling.
    pub fn scale_gain(&self, gain: i32) -> i32 {
        match self.gain_max {
            Some(max) => gain * i32::from(max) / 100,
            None => gain,
        }
    }
}
