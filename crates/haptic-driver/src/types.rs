//! Identifiers and status values shared by every haptic driver.

use serde::{Deserialize, Serialize};

/// Handle of an effect uploaded to a device.
///
/// Ids are small indices into the device's effect table. They are only
/// meaningful for the device that returned them.
///
/// # Examples
///
/// ```
/// use hidhaptic_driver::EffectId;
///
/// let id = EffectId::new(3);
/// assert_eq!(id.index(16), Some(3));
/// assert_eq!(EffectId::new(16).index(16), None);
/// assert_eq!(EffectId::new(-1).index(16), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(i32);

impl EffectId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Table index if the id is within `0..capacity`.
    pub fn index(self, capacity: usize) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|&i| i < capacity)
    }
}

impl From<usize> for EffectId {
    fn from(index: usize) -> Self {
        Self(i32::try_from(index).unwrap_or(i32::MAX))
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an effect is currently started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectStatus {
    Stopped,
    Playing,
}

impl EffectStatus {
    pub fn is_playing(self) -> bool {
        self == EffectStatus::Playing
    }
}
