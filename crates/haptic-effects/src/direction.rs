//! Effect direction and its projection onto the wheel axis.

use serde::{Deserialize, Serialize};

use crate::constants::{DEVICE_ANGLE_FULL_TURN, DIRECTION_HUNDREDTHS_PER_TURN};

/// Direction a force comes from.
///
/// Every encoding is reduced to a 16-bit device angle where `0x4000` points
/// east, along the wheel axis.
///
/// # Examples
///
/// ```
/// use hidhaptic_effects::Direction;
///
/// // 90 degrees polar is due east, full projection onto the wheel
/// let east = Direction::Polar { dir: 9000 };
/// assert_eq!(east.to_device_angle(), 0x4000);
/// assert!((east.projection_gain() - 1.0).abs() < 1e-9);
///
/// assert_eq!(Direction::SteeringAxis.to_device_angle(), 0x4000);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Direction {
    /// Hundredths of a degree, clockwise from north.
    Polar { dir: i32 },
    /// Hundredths of a degree, clockwise from east.
    Spherical { dir: i32 },
    /// Vector from the center: `x` grows east, `y` grows south.
    Cartesian { x: i32, y: i32 },
    /// Along the steering axis.
    #[default]
    SteeringAxis,
}

impl Direction {
    /// Convert to a device angle in `[0, 0x10000)`.
    pub fn to_device_angle(&self) -> u16 {
        match *self {
            Direction::Polar { dir } => hundredths_to_angle(dir),
            Direction::Spherical { dir } => hundredths_to_angle(dir.wrapping_add(9000)),
            Direction::Cartesian { x, y } => {
                if y == 0 {
                    if x >= 0 { 0x4000 } else { 0xC000 }
                } else if x == 0 {
                    if y >= 0 { 0x8000 } else { 0 }
                } else {
                    let radians = f64::from(y).atan2(f64::from(x));
                    // atan2 is within [-pi, pi], so the truncation fits i32
                    let hundredths = (radians * 18000.0 / std::f64::consts::PI) as i32;
                    hundredths_to_angle(hundredths + 45000)
                }
            }
            Direction::SteeringAxis => 0x4000,
        }
    }

    /// Share of a scalar force that lands on the wheel axis, in `[-1, 1]`.
    pub fn projection_gain(&self) -> f64 {
        projection_gain(self.to_device_angle())
    }
}

/// `sin` of a device angle, truncated to whole degrees first.
pub fn projection_gain(angle: u16) -> f64 {
    let degrees = u32::from(angle) * 360 / DEVICE_ANGLE_FULL_TURN;
    sin_deg(f64::from(degrees))
}

/// Sine of an angle in degrees.
pub fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn hundredths_to_angle(hundredths: i32) -> u16 {
    let wrapped = hundredths.rem_euclid(DIRECTION_HUNDREDTHS_PER_TURN);
    let angle = wrapped * 0x8000 / 18000;
    u16::try_from(angle).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_cardinals() {
        assert_eq!(Direction::Polar { dir: 0 }.to_device_angle(), 0);
        assert_eq!(Direction::Polar { dir: 9000 }.to_device_angle(), 0x4000);
        assert_eq!(Direction::Polar { dir: 18000 }.to_device_angle(), 0x8000);
        assert_eq!(Direction::Polar { dir: 27000 }.to_device_angle(), 0xC000);
        assert_eq!(Direction::Polar { dir: 36000 }.to_device_angle(), 0);
    }

    #[test]
    fn test_spherical_is_polar_plus_quarter() {
        for dir in [0, 4500, 9000, 27000, 35999] {
            assert_eq!(
                Direction::Spherical { dir }.to_device_angle(),
                Direction::Polar { dir: dir + 9000 }.to_device_angle()
            );
        }
    }

    #[test]
    fn test_cartesian_axes() {
        assert_eq!(Direction::Cartesian { x: 1, y: 0 }.to_device_angle(), 0x4000);
        assert_eq!(Direction::Cartesian { x: -1, y: 0 }.to_device_angle(), 0xC000);
        assert_eq!(Direction::Cartesian { x: 0, y: 1 }.to_device_angle(), 0x8000);
        assert_eq!(Direction::Cartesian { x: 0, y: -1 }.to_device_angle(), 0);
    }

    #[test]
    fn test_cartesian_diagonal() {
        // south-east: 45 degrees spherical, 135 polar
        let angle = i32::from(Direction::Cartesian { x: 1, y: 1 }.to_device_angle());
        let polar = i32::from(Direction::Polar { dir: 13500 }.to_device_angle());
        assert!((angle - polar).abs() <= 2, "{angle:#x} vs {polar:#x}");
    }

    #[test]
    fn test_projection_signs() {
        assert!((Direction::Polar { dir: 9000 }.projection_gain() - 1.0).abs() < 1e-9);
        assert!((Direction::Polar { dir: 27000 }.projection_gain() + 1.0).abs() < 1e-9);
        assert!(Direction::Polar { dir: 0 }.projection_gain().abs() < 1e-9);
    }

    #[test]
    fn test_negative_polar_wraps() {
        assert_eq!(
            Direction::Polar { dir: -9000 }.to_device_angle(),
            Direction::Polar { dir: 27000 }.to_device_angle()
        );
    }
}
