//! Shortest-path angular error for servoing rotating actuators.
//!
//! Everything in here works in radians. Operator-facing values in degrees are
//! converted once at the boundary with [`degrees_to_radians`].

use core::f64::consts::{PI, TAU};

/// One full revolution in radians.
pub const FULL_TURN: f64 = TAU;

/// Half a revolution in radians.
pub const HALF_TURN: f64 = PI;

/// Convert degrees to radians as `value / 360 * 2π`
pub fn degrees_to_radians(deg: f64) -> f64 {
    deg / 360.0 * FULL_TURN
}

/// Convert radians to degrees
pub fn radians_to_degrees(rad: f64) -> f64 {
    rad / FULL_TURN * 360.0
}

/// Bring an angle into [0, 2π).
///
/// Setpoints go through this before they reach [`normalize_error`], whose
/// single wrap step assumes both operands lie within one turn.
pub fn reduce(angle: f64) -> f64 {
    angle.rem_euclid(FULL_TURN)
}

/// Mirror a target for an actuator mounted in the opposite orientation.
pub fn invert(desired: f64) -> f64 {
    FULL_TURN - desired
}

/// Wrap a raw difference into (-π, π] with a single correction.
///
/// Inputs more than one turn outside the canonical range are not fully
/// reduced. Measured angles and setpoints both stay within one turn, so a
/// single step is enough.
pub fn wrap(diff: f64) -> f64 {
    if diff > HALF_TURN {
        diff - FULL_TURN
    } else if diff <= -HALF_TURN {
        diff + FULL_TURN
    } else {
        diff
    }
}

/// Signed shortest-path error from `current` to `desired`.
///
/// When `inverted` is set the target is mirrored first, so an inverted
/// actuator tracks `FULL_TURN - desired`. Positive results mean the actuator
/// should turn in the positive direction.
pub fn normalize_error(desired: f64, current: f64, inverted: bool) -> f64 {
    let desired = if inverted { invert(desired) } else { desired };
    wrap(desired - current)
}
