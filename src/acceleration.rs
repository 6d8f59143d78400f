//! Velocity arithmetic for powered flight.

use crate::math::{Float, Vector3};

/// Lowest engine feedback pitch, played at standstill.
pub const MIN_ENGINE_PITCH: Float = 0.5;
/// Highest engine feedback pitch, played at full speed along the look direction.
pub const MAX_ENGINE_PITCH: Float = 2.0;

/// Boost `velocity` along `look_direction` and cap the result at `max_speed`.
///
/// `look_direction` is expected to be a unit vector. If the boosted velocity is faster than
/// `max_speed` the whole vector is scaled down to exactly `max_speed`, so the direction is kept.
/// A non-positive (or non-finite) `max_speed`, or a non-finite result, yields zero velocity.
pub fn apply_boost(
    velocity: Vector3,
    look_direction: Vector3,
    boost: Float,
    max_speed: Float,
) -> Vector3 {
    if !(max_speed.is_finite() && 0.0 < max_speed) {
        return Vector3::ZERO;
    }
    let boosted = velocity + look_direction * boost;
    if !boosted.is_finite() {
        return Vector3::ZERO;
    }
    let speed = boosted.length();
    if max_speed < speed {
        boosted * (max_speed / speed)
    } else {
        boosted
    }
}

/// How fast the entity moves along its look direction, as a fraction of `max_speed`.
///
/// Moving away from the look direction counts as zero. This only feeds presentation (the engine
/// pitch) and never affects motion.
pub fn speed_fraction(velocity: Vector3, look_direction: Vector3, max_speed: Float) -> Float {
    if !(0.0 < max_speed)
        || velocity.length_squared() == 0.0
        || look_direction.length_squared() == 0.0
    {
        return 0.0;
    }
    let fraction = velocity.dot(look_direction).max(0.0) / max_speed;
    if fraction.is_finite() {
        fraction.min(1.0)
    } else {
        0.0
    }
}

/// Map a [`speed_fraction`] onto the engine feedback pitch range.
pub fn engine_pitch(speed_fraction: Float) -> Float {
    MIN_ENGINE_PITCH + (MAX_ENGINE_PITCH - MIN_ENGINE_PITCH) * speed_fraction.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: Float = 1e-4;

    #[test]
    fn clamps_to_exactly_max_speed_in_same_direction() {
        let look = Vector3::new(0.6, 0.0, 0.8);
        let result = apply_boost(look * 9.0, look, 5.0, 10.0);
        assert!((result.length() - 10.0).abs() < EPSILON);
        assert!(result.normalize().distance(look) < EPSILON);
    }

    #[test]
    fn below_cap_is_plain_addition() {
        let result = apply_boost(Vector3::new(1.0, 0.0, 0.0), Vector3::Y, 2.0, 10.0);
        assert_eq!(result, Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn clamps_the_vector_not_the_axes() {
        // Per-axis clamping would give (10, 10, 0).
        let result = apply_boost(Vector3::new(20.0, 0.0, 0.0), Vector3::Y, 20.0, 10.0);
        assert!((result.length() - 10.0).abs() < EPSILON);
        assert!((result.x - result.y).abs() < EPSILON);
    }

    #[test]
    fn never_exceeds_max_speed() {
        let directions = [
            Vector3::X,
            Vector3::NEG_Y,
            Vector3::new(1.0, 1.0, 1.0).normalize(),
            Vector3::ZERO,
        ];
        let velocities = [
            Vector3::ZERO,
            Vector3::new(3.0, -4.0, 0.0),
            Vector3::new(-100.0, 50.0, 25.0),
        ];
        for look in directions {
            for velocity in velocities {
                for boost in [0.0, 0.1, 5.0, 1000.0, -7.0] {
                    for max_speed in [0.5, 2.0, 10.0] {
                        let result = apply_boost(velocity, look, boost, max_speed);
                        assert!(
                            result.length() <= max_speed + EPSILON,
                            "{velocity} + {look} * {boost} gave {result}, more than {max_speed}",
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn degenerate_max_speed_stops_the_entity() {
        assert_eq!(apply_boost(Vector3::X, Vector3::X, 1.0, 0.0), Vector3::ZERO);
        assert_eq!(apply_boost(Vector3::X, Vector3::X, 1.0, -1.0), Vector3::ZERO);
        assert_eq!(
            apply_boost(Vector3::X, Vector3::X, Float::NAN, 5.0),
            Vector3::ZERO
        );
    }

    #[test]
    fn speed_fraction_uses_only_forward_component() {
        let look = Vector3::Z;
        assert!((speed_fraction(Vector3::new(3.0, 0.0, 2.0), look, 4.0) - 0.5).abs() < EPSILON);
        assert_eq!(speed_fraction(Vector3::new(0.0, 0.0, -2.0), look, 4.0), 0.0);
        assert_eq!(speed_fraction(Vector3::new(0.0, 0.0, 40.0), look, 4.0), 1.0);
    }

    #[test]
    fn speed_fraction_of_degenerate_input_is_zero() {
        assert_eq!(speed_fraction(Vector3::ZERO, Vector3::Z, 4.0), 0.0);
        assert_eq!(speed_fraction(Vector3::Z, Vector3::ZERO, 4.0), 0.0);
        assert_eq!(speed_fraction(Vector3::Z, Vector3::Z, 0.0), 0.0);
    }

    #[test]
    fn engine_pitch_spans_feedback_range() {
        assert_eq!(engine_pitch(0.0), MIN_ENGINE_PITCH);
        assert_eq!(engine_pitch(1.0), MAX_ENGINE_PITCH);
        assert_eq!(engine_pitch(7.0), MAX_ENGINE_PITCH);
        assert!((engine_pitch(0.5) - 1.25).abs() < EPSILON);
    }
}
