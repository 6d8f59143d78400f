use crate::math::{Float, Vector3};
use bevy::prelude::*;

/// Snapshot of everything the controller needs to know about an entity for one tick.
///
/// The host is responsible for updating this component during
/// [`FlightAssistPipelineStages::Sensors`](crate::FlightAssistPipelineStages::Sensors). Hosts that
/// do not use the ECS pass the same struct to the inbound port directly.
#[derive(Component, Debug, Clone)]
pub struct FlightSensors {
    pub translation: Vector3,
    pub velocity: Vector3,
    /// Unit vector the entity is looking along. The controller accelerates in this direction.
    pub look_direction: Vector3,
    pub on_ground: bool,
    /// Whether the host currently simulates the entity as gliding.
    pub gliding: bool,
    /// Whether the crouch key is held.
    pub sneaking: bool,
    /// The entity rides a vehicle or is otherwise carried, and its own lift must not be boosted.
    pub mounted: bool,
    /// The flight equipment worn by the entity, or `None` if nothing is worn.
    pub equipment: Option<EquipmentReading>,
    pub permissions: FlightPermissions,
}

impl Default for FlightSensors {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            velocity: Vector3::ZERO,
            look_direction: Vector3::NEG_Z,
            on_ground: true,
            gliding: false,
            sneaking: false,
            mounted: false,
            equipment: None,
            permissions: Default::default(),
        }
    }
}

impl FlightSensors {
    /// Wearing flight equipment (even broken) and permitted to use powered flight.
    pub fn is_flight_capable(&self) -> bool {
        self.equipment.is_some() && self.permissions.fly
    }
}

/// Condition of the worn flight equipment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentReading {
    /// Remaining durability as a fraction: `1.0` is brand new and `0.0` is worn out.
    pub condition: Float,
}

impl EquipmentReading {
    pub fn new(condition: Float) -> Self {
        Self { condition }
    }

    /// Build a reading from the remaining and maximal durability units.
    pub fn from_durability(remaining: u32, max: u32) -> Self {
        let condition = if max == 0 {
            0.0
        } else {
            remaining.min(max) as Float / max as Float
        };
        Self { condition }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightPermissions {
    /// Permission for powered flight (double-tap takeoff and in-flight boosts).
    pub fly: bool,
}

impl Default for FlightPermissions {
    fn default() -> Self {
        Self { fly: true }
    }
}

/// Audible/visual feedback the host should play when power is applied.
///
/// `pitch` is in the `[0.5, 2.0]` range and rises with the speed along the look direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackCue {
    /// Power applied to functional equipment: engine sound and exhaust trail.
    Exhaust { pitch: Float },
    /// Power requested from broken equipment: sputtering sound, no motion.
    Broken { pitch: Float },
}

/// Requests from the controller to the host for the current tick.
///
/// The host is responsible for reading this component during
/// [`FlightAssistPipelineStages::Motors`](crate::FlightAssistPipelineStages::Motors) and applying
/// it. It is reset before the gestures of every tick are handled, so a default motor means "leave the
/// entity alone".
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct FlightMotor {
    /// Replace the entity's velocity with this value.
    pub velocity: Option<Vector3>,
    /// Set the entity's gliding flag.
    pub glide: bool,
    /// Damage to inflict this tick.
    pub damage: Float,
    /// Set the entity's remaining air to zero.
    pub deplete_air: bool,
    /// Subtract this from the entity's accumulated fall distance (never below zero).
    pub fall_distance_reduction: Float,
    pub cue: Option<FeedbackCue>,
}

impl FlightMotor {
    /// Whether the motor requests anything at all.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
