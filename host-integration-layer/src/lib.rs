use bevy::prelude::*;

pub mod data_for_host;
pub mod math;

/// Umbrella system set for [`FlightAssistPipelineStages`].
///
/// Hosts that pause their simulation are responsible for preventing this entire system set from
/// running while paused.
#[derive(SystemSet, Clone, PartialEq, Eq, Debug, Hash)]
pub struct FlightAssistSystemSet;

/// The various stages of the flight assist pipeline.
#[derive(SystemSet, Clone, PartialEq, Eq, Debug, Hash)]
pub enum FlightAssistPipelineStages {
    /// The host writes [`FlightSensors`](data_for_host::FlightSensors).
    Sensors,
    /// Motors are cleared and gesture events are handled.
    Gestures,
    /// The per-tick controller logic runs and gauges are recomputed.
    Logic,
    /// The host reads [`FlightMotor`](data_for_host::FlightMotor) and applies it.
    Motors,
}
