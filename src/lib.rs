//! # Flight assist and telemetry for gliding entities
//!
//! Adds powered flight on top of a host's gliding simulation. A double tap of the crouch key on
//! the ground launches the entity, crouching in mid-air boosts it along its look direction, and
//! four telemetry gauges (altitude, speed, wing condition and pitch) are shown once the entity has
//! been gliding for a while. Worn out equipment makes the engine sputter instead of pushing.
//!
//! The crate never moves anything by itself. The host describes the entity in
//! [`FlightSensors`], and reads back what should happen from [`FlightMotor`] and
//! [`FlightGauges`](gauges::FlightGauges).
//!
//! There are two ways to drive it:
//!
//! * Inside Bevy, add [`FlightAssistPlugin`](plugin::FlightAssistPlugin) and spawn entities with a
//!   [`FlightController`](controller::FlightController).
//! * Elsewhere, own a [`FlightAssistRegistry`](port::FlightAssistRegistry) and call it through the
//!   [`FlightAssistPort`](port::FlightAssistPort) trait.
//!
//! Configuration is loaded from RON files into a
//! [`FlightAssistConfig`](config::FlightAssistConfig):
//!
//! ```no_run
//! use bevy_flight_assist::prelude::*;
//!
//! let config = FlightAssistConfig::load("flight_assist.ron").unwrap_or_default();
//! let mut registry = FlightAssistRegistry::new(config, MemoryPreferenceStore::default());
//! let id = FlightEntityId::new_random();
//! registry.on_join(id);
//! ```
pub mod acceleration;
pub mod activation;
pub mod band_map;
pub mod config;
pub mod controller;
pub mod gauges;
pub mod gesture;
pub mod plugin;
pub mod port;
pub mod preferences;

pub mod prelude;

pub use bevy_flight_assist_host_layer::data_for_host::*;
pub use bevy_flight_assist_host_layer::math;
pub use bevy_flight_assist_host_layer::{FlightAssistPipelineStages, FlightAssistSystemSet};
