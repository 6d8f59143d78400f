//! Driving the flight assist without the ECS.
//!
//! Hosts that keep their own entity bookkeeping (e.g. a game server reacting to player events)
//! implement nothing here. They own a [`FlightAssistRegistry`] and call into it through
//! [`FlightAssistPort`] from their event handlers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use crate::config::{error_chain, FlightAssistConfig};
use crate::controller::{FlightContext, FlightController, FlightPhase};
use crate::gauges::FlightGauges;
use crate::preferences::{FlightEntityId, GaugePreferences, GaugeSelection, PreferenceStore};
use crate::{FlightMotor, FlightSensors};

/// Everything the host should apply after one tick of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightTickOutput {
    pub motor: FlightMotor,
    pub gauges: FlightGauges,
    pub phase: FlightPhase,
}

/// The inbound operations of the flight assist.
///
/// Operations on an id that did not join (or already left) do nothing and return `None`.
pub trait FlightAssistPort {
    /// Start tracking an entity, restoring its gauge preferences.
    fn on_join(&mut self, id: FlightEntityId);

    /// Stop tracking an entity, persisting its gauge preferences.
    fn on_leave(&mut self, id: FlightEntityId);

    /// Run one simulation tick.
    fn on_tick(
        &mut self,
        id: FlightEntityId,
        now: Duration,
        sensors: &FlightSensors,
    ) -> Option<FlightTickOutput>;

    /// The entity started crouching.
    fn on_gesture(
        &mut self,
        id: FlightEntityId,
        now: Duration,
        sensors: &FlightSensors,
    ) -> Option<FlightMotor>;

    /// The entity used a launch item. `feet_passable` tells whether the block at its feet lets
    /// it glide (air or plants, but not liquids).
    fn on_assisted_takeoff(
        &mut self,
        id: FlightEntityId,
        now: Duration,
        sensors: &FlightSensors,
        feet_passable: bool,
    ) -> Option<FlightMotor>;

    /// Show, hide (`Some`) or toggle (`None`) gauges. Returns the updated preferences.
    fn set_gauge_visibility(
        &mut self,
        id: FlightEntityId,
        selection: GaugeSelection,
        visibility: Option<bool>,
    ) -> Option<GaugePreferences>;

    /// Replace the configuration from a settings file. On failure the current configuration
    /// stays in effect. Returns whether it was replaced.
    fn reload_config(&mut self, path: &Path) -> bool;

    /// Persist the preferences of every tracked entity.
    fn shutdown(&mut self);
}

/// State kept for one tracked entity.
#[derive(Debug, Default, Clone)]
pub struct FlightEntityState {
    pub controller: FlightController,
    pub preferences: GaugePreferences,
    pub gauges: FlightGauges,
}

/// A [`FlightAssistPort`] implementation that keeps all entities in a map.
pub struct FlightAssistRegistry<S: PreferenceStore> {
    entities: HashMap<FlightEntityId, FlightEntityState>,
    config: Arc<FlightAssistConfig>,
    store: S,
}

impl<S: PreferenceStore> FlightAssistRegistry<S> {
    pub fn new(config: FlightAssistConfig, store: S) -> Self {
        Self {
            entities: HashMap::new(),
            config: Arc::new(config),
            store,
        }
    }

    /// The configuration currently in effect. Holding on to it keeps it alive across reloads.
    pub fn config(&self) -> &Arc<FlightAssistConfig> {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entity(&self, id: FlightEntityId) -> Option<&FlightEntityState> {
        self.entities.get(&id)
    }

    pub fn is_tracked(&self, id: FlightEntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn flush_store(&mut self) {
        if let Err(err) = self.store.flush() {
            warn!("{err}: {}", error_chain(&err));
        }
    }
}

impl<S: PreferenceStore> FlightAssistPort for FlightAssistRegistry<S> {
    fn on_join(&mut self, id: FlightEntityId) {
        if self.entities.contains_key(&id) {
            debug!("Entity {id} joined twice");
            return;
        }
        let preferences = self.store.load(id).unwrap_or_default();
        self.entities.insert(
            id,
            FlightEntityState {
                preferences,
                ..Default::default()
            },
        );
    }

    fn on_leave(&mut self, id: FlightEntityId) {
        let Some(state) = self.entities.remove(&id) else {
            return;
        };
        self.store.save(id, state.preferences);
        self.flush_store();
    }

    fn on_tick(
        &mut self,
        id: FlightEntityId,
        now: Duration,
        sensors: &FlightSensors,
    ) -> Option<FlightTickOutput> {
        let state = self.entities.get_mut(&id)?;
        let mut motor = FlightMotor::default();
        state.controller.on_tick(
            FlightContext {
                now,
                config: &self.config,
                sensors,
            },
            &state.preferences,
            &mut motor,
            &mut state.gauges,
        );
        Some(FlightTickOutput {
            motor,
            gauges: state.gauges.clone(),
            phase: state.controller.phase(),
        })
    }

    fn on_gesture(
        &mut self,
        id: FlightEntityId,
        now: Duration,
        sensors: &FlightSensors,
    ) -> Option<FlightMotor> {
        let state = self.entities.get_mut(&id)?;
        let mut motor = FlightMotor::default();
        state.controller.on_activation_gesture(
            FlightContext {
                now,
                config: &self.config,
                sensors,
            },
            &mut motor,
        );
        Some(motor)
    }

    fn on_assisted_takeoff(
        &mut self,
        id: FlightEntityId,
        now: Duration,
        sensors: &FlightSensors,
        feet_passable: bool,
    ) -> Option<FlightMotor> {
        let state = self.entities.get_mut(&id)?;
        let mut motor = FlightMotor::default();
        state.controller.on_assisted_takeoff(
            FlightContext {
                now,
                config: &self.config,
                sensors,
            },
            feet_passable,
            &mut motor,
        );
        Some(motor)
    }

    fn set_gauge_visibility(
        &mut self,
        id: FlightEntityId,
        selection: GaugeSelection,
        visibility: Option<bool>,
    ) -> Option<GaugePreferences> {
        let state = self.entities.get_mut(&id)?;
        state.preferences.apply(selection, visibility);
        Some(state.preferences)
    }

    fn reload_config(&mut self, path: &Path) -> bool {
        // Clones when someone still holds the old configuration, so they keep seeing it whole.
        Arc::make_mut(&mut self.config).reload_or_keep(path)
    }

    fn shutdown(&mut self) {
        for (id, state) in self.entities.iter() {
            self.store.save(*id, state.preferences);
        }
        self.flush_store();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauges::GaugeKind;
    use crate::math::Vector3;
    use crate::preferences::MemoryPreferenceStore;
    use crate::EquipmentReading;

    fn registry() -> FlightAssistRegistry<MemoryPreferenceStore> {
        FlightAssistRegistry::new(FlightAssistConfig::default(), MemoryPreferenceStore::default())
    }

    #[test]
    fn unknown_entities_are_ignored() {
        let mut registry = registry();
        let id = FlightEntityId::new_random();
        let sensors = FlightSensors::default();
        assert_eq!(registry.on_tick(id, Duration::ZERO, &sensors), None);
        assert_eq!(registry.on_gesture(id, Duration::ZERO, &sensors), None);
        assert_eq!(
            registry.set_gauge_visibility(id, GaugeSelection::All, None),
            None
        );
        registry.on_leave(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn preferences_survive_leave_and_join() {
        let mut registry = registry();
        let id = FlightEntityId::new_random();
        registry.on_join(id);
        let preferences = registry
            .set_gauge_visibility(id, GaugeSelection::One(GaugeKind::Altitude), None)
            .expect("entity joined");
        assert!(!preferences.altitude);

        registry.on_leave(id);
        assert!(!registry.is_tracked(id));
        assert_eq!(registry.store().load(id), Some(preferences));

        registry.on_join(id);
        assert_eq!(
            registry.entity(id).map(|state| state.preferences),
            Some(preferences)
        );
    }

    #[test]
    fn shutdown_saves_everyone() {
        let mut registry = registry();
        let ids = [FlightEntityId::new_random(), FlightEntityId::new_random()];
        for id in ids {
            registry.on_join(id);
            registry.set_gauge_visibility(id, GaugeSelection::All, Some(false));
        }
        registry.shutdown();
        for id in ids {
            assert_eq!(
                registry.store().load(id).map(|preferences| preferences.speed),
                Some(false)
            );
        }
    }

    #[test]
    fn tick_reports_phase_and_gauges() {
        let mut registry = registry();
        let id = FlightEntityId::new_random();
        registry.on_join(id);
        let sensors = FlightSensors {
            translation: Vector3::new(0.0, 70.0, 0.0),
            on_ground: false,
            gliding: true,
            equipment: Some(EquipmentReading::new(0.5)),
            ..Default::default()
        };
        let output = registry
            .on_tick(id, Duration::ZERO, &sensors)
            .expect("entity joined");
        assert_eq!(output.phase, FlightPhase::Flying);
        assert!(output.motor.is_idle());
        assert_eq!(output.gauges.altitude.title, "Altitude: 70");
    }

    #[test]
    fn failed_reload_keeps_configuration() {
        let mut registry = registry();
        let before = Arc::clone(registry.config());
        assert!(!registry.reload_config(Path::new("/nonexistent/flight_assist.ron")));
        assert_eq!(registry.config().max_velocity, before.max_velocity);
    }
}
