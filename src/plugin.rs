use std::path::PathBuf;

use bevy::ecs::schedule::{InternedScheduleLabel, ScheduleLabel};
use bevy::prelude::*;

use crate::config::{error_chain, FlightAssistConfig};
use crate::controller::{FlightContext, FlightController};
use crate::gauges::FlightGauges;
use crate::preferences::{FlightEntityId, GaugePreferences, MemoryPreferenceStore, PreferenceStore};
use crate::{FlightAssistPipelineStages, FlightAssistSystemSet, FlightMotor, FlightSensors};

/// Runs [`FlightController`]s in the ECS.
///
/// The host is expected to:
///
/// * Spawn flying entities with a [`FlightController`] and a [`FlightEntityId`]. The other flight
///   components are added automatically.
/// * Update [`FlightSensors`] in [`FlightAssistPipelineStages::Sensors`].
/// * Send [`FlightGesture`] events before [`FlightAssistPipelineStages::Gestures`].
/// * Apply [`FlightMotor`] and display [`FlightGauges`] in [`FlightAssistPipelineStages::Motors`].
///
/// The configuration is the [`FlightAssistConfig`] resource and preferences are kept in the
/// [`FlightPreferenceStorage`] resource. Both get defaults unless inserted before the plugin.
pub struct FlightAssistPlugin {
    schedule: InternedScheduleLabel,
}

impl FlightAssistPlugin {
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for FlightAssistPlugin {
    fn default() -> Self {
        Self::new(Update)
    }
}

impl Plugin for FlightAssistPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            self.schedule,
            (
                FlightAssistPipelineStages::Sensors,
                FlightAssistPipelineStages::Gestures,
                FlightAssistPipelineStages::Logic,
                FlightAssistPipelineStages::Motors,
            )
                .chain()
                .in_set(FlightAssistSystemSet),
        );
        app.init_resource::<FlightAssistConfig>();
        app.init_resource::<FlightPreferenceStorage>();
        app.add_event::<FlightGesture>();
        app.add_event::<ReloadFlightAssistConfig>();
        app.add_systems(
            self.schedule,
            (reset_motors_system, handle_gestures_system)
                .chain()
                .in_set(FlightAssistPipelineStages::Gestures),
        );
        app.add_systems(
            self.schedule,
            (reload_config_system, apply_controller_system)
                .chain()
                .in_set(FlightAssistPipelineStages::Logic),
        );
        app.add_systems(Last, save_preferences_on_exit_system);
        app.add_observer(load_preferences_on_join);
        app.add_observer(save_preferences_on_leave);
    }
}

/// A discrete input from a flying entity.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FlightGesture {
    pub entity: Entity,
    pub kind: FlightGestureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightGestureKind {
    /// The entity started crouching. Two of these on the ground in quick succession take off.
    Pulse,
    /// The entity used a launch item in mid-air.
    AssistedTakeoff { feet_passable: bool },
}

/// Reload [`FlightAssistConfig`] from [`FlightAssistConfigPath`].
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ReloadFlightAssistConfig;

/// The settings file [`ReloadFlightAssistConfig`] reads.
#[derive(Resource, Debug, Clone)]
pub struct FlightAssistConfigPath(pub PathBuf);

/// The [`PreferenceStore`] used when flying entities are spawned and despawned.
///
/// Defaults to a [`MemoryPreferenceStore`].
#[derive(Resource)]
pub struct FlightPreferenceStorage(pub Box<dyn PreferenceStore>);

impl FlightPreferenceStorage {
    pub fn new(store: impl PreferenceStore) -> Self {
        Self(Box::new(store))
    }

    fn flush(&mut self) {
        if let Err(err) = self.0.flush() {
            warn!("{err}: {}", error_chain(&err));
        }
    }
}

impl Default for FlightPreferenceStorage {
    fn default() -> Self {
        Self::new(MemoryPreferenceStore::default())
    }
}

fn reset_motors_system(mut query: Query<&mut FlightMotor>) {
    for mut motor in query.iter_mut() {
        motor.set_if_neq(FlightMotor::default());
    }
}

fn handle_gestures_system(
    time: Res<Time>,
    config: Res<FlightAssistConfig>,
    mut gestures: EventReader<FlightGesture>,
    mut query: Query<(&mut FlightController, &FlightSensors, &mut FlightMotor)>,
) {
    for gesture in gestures.read() {
        let Ok((mut controller, sensors, mut motor)) = query.get_mut(gesture.entity) else {
            continue;
        };
        let ctx = FlightContext {
            now: time.elapsed(),
            config: &config,
            sensors,
        };
        match gesture.kind {
            FlightGestureKind::Pulse => {
                controller.on_activation_gesture(ctx, &mut motor);
            }
            FlightGestureKind::AssistedTakeoff { feet_passable } => {
                controller.on_assisted_takeoff(ctx, feet_passable, &mut motor);
            }
        }
    }
}

fn reload_config_system(
    mut requests: EventReader<ReloadFlightAssistConfig>,
    path: Option<Res<FlightAssistConfigPath>>,
    mut config: ResMut<FlightAssistConfig>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();
    let Some(path) = path else {
        warn!("Flight assist reload requested, but there is no FlightAssistConfigPath");
        return;
    };
    config.reload_or_keep(&path.0);
}

fn apply_controller_system(
    time: Res<Time>,
    config: Res<FlightAssistConfig>,
    mut query: Query<(
        &mut FlightController,
        &FlightSensors,
        &GaugePreferences,
        &mut FlightMotor,
        &mut FlightGauges,
    )>,
) {
    let now = time.elapsed();
    for (mut controller, sensors, preferences, mut motor, mut gauges) in query.iter_mut() {
        controller.on_tick(
            FlightContext {
                now,
                config: &config,
                sensors,
            },
            preferences,
            &mut motor,
            &mut gauges,
        );
    }
}

fn load_preferences_on_join(
    trigger: Trigger<OnAdd, FlightController>,
    mut query: Query<(Option<&FlightEntityId>, &mut GaugePreferences)>,
    storage: Res<FlightPreferenceStorage>,
) {
    let Ok((id, mut preferences)) = query.get_mut(trigger.target()) else {
        return;
    };
    let Some(id) = id else {
        debug!(
            "Flight controller on {} has no FlightEntityId, its gauge preferences will not persist",
            trigger.target()
        );
        return;
    };
    if let Some(stored) = storage.0.load(*id) {
        *preferences = stored;
    }
}

fn save_preferences_on_leave(
    trigger: Trigger<OnRemove, FlightController>,
    query: Query<(&FlightEntityId, &GaugePreferences)>,
    mut storage: ResMut<FlightPreferenceStorage>,
) {
    let Ok((id, preferences)) = query.get(trigger.target()) else {
        return;
    };
    storage.0.save(*id, *preferences);
    storage.flush();
}

fn save_preferences_on_exit_system(
    mut exits: EventReader<AppExit>,
    query: Query<(&FlightEntityId, &GaugePreferences), With<FlightController>>,
    mut storage: ResMut<FlightPreferenceStorage>,
) {
    if exits.is_empty() {
        return;
    }
    exits.clear();
    for (id, preferences) in query.iter() {
        storage.0.save(*id, *preferences);
    }
    storage.flush();
}
