use std::time::Duration;

use bevy::prelude::*;

use crate::acceleration::{apply_boost, engine_pitch, speed_fraction};
use crate::activation::ActivationDebouncer;
use crate::config::FlightAssistConfig;
use crate::gauges::FlightGauges;
use crate::gesture::GestureDebouncer;
use crate::math::{Float, Vector3};
use crate::preferences::GaugePreferences;
use crate::{FeedbackCue, FlightMotor, FlightSensors};

/// Everything the controller reads during one tick or one gesture.
#[derive(Clone, Copy)]
pub struct FlightContext<'a> {
    /// Host clock, sampled once per tick.
    pub now: Duration,
    pub config: &'a FlightAssistConfig,
    pub sensors: &'a FlightSensors,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightPhase {
    #[default]
    Grounded,
    /// Inside the forced-glide window that follows a takeoff.
    TakingOff,
    Flying,
    /// Airborne with equipment that is missing or worn out.
    Impaired,
}

impl FlightPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FlightPhase::Grounded => "Grounded",
            FlightPhase::TakingOff => "TakingOff",
            FlightPhase::Flying => "Flying",
            FlightPhase::Impaired => "Impaired",
        }
    }
}

/// The transient flight state of one entity.
///
/// Created when the entity joins and dropped when it leaves. The host drives it with
/// [`on_tick`](Self::on_tick) once per simulation tick and with
/// [`on_activation_gesture`](Self::on_activation_gesture) whenever the entity starts crouching.
/// Every request for the host ends up in the [`FlightMotor`] passed in, which the caller must
/// reset before each tick.
#[derive(Component, Debug, Default, Clone)]
#[require(FlightSensors, FlightMotor, FlightGauges, GaugePreferences)]
pub struct FlightController {
    phase: FlightPhase,
    gesture: GestureDebouncer,
    gauge_activation: ActivationDebouncer,
    takeoff_at: Option<Duration>,
    left_ground_since_takeoff: bool,
}

impl FlightController {
    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// When the latest takeoff was triggered.
    pub fn takeoff_at(&self) -> Option<Duration> {
        self.takeoff_at
    }

    /// Whether the entity has been gliding long enough for its gauges to show.
    pub fn gauges_armed(&self) -> bool {
        self.gauge_activation.is_armed()
    }

    /// Run one simulation tick.
    pub fn on_tick(
        &mut self,
        ctx: FlightContext,
        preferences: &GaugePreferences,
        motor: &mut FlightMotor,
        gauges: &mut FlightGauges,
    ) {
        self.update_phase(&ctx);

        if self.phase == FlightPhase::TakingOff {
            motor.glide = true;
        }

        // Lets an entity that lost its glide in mid-air glide again by crouching.
        let sensors = ctx.sensors;
        if sensors.sneaking && sensors.is_flight_capable() && !sensors.on_ground && !sensors.mounted
        {
            self.accelerate(&ctx, ctx.config.look_acceleration, motor);
            if self.phase == FlightPhase::TakingOff {
                self.phase = self.airborne_phase(&ctx);
            }
        }

        let armed = self.gauge_activation.update(
            sensors.gliding && self.phase != FlightPhase::Impaired,
            ctx.now,
            ctx.config.gauge_debounce,
        );
        gauges.update(ctx.config, sensors, preferences, armed);

        // Deliberately not debounced: damage applies on every tick spent above the threshold.
        if ctx.config.vacuum_enabled && ctx.config.vacuum_altitude <= sensors.translation.y {
            motor.damage += ctx.config.vacuum_damage;
            motor.deplete_air = true;
        }
    }

    /// Handle the start of a crouch, detecting double taps on the ground as takeoff requests.
    ///
    /// Taps only count while the entity is on the ground, flight capable and not already taking
    /// off. Other taps are dropped, not remembered. Returns whether a takeoff was triggered.
    pub fn on_activation_gesture(&mut self, ctx: FlightContext, motor: &mut FlightMotor) -> bool {
        let sensors = ctx.sensors;
        if !sensors.on_ground {
            self.gesture.clear();
            return false;
        }
        if !sensors.is_flight_capable() || self.in_takeoff_window(&ctx) {
            return false;
        }
        if !self
            .gesture
            .observe_pulse(ctx.now, ctx.config.takeoff_tap_window)
        {
            return false;
        }

        self.begin_takeoff(ctx.now, false);
        if !is_impaired(&ctx) {
            motor.velocity = Some(Vector3::Y * ctx.config.takeoff_vertical_acceleration);
        }
        self.accelerate(&ctx, ctx.config.takeoff_look_acceleration, motor);
        debug!("Double-tap takeoff at {:?}", ctx.now);
        true
    }

    /// Start gliding in mid-air when the entity uses a launch item.
    ///
    /// Requires functional equipment, no vehicle, and a passable block at the entity's feet
    /// (`feet_passable`, e.g. air or plants but not liquids). Returns whether gliding started.
    pub fn on_assisted_takeoff(
        &mut self,
        ctx: FlightContext,
        feet_passable: bool,
        motor: &mut FlightMotor,
    ) -> bool {
        let sensors = ctx.sensors;
        if sensors.on_ground || sensors.mounted || !feet_passable || is_impaired(&ctx) {
            return false;
        }
        self.begin_takeoff(ctx.now, true);
        motor.glide = true;
        debug!("Assisted takeoff at {:?}", ctx.now);
        true
    }

    fn begin_takeoff(&mut self, now: Duration, airborne: bool) {
        self.takeoff_at = Some(now);
        self.phase = FlightPhase::TakingOff;
        self.left_ground_since_takeoff = airborne;
    }

    fn in_takeoff_window(&self, ctx: &FlightContext) -> bool {
        self.phase == FlightPhase::TakingOff
            && self.takeoff_at.is_some_and(|takeoff_at| {
                takeoff_at <= ctx.now && ctx.now - takeoff_at < ctx.config.takeoff_glide
            })
    }

    fn update_phase(&mut self, ctx: &FlightContext) {
        let sensors = ctx.sensors;
        if !sensors.on_ground {
            // A tap from before leaving the ground must not pair with one after landing.
            self.gesture.clear();
        }

        if self.phase == FlightPhase::TakingOff {
            if !sensors.on_ground {
                self.left_ground_since_takeoff = true;
            }
            let landed = sensors.on_ground && self.left_ground_since_takeoff;
            if self.in_takeoff_window(ctx) && !landed {
                return;
            }
        }

        self.phase = if sensors.on_ground {
            FlightPhase::Grounded
        } else {
            self.airborne_phase(ctx)
        };
    }

    fn airborne_phase(&self, ctx: &FlightContext) -> FlightPhase {
        if is_impaired(ctx) {
            FlightPhase::Impaired
        } else {
            FlightPhase::Flying
        }
    }

    /// Apply power along the look direction.
    ///
    /// Functional equipment boosts the velocity (capped at the maximum) and forces gliding.
    /// Impaired equipment only produces the broken feedback cue, plus one tick of gliding if
    /// configured so.
    fn accelerate(&self, ctx: &FlightContext, magnitude: Float, motor: &mut FlightMotor) {
        let config = ctx.config;
        let look = ctx.sensors.look_direction;
        let velocity = motor.velocity.unwrap_or(ctx.sensors.velocity);

        // Based on the current (not boosted) speed.
        let pitch = engine_pitch(speed_fraction(velocity, look, config.max_velocity));

        if is_impaired(ctx) {
            motor.cue = Some(FeedbackCue::Broken { pitch });
            if config.broken_glide {
                motor.glide = true;
                motor.fall_distance_reduction += config.broken_glide_fall_reduction;
            }
        } else {
            motor.glide = true;
            motor.velocity = Some(apply_boost(velocity, look, magnitude, config.max_velocity));
            motor.cue = Some(FeedbackCue::Exhaust { pitch });
        }
    }
}

/// Missing equipment and unreadable condition count as broken.
fn is_impaired(ctx: &FlightContext) -> bool {
    match ctx.sensors.equipment {
        Some(equipment) if equipment.condition.is_finite() => {
            equipment.condition <= ctx.config.broken_condition_threshold
        }
        _ => true,
    }
}
