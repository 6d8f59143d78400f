use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;

use crate::band_map::GaugeColour;
use crate::config::{FlightAssistConfig, GaugeConfig};
use crate::math::{Float, Vector3};
use crate::preferences::GaugePreferences;
use crate::FlightSensors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeKind {
    Altitude,
    Speed,
    Wings,
    Pitch,
}

impl GaugeKind {
    pub const ALL: [GaugeKind; 4] = [
        GaugeKind::Altitude,
        GaugeKind::Speed,
        GaugeKind::Wings,
        GaugeKind::Pitch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GaugeKind::Altitude => "altitude",
            GaugeKind::Speed => "speed",
            GaugeKind::Wings => "wings",
            GaugeKind::Pitch => "pitch",
        }
    }
}

impl fmt::Display for GaugeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("the gauge name must be 'altitude', 'speed', 'wings' or 'pitch', not {0:?}")]
pub struct UnknownGaugeKind(pub String);

impl FromStr for GaugeKind {
    type Err = UnknownGaugeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownGaugeKind(s.to_owned()))
    }
}

/// What the host should display for one gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    pub visible: bool,
    pub colour: GaugeColour,
    /// The formatted reading, e.g. `Altitude: 72`.
    pub title: String,
    /// How full the bar is, in `[0, 1]`.
    pub progress: Float,
}

impl GaugeReading {
    fn hidden(kind: GaugeKind) -> Self {
        let title = match kind {
            GaugeKind::Altitude => "Altitude",
            GaugeKind::Speed => "Speed",
            GaugeKind::Wings => "Wings",
            GaugeKind::Pitch => "Pitch",
        };
        Self {
            visible: false,
            colour: GaugeColour::Blue,
            title: title.to_owned(),
            progress: 0.0,
        }
    }
}

/// The four telemetry gauges of a flying entity.
///
/// The controller rewrites this every tick. Gauges that are hidden keep their last reading so the
/// host can fade them out without flicker.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FlightGauges {
    pub altitude: GaugeReading,
    pub speed: GaugeReading,
    pub wings: GaugeReading,
    pub pitch: GaugeReading,
}

impl Default for FlightGauges {
    fn default() -> Self {
        Self {
            altitude: GaugeReading::hidden(GaugeKind::Altitude),
            speed: GaugeReading::hidden(GaugeKind::Speed),
            wings: GaugeReading::hidden(GaugeKind::Wings),
            pitch: GaugeReading::hidden(GaugeKind::Pitch),
        }
    }
}

impl FlightGauges {
    pub fn get(&self, kind: GaugeKind) -> &GaugeReading {
        match kind {
            GaugeKind::Altitude => &self.altitude,
            GaugeKind::Speed => &self.speed,
            GaugeKind::Wings => &self.wings,
            GaugeKind::Pitch => &self.pitch,
        }
    }

    fn get_mut(&mut self, kind: GaugeKind) -> &mut GaugeReading {
        match kind {
            GaugeKind::Altitude => &mut self.altitude,
            GaugeKind::Speed => &mut self.speed,
            GaugeKind::Wings => &mut self.wings,
            GaugeKind::Pitch => &mut self.pitch,
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = GaugeKind> + '_ {
        GaugeKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).visible)
    }

    /// Recompute all gauges from a sensor snapshot.
    ///
    /// `armed` is the debounced "has been gliding long enough" state. A gauge is visible only if
    /// it is enabled in the configuration, the entity wants to see it, `armed` is set and the
    /// gauge has data to show.
    pub fn update(
        &mut self,
        config: &FlightAssistConfig,
        sensors: &FlightSensors,
        preferences: &GaugePreferences,
        armed: bool,
    ) {
        let altitude = sensors.translation.y;
        self.set(
            GaugeKind::Altitude,
            &config.altimeter,
            preferences,
            armed,
            Some(Measurement {
                value: altitude,
                title: format!("Altitude: {}", altitude as i64),
                progress: ratio(altitude, config.altimeter_ceiling),
            }),
        );

        let speed = sensors.velocity.length() * config.speedometer_scale;
        self.set(
            GaugeKind::Speed,
            &config.speedometer,
            preferences,
            armed,
            Some(Measurement {
                value: speed,
                title: format!("Speed: {speed:.1}"),
                progress: ratio(speed, config.speedometer_max),
            }),
        );

        let wings = sensors
            .equipment
            .map(|equipment| equipment.condition)
            .filter(|condition| condition.is_finite())
            .map(|condition| {
                let condition = condition.clamp(0.0, 1.0);
                let percent = condition * 100.0;
                Measurement {
                    value: percent,
                    title: format!("Wings: {}%", percent as i64),
                    progress: condition,
                }
            });
        self.set(GaugeKind::Wings, &config.wingometer, preferences, armed, wings);

        let pitch = pitch_degrees(sensors.look_direction);
        self.set(
            GaugeKind::Pitch,
            &config.pitchmeter,
            preferences,
            armed,
            Some(Measurement {
                value: pitch,
                title: format!("Pitch: {}°", pitch.round() as i64),
                progress: ratio(
                    pitch - config.pitchmeter_min,
                    config.pitchmeter_max - config.pitchmeter_min,
                ),
            }),
        );
    }

    fn set(
        &mut self,
        kind: GaugeKind,
        gauge_config: &GaugeConfig,
        preferences: &GaugePreferences,
        armed: bool,
        measurement: Option<Measurement>,
    ) {
        let reading = self.get_mut(kind);
        let Some(measurement) = measurement else {
            reading.visible = false;
            return;
        };
        reading.visible = gauge_config.enabled && preferences.is_shown(kind) && armed;
        reading.colour = gauge_config.colours.classify(measurement.value);
        reading.title = measurement.title;
        reading.progress = measurement.progress;
    }
}

struct Measurement {
    value: Float,
    title: String,
    progress: Float,
}

/// `value / full`, clamped to `[0, 1]`. Zero when `full` is not positive.
fn ratio(value: Float, full: Float) -> Float {
    if 0.0 < full {
        let ratio = value / full;
        if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        }
    } else {
        0.0
    }
}

/// Nose angle in degrees, positive up.
pub fn pitch_degrees(look_direction: Vector3) -> Float {
    let look = look_direction.normalize_or_zero();
    look.y.clamp(-1.0, 1.0).asin().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EquipmentReading;

    fn airborne_sensors() -> FlightSensors {
        FlightSensors {
            translation: Vector3::new(0.0, 100.0, 0.0),
            velocity: Vector3::new(0.0, 0.0, 1.0),
            look_direction: Vector3::new(0.0, 0.5, 0.5 * 3.0_f32.sqrt() as Float),
            on_ground: false,
            gliding: true,
            equipment: Some(EquipmentReading::new(0.2)),
            ..Default::default()
        }
    }

    #[test]
    fn armed_gauges_show_readings() {
        let config = FlightAssistConfig::default();
        let mut gauges = FlightGauges::default();
        gauges.update(&config, &airborne_sensors(), &GaugePreferences::default(), true);

        assert!(gauges.altitude.visible);
        assert_eq!(gauges.altitude.title, "Altitude: 100");
        assert_eq!(gauges.altitude.colour, GaugeColour::Green);
        assert!((gauges.altitude.progress - 100.0 / 256.0).abs() < 1e-4);

        assert_eq!(gauges.speed.title, "Speed: 20.0");
        assert_eq!(gauges.speed.colour, GaugeColour::Blue);
        assert!((gauges.speed.progress - 0.4).abs() < 1e-4);

        assert_eq!(gauges.wings.title, "Wings: 20%");
        assert_eq!(gauges.wings.colour, GaugeColour::Yellow);

        assert_eq!(gauges.pitch.title, "Pitch: 30°");
        assert_eq!(gauges.pitch.colour, GaugeColour::White);
        assert!((gauges.pitch.progress - 120.0 / 180.0).abs() < 1e-3);
    }

    #[test]
    fn unarmed_gauges_are_hidden() {
        let config = FlightAssistConfig::default();
        let mut gauges = FlightGauges::default();
        gauges.update(&config, &airborne_sensors(), &GaugePreferences::default(), false);
        assert_eq!(gauges.visible().count(), 0);
    }

    #[test]
    fn preferences_and_switches_hide_single_gauges() {
        let mut config = FlightAssistConfig::default();
        config.pitchmeter.enabled = false;
        let mut preferences = GaugePreferences::default();
        preferences.set(GaugeKind::Speed, false);

        let mut gauges = FlightGauges::default();
        gauges.update(&config, &airborne_sensors(), &preferences, true);
        assert_eq!(
            gauges.visible().collect::<Vec<_>>(),
            vec![GaugeKind::Altitude, GaugeKind::Wings]
        );
    }

    #[test]
    fn wingometer_is_suppressed_without_equipment() {
        let config = FlightAssistConfig::default();
        let mut gauges = FlightGauges::default();
        gauges.update(&config, &airborne_sensors(), &GaugePreferences::default(), true);
        assert!(gauges.wings.visible);

        let sensors = FlightSensors {
            equipment: None,
            ..airborne_sensors()
        };
        gauges.update(&config, &sensors, &GaugePreferences::default(), true);
        assert!(!gauges.wings.visible);
        // Keeps the last reading.
        assert_eq!(gauges.wings.title, "Wings: 20%");

        let sensors = FlightSensors {
            equipment: Some(EquipmentReading::new(Float::NAN)),
            ..airborne_sensors()
        };
        gauges.update(&config, &sensors, &GaugePreferences::default(), true);
        assert!(!gauges.wings.visible);
    }

    #[test]
    fn progress_is_clamped() {
        let config = FlightAssistConfig::default();
        let sensors = FlightSensors {
            translation: Vector3::new(0.0, 1000.0, 0.0),
            velocity: Vector3::ZERO,
            ..airborne_sensors()
        };
        let mut gauges = FlightGauges::default();
        gauges.update(&config, &sensors, &GaugePreferences::default(), true);
        assert_eq!(gauges.altitude.progress, 1.0);
        assert_eq!(gauges.speed.progress, 0.0);

        let sensors = FlightSensors {
            translation: Vector3::new(0.0, -20.0, 0.0),
            ..airborne_sensors()
        };
        gauges.update(&config, &sensors, &GaugePreferences::default(), true);
        assert_eq!(gauges.altitude.progress, 0.0);
        assert_eq!(gauges.altitude.title, "Altitude: -20");
        assert_eq!(gauges.altitude.colour, GaugeColour::Red);
    }

    #[test]
    fn pitch_is_positive_nose_up() {
        assert!((pitch_degrees(Vector3::Y) - 90.0).abs() < 1e-3);
        assert!((pitch_degrees(Vector3::NEG_Y) + 90.0).abs() < 1e-3);
        assert_eq!(pitch_degrees(Vector3::X), 0.0);
        assert_eq!(pitch_degrees(Vector3::ZERO), 0.0);
    }

    #[test]
    fn gauge_names_parse() {
        assert_eq!("Wings".parse(), Ok(GaugeKind::Wings));
        assert!("fuel".parse::<GaugeKind>().is_err());
    }
}
