use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::band_map::{GaugeColour, ThresholdBandMap};
use crate::math::Float;

/// Failure to read or parse a settings file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unable to read flight assist settings from {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid flight assist settings in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// The flight assist settings exactly as they appear in the settings file.
///
/// Every field has a default, so a settings file only needs to list what it changes. Colour
/// tables map a threshold (written as a string, e.g. `"64"`) to a colour name, and are turned
/// into [`ThresholdBandMap`]s by [`FlightAssistConfig::from_settings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightAssistSettings {
    pub acceleration: AccelerationSettings,
    pub takeoff: TakeoffSettings,
    /// Maximum speed, in distance units per tick, enforced whenever power is applied.
    pub max_velocity: Float,
    /// The entity must glide for this long before its gauges become visible.
    pub gauge_debounce_millis: u64,
    pub broken: BrokenEquipmentSettings,
    pub altimeter: AltimeterSettings,
    pub speedometer: SpeedometerSettings,
    pub wingometer: WingometerSettings,
    pub pitchmeter: PitchmeterSettings,
    pub vacuum: VacuumSettings,
}

impl Default for FlightAssistSettings {
    fn default() -> Self {
        Self {
            acceleration: Default::default(),
            takeoff: Default::default(),
            max_velocity: 2.5,
            gauge_debounce_millis: 500,
            broken: Default::default(),
            altimeter: Default::default(),
            speedometer: Default::default(),
            wingometer: Default::default(),
            pitchmeter: Default::default(),
            vacuum: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationSettings {
    /// Upward velocity set on a double-tap takeoff.
    pub takeoff_vertical: Float,
    /// Boost along the look direction applied on takeoff.
    pub takeoff_look: Float,
    /// Boost along the look direction applied every tick the entity crouches in flight.
    pub look: Float,
}

impl Default for AccelerationSettings {
    fn default() -> Self {
        Self {
            takeoff_vertical: 0.5,
            takeoff_look: 1.0,
            look: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoffSettings {
    /// How long gliding is forced after a takeoff.
    pub glide_millis: u64,
    /// Maximum time between the two crouch taps of a takeoff.
    pub tap_millis: u64,
}

impl Default for TakeoffSettings {
    fn default() -> Self {
        Self {
            glide_millis: 1000,
            tap_millis: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokenEquipmentSettings {
    /// Equipment at or below this condition counts as broken.
    pub condition_threshold: Float,
    /// Crouching with broken equipment still starts one tick of gliding, for a safe landing.
    pub glide: bool,
    /// Fall distance removed for each tick power is requested from broken equipment, when
    /// `glide` is enabled.
    pub glide_fall_reduction: Float,
}

impl Default for BrokenEquipmentSettings {
    fn default() -> Self {
        Self {
            condition_threshold: 0.0,
            glide: true,
            glide_fall_reduction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltimeterSettings {
    pub enabled: bool,
    /// Altitude at which the altimeter reads full.
    pub ceiling: Float,
    pub colours: BTreeMap<String, String>,
}

impl Default for AltimeterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ceiling: 256.0,
            colours: colour_table(&[("20", "RED"), ("64", "YELLOW"), ("128", "GREEN")]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedometerSettings {
    pub enabled: bool,
    /// Displayed speed at which the speedometer reads full.
    pub max: Float,
    /// Converts velocity (units per tick) to the displayed speed (units per second).
    pub scale: Float,
    /// Colour above every threshold in `colours`.
    pub colour: String,
    pub colours: BTreeMap<String, String>,
}

impl Default for SpeedometerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max: 50.0,
            scale: 20.0,
            colour: "BLUE".to_owned(),
            colours: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WingometerSettings {
    pub enabled: bool,
    /// Thresholds are durability percentages.
    pub colours: BTreeMap<String, String>,
}

impl Default for WingometerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colours: colour_table(&[("10", "RED"), ("25", "YELLOW")]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchmeterSettings {
    pub enabled: bool,
    /// Pitch, in degrees, for the lowest reading.
    pub min: Float,
    /// Pitch, in degrees, for the highest reading.
    pub max: Float,
    pub colours: BTreeMap<String, String>,
}

impl Default for PitchmeterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min: -90.0,
            max: 90.0,
            colours: colour_table(&[("-30", "RED"), ("-5", "YELLOW"), ("5", "GREEN")]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacuumSettings {
    pub enabled: bool,
    /// Altitude at and above which the entity asphyxiates.
    pub altitude: Float,
    /// Damage per tick while above `altitude`.
    pub damage: Float,
}

impl Default for VacuumSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            altitude: 400.0,
            damage: 1.0,
        }
    }
}

fn colour_table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, colour)| ((*key).to_owned(), (*colour).to_owned()))
        .collect()
}

/// Validated flight assist configuration, ready to be read every tick.
///
/// Hosts using the [plugin](crate::FlightAssistPlugin) keep it as a resource and replace it
/// whole on reload. It is never patched in place, so readers always see one consistent version.
#[derive(Resource, Debug, Clone)]
pub struct FlightAssistConfig {
    pub takeoff_vertical_acceleration: Float,
    pub takeoff_look_acceleration: Float,
    pub look_acceleration: Float,
    pub takeoff_glide: Duration,
    pub takeoff_tap_window: Duration,
    pub max_velocity: Float,
    pub gauge_debounce: Duration,
    pub broken_condition_threshold: Float,
    pub broken_glide: bool,
    pub broken_glide_fall_reduction: Float,
    pub altimeter: GaugeConfig,
    pub altimeter_ceiling: Float,
    pub speedometer: GaugeConfig,
    pub speedometer_max: Float,
    pub speedometer_scale: Float,
    pub wingometer: GaugeConfig,
    pub pitchmeter: GaugeConfig,
    pub pitchmeter_min: Float,
    pub pitchmeter_max: Float,
    pub vacuum_enabled: bool,
    pub vacuum_altitude: Float,
    pub vacuum_damage: Float,
}

/// The parts every gauge has: its global switch and its colour bands.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeConfig {
    pub enabled: bool,
    pub colours: ThresholdBandMap,
}

impl Default for FlightAssistConfig {
    fn default() -> Self {
        Self::from_settings(&FlightAssistSettings::default())
    }
}

impl FlightAssistConfig {
    /// Validate raw settings.
    ///
    /// Invalid colour table entries and an invalid speedometer colour are reported with warnings
    /// and skipped (or replaced by [`GaugeColour::Blue`] for the speedometer colour).
    pub fn from_settings(settings: &FlightAssistSettings) -> Self {
        let speedometer_colour = settings
            .speedometer
            .colour
            .parse::<GaugeColour>()
            .unwrap_or_else(|_| {
                warn!("Invalid speedometer colour: {}", settings.speedometer.colour);
                GaugeColour::Blue
            });

        Self {
            takeoff_vertical_acceleration: settings.acceleration.takeoff_vertical,
            takeoff_look_acceleration: settings.acceleration.takeoff_look,
            look_acceleration: settings.acceleration.look,
            takeoff_glide: Duration::from_millis(settings.takeoff.glide_millis),
            takeoff_tap_window: Duration::from_millis(settings.takeoff.tap_millis),
            max_velocity: settings.max_velocity,
            gauge_debounce: Duration::from_millis(settings.gauge_debounce_millis),
            broken_condition_threshold: settings.broken.condition_threshold,
            broken_glide: settings.broken.glide,
            broken_glide_fall_reduction: settings.broken.glide_fall_reduction,
            altimeter: GaugeConfig {
                enabled: settings.altimeter.enabled,
                colours: build_bands(&settings.altimeter.colours, "altitude", GaugeColour::Purple),
            },
            altimeter_ceiling: settings.altimeter.ceiling,
            speedometer: GaugeConfig {
                enabled: settings.speedometer.enabled,
                colours: build_bands(&settings.speedometer.colours, "speed", speedometer_colour),
            },
            speedometer_max: settings.speedometer.max,
            speedometer_scale: settings.speedometer.scale,
            wingometer: GaugeConfig {
                enabled: settings.wingometer.enabled,
                colours: build_bands(
                    &settings.wingometer.colours,
                    "wing durability",
                    GaugeColour::White,
                ),
            },
            pitchmeter: GaugeConfig {
                enabled: settings.pitchmeter.enabled,
                colours: build_bands(&settings.pitchmeter.colours, "pitch", GaugeColour::White),
            },
            pitchmeter_min: settings.pitchmeter.min,
            pitchmeter_max: settings.pitchmeter.max,
            vacuum_enabled: settings.vacuum.enabled,
            vacuum_altitude: settings.vacuum.altitude,
            vacuum_damage: settings.vacuum.damage,
        }
    }

    /// Parse settings from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        let settings: FlightAssistSettings = ron::from_str(source)?;
        Ok(Self::from_settings(&settings))
    }

    /// Load and validate a RON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_ron_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Load a replacement configuration, or keep the current one if the file cannot be used.
    ///
    /// Returns whether the configuration was replaced.
    pub fn reload_or_keep(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(reloaded) => {
                *self = reloaded;
                info!("Flight assist configuration reloaded from {}", path.display());
                true
            }
            Err(err) => {
                warn!("{err}: {}. Keeping the previous configuration", error_chain(&err));
                false
            }
        }
    }
}

fn build_bands(
    table: &BTreeMap<String, String>,
    description: &str,
    sentinel: GaugeColour,
) -> ThresholdBandMap {
    ThresholdBandMap::build(
        table.iter().map(|(key, colour)| (key.as_str(), colour.as_str())),
        sentinel,
        description,
    )
}

pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fall_back_to_defaults() {
        let config = FlightAssistConfig::from_ron_str(
            r#"(
                max_velocity: 4.0,
                takeoff: (tap_millis: 250),
                altimeter: (colours: {"10": "PINK", "oops": "RED", "30": "MAUVE"}),
            )"#,
        )
        .expect("settings should parse");

        assert_eq!(config.max_velocity, 4.0);
        assert_eq!(config.takeoff_tap_window, Duration::from_millis(250));
        assert_eq!(config.takeoff_glide, Duration::from_millis(1000));
        assert_eq!(config.altimeter.colours.classify(5.0), GaugeColour::Pink);
        assert_eq!(config.altimeter.colours.classify(25.0), GaugeColour::Purple);
        assert_eq!(config.altimeter.colours.bands().count(), 2);
    }

    #[test]
    fn invalid_speedometer_colour_falls_back_to_blue() {
        let config =
            FlightAssistConfig::from_ron_str(r#"(speedometer: (colour: "CHARTREUSE"))"#)
                .expect("settings should parse");
        assert_eq!(config.speedometer.colours.sentinel(), GaugeColour::Blue);

        let config = FlightAssistConfig::from_ron_str(r#"(speedometer: (colour: "red"))"#)
            .expect("settings should parse");
        assert_eq!(config.speedometer.colours.sentinel(), GaugeColour::Red);
    }

    #[test]
    fn default_settings_survive_ron_round_trip() {
        let settings = FlightAssistSettings::default();
        let serialized =
            ron::ser::to_string_pretty(&settings, Default::default()).expect("Unable to serialize");
        let deserialized: FlightAssistSettings =
            ron::from_str(&serialized).expect("Unable to deserialize");
        assert_eq!(deserialized, settings);
    }

    #[test]
    fn reload_keeps_previous_config_on_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flight_assist.ron");

        let mut config = FlightAssistConfig::default();
        assert!(!config.reload_or_keep(&path));
        assert_eq!(config.max_velocity, 2.5);

        std::fs::write(&path, "(max_velocity: 7.5)").expect("write settings");
        assert!(config.reload_or_keep(&path));
        assert_eq!(config.max_velocity, 7.5);

        std::fs::write(&path, "(max_velocity: \"fast\")").expect("write settings");
        assert!(!config.reload_or_keep(&path));
        assert_eq!(config.max_velocity, 7.5);
    }

    #[test]
    fn load_reports_which_file_failed() {
        let err = FlightAssistConfig::load("/nonexistent/flight_assist.ron")
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/flight_assist.ron"));
    }
}
