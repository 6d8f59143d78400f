use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;

use crate::math::Float;

/// The colour of a gauge bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeColour {
    Pink,
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

impl GaugeColour {
    pub const ALL: [GaugeColour; 7] = [
        GaugeColour::Pink,
        GaugeColour::Blue,
        GaugeColour::Red,
        GaugeColour::Green,
        GaugeColour::Yellow,
        GaugeColour::Purple,
        GaugeColour::White,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GaugeColour::Pink => "PINK",
            GaugeColour::Blue => "BLUE",
            GaugeColour::Red => "RED",
            GaugeColour::Green => "GREEN",
            GaugeColour::Yellow => "YELLOW",
            GaugeColour::Purple => "PURPLE",
            GaugeColour::White => "WHITE",
        }
    }
}

impl fmt::Display for GaugeColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown gauge colour {0:?}")]
pub struct UnknownGaugeColour(pub String);

impl FromStr for GaugeColour {
    type Err = UnknownGaugeColour;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|colour| colour.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownGaugeColour(s.to_owned()))
    }
}

/// Maps a numeric reading onto the colour of the band it falls in.
///
/// Each band is keyed by its upper bound: a value gets the colour of the first band (in ascending
/// order) whose threshold is strictly greater than it. A sentinel band at [`Float::MAX`] catches
/// everything above the listed thresholds, so [`classify`](Self::classify) is total.
///
/// The map is immutable. Reloading the configuration builds a new one and swaps it in whole.
///
/// ```
/// # use bevy_flight_assist::band_map::{GaugeColour, ThresholdBandMap};
/// let map = ThresholdBandMap::from_bands(
///     [(100.0, GaugeColour::Red), (500.0, GaugeColour::Yellow)],
///     GaugeColour::Green,
/// );
/// assert_eq!(map.classify(50.0), GaugeColour::Red);
/// assert_eq!(map.classify(100.0), GaugeColour::Yellow);
/// assert_eq!(map.classify(9999.0), GaugeColour::Green);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBandMap {
    // Sorted ascending by threshold, unique thresholds, last entry is always at `Float::MAX`.
    bands: Vec<(Float, GaugeColour)>,
}

impl ThresholdBandMap {
    pub const SENTINEL_THRESHOLD: Float = Float::MAX;

    /// A map with only the sentinel band.
    pub fn uniform(colour: GaugeColour) -> Self {
        Self {
            bands: vec![(Self::SENTINEL_THRESHOLD, colour)],
        }
    }

    /// Build a map from already-parsed bands.
    ///
    /// Non-finite thresholds are ignored. When the same threshold appears more than once, the last
    /// one wins.
    pub fn from_bands(
        bands: impl IntoIterator<Item = (Float, GaugeColour)>,
        sentinel: GaugeColour,
    ) -> Self {
        let mut map = Self::uniform(sentinel);
        for (threshold, colour) in bands {
            if threshold.is_finite() {
                map.insert(threshold, colour);
            }
        }
        map
    }

    /// Build a map from raw configuration entries.
    ///
    /// `description` names what the thresholds measure (e.g. `"altitude"`) and only appears in
    /// warnings. Entries whose key is not a finite number, or whose colour is not a known
    /// [`GaugeColour`], are skipped with a warning. They never fail the whole load.
    pub fn build<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
        sentinel: GaugeColour,
        description: &str,
    ) -> Self {
        let mut map = Self::uniform(sentinel);
        for (key, colour_name) in entries {
            let threshold = match key.trim().parse::<Float>() {
                Ok(threshold) if threshold.is_finite() => threshold,
                _ => {
                    warn!("Non-numeric {description} value: {key}");
                    continue;
                }
            };
            match colour_name.parse::<GaugeColour>() {
                Ok(colour) => map.insert(threshold, colour),
                Err(_) => warn!("Invalid {description} colour: {colour_name}"),
            }
        }
        map
    }

    fn insert(&mut self, threshold: Float, colour: GaugeColour) {
        match self
            .bands
            .binary_search_by(|(existing, _)| existing.total_cmp(&threshold))
        {
            Ok(index) => self.bands[index].1 = colour,
            Err(index) => self.bands.insert(index, (threshold, colour)),
        }
    }

    /// The colour of the band `value` falls in.
    ///
    /// Values at or above the highest threshold, and `NaN`, get the sentinel colour.
    pub fn classify(&self, value: Float) -> GaugeColour {
        self.band_of(value).1
    }

    /// The `(threshold, colour)` band `value` falls in.
    pub fn band_of(&self, value: Float) -> (Float, GaugeColour) {
        self.bands
            .iter()
            .copied()
            .find(|(threshold, _)| value < *threshold)
            .unwrap_or_else(|| self.sentinel_band())
    }

    pub fn sentinel(&self) -> GaugeColour {
        self.sentinel_band().1
    }

    fn sentinel_band(&self) -> (Float, GaugeColour) {
        // `bands` always ends with the sentinel.
        self.bands[self.bands.len() - 1]
    }

    /// All bands in ascending order, the sentinel included.
    pub fn bands(&self) -> impl Iterator<Item = (Float, GaugeColour)> + '_ {
        self.bands.iter().copied()
    }
}
