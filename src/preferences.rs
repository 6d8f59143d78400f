//! Per-entity gauge visibility preferences and where they are kept between sessions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gauges::GaugeKind;

/// Stable identity of a flying entity, used to key its persisted preferences.
///
/// Hosts derive it from their own notion of identity (e.g. a player account id), never from a
/// display name.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FlightEntityId(pub Uuid);

impl FlightEntityId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FlightEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Which gauges the entity wants to see. Everything is shown by default.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugePreferences {
    pub altitude: bool,
    pub speed: bool,
    pub wings: bool,
    pub pitch: bool,
}

impl Default for GaugePreferences {
    fn default() -> Self {
        Self {
            altitude: true,
            speed: true,
            wings: true,
            pitch: true,
        }
    }
}

/// The gauges a visibility change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeSelection {
    All,
    One(GaugeKind),
}

impl GaugePreferences {
    pub fn is_shown(&self, kind: GaugeKind) -> bool {
        *self.flag(kind)
    }

    pub fn set(&mut self, kind: GaugeKind, shown: bool) {
        *self.flag_mut(kind) = shown;
    }

    /// Set the selected gauges to `visibility`, or toggle each of them when it is `None`.
    pub fn apply(&mut self, selection: GaugeSelection, visibility: Option<bool>) {
        let kinds: &[GaugeKind] = match &selection {
            GaugeSelection::All => &GaugeKind::ALL,
            GaugeSelection::One(kind) => std::slice::from_ref(kind),
        };
        for kind in kinds {
            let flag = self.flag_mut(*kind);
            *flag = visibility.unwrap_or(!*flag);
        }
    }

    fn flag(&self, kind: GaugeKind) -> &bool {
        match kind {
            GaugeKind::Altitude => &self.altitude,
            GaugeKind::Speed => &self.speed,
            GaugeKind::Wings => &self.wings,
            GaugeKind::Pitch => &self.pitch,
        }
    }

    fn flag_mut(&mut self, kind: GaugeKind) -> &mut bool {
        match kind {
            GaugeKind::Altitude => &mut self.altitude,
            GaugeKind::Speed => &mut self.speed,
            GaugeKind::Wings => &mut self.wings,
            GaugeKind::Pitch => &mut self.pitch,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PreferenceStoreError {
    #[error("unable to access gauge preferences at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt gauge preferences file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("unable to serialize gauge preferences")]
    Serialize(#[from] ron::Error),
}

/// Where gauge preferences live while their entity is not active.
///
/// `save` may buffer; `flush` makes everything saved so far durable.
pub trait PreferenceStore: 'static + Send + Sync {
    fn load(&self, id: FlightEntityId) -> Option<GaugePreferences>;
    fn save(&mut self, id: FlightEntityId, preferences: GaugePreferences);
    fn flush(&mut self) -> Result<(), PreferenceStoreError>;
}

/// Keeps preferences for the lifetime of the process only.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    records: HashMap<FlightEntityId, GaugePreferences>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, id: FlightEntityId) -> Option<GaugePreferences> {
        self.records.get(&id).copied()
    }

    fn save(&mut self, id: FlightEntityId, preferences: GaugePreferences) {
        self.records.insert(id, preferences);
    }

    fn flush(&mut self) -> Result<(), PreferenceStoreError> {
        Ok(())
    }
}

/// Keeps preferences in a single RON file, keyed by [`FlightEntityId`].
///
/// The whole file is read on [`open`](Self::open) and rewritten on [`flush`](PreferenceStore::flush)
/// when something changed.
#[derive(Debug)]
pub struct RonFilePreferenceStore {
    path: PathBuf,
    records: BTreeMap<FlightEntityId, GaugePreferences>,
    dirty: bool,
}

impl RonFilePreferenceStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceStoreError> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(source) => {
                ron::from_str(&source).map_err(|source| PreferenceStoreError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PreferenceStoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            records,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PreferenceStore for RonFilePreferenceStore {
    fn load(&self, id: FlightEntityId) -> Option<GaugePreferences> {
        self.records.get(&id).copied()
    }

    fn save(&mut self, id: FlightEntityId, preferences: GaugePreferences) {
        if self.records.insert(id, preferences) != Some(preferences) {
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<(), PreferenceStoreError> {
        if !self.dirty {
            return Ok(());
        }
        let serialized = ron::ser::to_string_pretty(&self.records, Default::default())?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PreferenceStoreError::Io {
                path: parent.to_owned(),
                source,
            })?;
        }
        std::fs::write(&self.path, serialized).map_err(|source| PreferenceStoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        Ok(())
    }
}
