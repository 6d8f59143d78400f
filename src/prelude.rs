pub use crate::band_map::GaugeColour;
pub use crate::config::{FlightAssistConfig, FlightAssistSettings};
pub use crate::controller::{FlightController, FlightPhase};
pub use crate::gauges::{FlightGauges, GaugeKind, GaugeReading};
pub use crate::plugin::{
    FlightAssistConfigPath, FlightAssistPlugin, FlightGesture, FlightGestureKind,
    FlightPreferenceStorage, ReloadFlightAssistConfig,
};
pub use crate::port::{FlightAssistPort, FlightAssistRegistry, FlightTickOutput};
pub use crate::preferences::{
    FlightEntityId, GaugePreferences, GaugeSelection, MemoryPreferenceStore, PreferenceStore,
    RonFilePreferenceStore,
};
pub use crate::{
    EquipmentReading, FeedbackCue, FlightAssistPipelineStages, FlightAssistSystemSet,
    FlightMotor, FlightPermissions, FlightSensors,
};
