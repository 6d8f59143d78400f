//! Precision aliases shared by the controller and the host backends.
//!
//! Hosts that simulate in double precision enable the `f64` feature, and every vector the
//! controller reads or writes switches to `DVec3`.

#[cfg(feature = "f64")]
pub type Float = f64;
#[cfg(not(feature = "f64"))]
pub type Float = f32;

#[cfg(feature = "f64")]
pub type Vector3 = bevy::math::DVec3;
#[cfg(not(feature = "f64"))]
pub type Vector3 = bevy::math::Vec3;

/// Adjust the precision of a host-side `f32` construct to the precision chosen for compilation.
///
/// Hosts usually hold positions in `Transform` (always `f32`), so this is what backends use when
/// filling [`FlightSensors`](crate::data_for_host::FlightSensors).
pub trait AdjustPrecision {
    type Adjusted;
    fn adjust_precision(&self) -> Self::Adjusted;
}

impl AdjustPrecision for f32 {
    type Adjusted = Float;
    fn adjust_precision(&self) -> Self::Adjusted {
        #[cfg(feature = "f64")]
        return (*self).into();
        #[cfg(not(feature = "f64"))]
        return *self;
    }
}

impl AdjustPrecision for bevy::math::Vec3 {
    type Adjusted = Vector3;
    fn adjust_precision(&self) -> Self::Adjusted {
        #[cfg(feature = "f64")]
        return self.as_dvec3();
        #[cfg(not(feature = "f64"))]
        return *self;
    }
}
