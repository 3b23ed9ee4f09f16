//! Shared types used by the control objects: input time units and the
//! horizontal strain/stress tensors that drive the minimum-horizontal-strain
//! azimuth derivations.

use crate::geometry::wrap_azimuth;
use serde::{Deserialize, Serialize};

/// Input unit for a rate or duration supplied by the caller. Rates and
/// durations are always *stored* as SI (per second / seconds); `TimeUnit`
/// only describes the unit of the value being assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Second,
    Year,
    Ma,
}

impl TimeUnit {
    const SECONDS_PER_YEAR: f64 = 365.25 * 86400.0;

    /// Multiplier that converts a value expressed in this unit to SI
    /// (seconds, or per-second for a rate).
    pub fn seconds_per_unit(self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Year => Self::SECONDS_PER_YEAR,
            TimeUnit::Ma => 1.0e6 * Self::SECONDS_PER_YEAR,
        }
    }

    /// Converts a rate expressed per this unit into a rate per second.
    pub fn rate_to_si(self, rate_per_unit: f64) -> f64 {
        rate_per_unit / self.seconds_per_unit()
    }

    /// Converts an SI rate (per second) back into a rate per this unit.
    pub fn rate_from_si(self, rate_per_second: f64) -> f64 {
        rate_per_second * self.seconds_per_unit()
    }

    /// Converts a duration expressed in this unit into seconds.
    pub fn duration_to_si(self, duration: f64) -> f64 {
        duration * self.seconds_per_unit()
    }
}

/// A symmetric 2D tensor in the horizontal (I, J) plane, used for both
/// strain-rate and stress-rate loads and for the initial horizontal stress
/// state. `xy` is the shear component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HorizontalTensor2 {
    pub xx: f64,
    pub yy: f64,
    pub xy: f64,
}

impl HorizontalTensor2 {
    pub fn new(xx: f64, yy: f64, xy: f64) -> Self {
        Self { xx, yy, xy }
    }

    pub fn isotropic(magnitude: f64) -> Self {
        Self {
            xx: magnitude,
            yy: magnitude,
            xy: 0.0,
        }
    }

    /// `true` when the tensor has no preferred horizontal direction, i.e.
    /// equal normal components and zero shear.
    pub fn is_isotropic(&self) -> bool {
        self.xx as f32 == self.yy as f32 && self.xy as f32 == 0.0
    }

    /// Azimuth of the minimum-eigenvalue principal direction, or `NaN` when
    /// the tensor is isotropic.
    pub fn min_eigenvalue_azimuth(&self) -> f64 {
        if self.is_isotropic() {
            return f64::NAN;
        }
        // Principal-direction angle of a symmetric 2x2 tensor; the two
        // eigenvector directions are this angle and its perpendicular. The
        // minimum-eigenvalue direction is whichever of the two yields the
        // smaller quadratic form value.
        let theta = 0.5 * (2.0 * self.xy).atan2(self.xx - self.yy);
        let eigenvalue_at = |angle: f64| {
            let (s, c) = angle.sin_cos();
            self.xx * c * c + self.yy * s * s + 2.0 * self.xy * s * c
        };
        let a = theta;
        let b = theta + std::f64::consts::FRAC_PI_2;
        let azimuth = if eigenvalue_at(a) <= eigenvalue_at(b) {
            a
        } else {
            b
        };
        wrap_azimuth(azimuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_rate_round_trips_through_si_within_one_ulp() {
        let r = 3.7;
        let si = TimeUnit::Year.rate_to_si(r);
        let back = TimeUnit::Year.rate_from_si(si);
        assert!((back - r).abs() <= f64::EPSILON * r.abs());
        assert_eq!(si, r / (365.25 * 86400.0));
    }

    #[test]
    fn ma_duration_converts_to_seconds() {
        let seconds = TimeUnit::Ma.duration_to_si(1.0);
        assert_eq!(seconds, 1.0e6 * 365.25 * 86400.0);
    }

    #[test]
    fn isotropic_tensor_has_nan_azimuth() {
        let t = HorizontalTensor2::isotropic(1.0e-15);
        assert!(t.is_isotropic());
        assert!(t.min_eigenvalue_azimuth().is_nan());
    }

    #[test]
    fn anisotropic_tensor_azimuth_is_wrapped() {
        let t = HorizontalTensor2::new(2.0, 1.0, 0.0);
        let az = t.min_eigenvalue_azimuth();
        assert!(!az.is_nan());
        assert!((0.0..std::f64::consts::TAU).contains(&az));
        // Minimum eigenvalue (1.0) is along y, i.e. azimuth pi/2 or 3pi/2.
        let expected_a = std::f64::consts::FRAC_PI_2;
        let expected_b = expected_a + std::f64::consts::PI;
        assert!(
            (az - expected_a).abs() < 1e-9 || (az - expected_b).abs() < 1e-9,
            "unexpected azimuth {az}"
        );
    }
}
