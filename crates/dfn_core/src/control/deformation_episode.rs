//! A single deformation episode: the load applied to the grid over a
//! bounded (or fracture-growth-terminated) span of geological time.

use super::common::{HorizontalTensor2, TimeUnit};
use super::error::ControlError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Initial stress state an episode may optionally carry, either as a full
/// horizontal tensor or as a single absolute vertical stress — both paired
/// with a fluid pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InitialStressState {
    Tensor {
        stress: HorizontalTensor2,
        fluid_pressure: f64,
    },
    AbsoluteVertical {
        vertical_stress: f64,
        fluid_pressure: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeformationEpisode {
    strain_rate: HorizontalTensor2,
    stress_rate: Option<HorizontalTensor2>,
    overpressure_rate: f64,
    temperature_change_rate: f64,
    uplift_rate: f64,
    stress_arching_factor: f64,
    /// SI seconds; negative means "terminate when fractures stop growing".
    duration: f64,
    initial_stress_state: Option<InitialStressState>,
    /// 1-based position in the owning [`super::PropagationControl`]'s
    /// episode list, rewritten whenever the episode is inserted there.
    /// `0` until inserted.
    episode_index: usize,
}

impl Default for DeformationEpisode {
    fn default() -> Self {
        Self {
            strain_rate: HorizontalTensor2::default(),
            stress_rate: None,
            overpressure_rate: 0.0,
            temperature_change_rate: 0.0,
            uplift_rate: 0.0,
            stress_arching_factor: 0.0,
            duration: -1.0,
            initial_stress_state: None,
            episode_index: 0,
        }
    }
}

impl DeformationEpisode {
    /// Builds an episode from rates expressed in `unit`, converting them to
    /// SI on construction. `duration` is also expressed in `unit`; a
    /// negative value means "terminate automatically when fractures stop
    /// growing" and is passed through unconverted (it is a sentinel, not a
    /// magnitude).
    pub fn new(strain_rate: HorizontalTensor2, duration: f64, unit: TimeUnit) -> Result<Self> {
        if !duration.is_finite() {
            return Err(ControlError::NonFiniteDuration.into());
        }
        if !strain_rate.xx.is_finite() || !strain_rate.yy.is_finite() || !strain_rate.xy.is_finite()
        {
            return Err(ControlError::NonFiniteRate("strain_rate").into());
        }
        let duration_si = if duration < 0.0 {
            duration
        } else {
            unit.duration_to_si(duration)
        };
        Ok(Self {
            strain_rate: HorizontalTensor2::new(
                unit.rate_to_si(strain_rate.xx),
                unit.rate_to_si(strain_rate.yy),
                unit.rate_to_si(strain_rate.xy),
            ),
            duration: duration_si,
            ..Default::default()
        })
    }

    /// Overrides strain control with an absolute stress-rate load, expressed
    /// in `unit` and converted to SI.
    pub fn with_stress_rate(mut self, stress_rate: HorizontalTensor2, unit: TimeUnit) -> Result<Self> {
        if !stress_rate.xx.is_finite() || !stress_rate.yy.is_finite() || !stress_rate.xy.is_finite() {
            return Err(ControlError::NonFiniteRate("stress_rate").into());
        }
        self.stress_rate = Some(HorizontalTensor2::new(
            unit.rate_to_si(stress_rate.xx),
            unit.rate_to_si(stress_rate.yy),
            unit.rate_to_si(stress_rate.xy),
        ));
        Ok(self)
    }

    pub fn with_overpressure_rate(mut self, rate: f64, unit: TimeUnit) -> Result<Self> {
        if !rate.is_finite() {
            return Err(ControlError::NonFiniteRate("overpressure_rate").into());
        }
        self.overpressure_rate = unit.rate_to_si(rate);
        Ok(self)
    }

    pub fn with_temperature_change_rate(mut self, rate: f64, unit: TimeUnit) -> Result<Self> {
        if !rate.is_finite() {
            return Err(ControlError::NonFiniteRate("temperature_change_rate").into());
        }
        self.temperature_change_rate = unit.rate_to_si(rate);
        Ok(self)
    }

    pub fn with_uplift_rate(mut self, rate: f64, unit: TimeUnit) -> Result<Self> {
        if !rate.is_finite() {
            return Err(ControlError::NonFiniteRate("uplift_rate").into());
        }
        self.uplift_rate = unit.rate_to_si(rate);
        Ok(self)
    }

    pub fn with_stress_arching_factor(mut self, factor: f64) -> Result<Self> {
        if !factor.is_finite() {
            return Err(ControlError::NonFiniteRate("stress_arching_factor").into());
        }
        self.stress_arching_factor = factor;
        Ok(self)
    }

    pub fn with_initial_stress_state(mut self, state: InitialStressState) -> Self {
        self.initial_stress_state = Some(state);
        self
    }

    pub fn strain_rate(&self) -> HorizontalTensor2 {
        self.strain_rate
    }

    pub fn stress_rate(&self) -> Option<HorizontalTensor2> {
        self.stress_rate
    }

    /// `true` when this episode overrides strain control with an absolute
    /// stress rate.
    pub fn is_stress_controlled(&self) -> bool {
        self.stress_rate.is_some()
    }

    pub fn overpressure_rate(&self) -> f64 {
        self.overpressure_rate
    }

    pub fn temperature_change_rate(&self) -> f64 {
        self.temperature_change_rate
    }

    pub fn uplift_rate(&self) -> f64 {
        self.uplift_rate
    }

    pub fn stress_arching_factor(&self) -> f64 {
        self.stress_arching_factor
    }

    /// SI seconds; negative means "terminate when fractures stop growing".
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn terminates_on_stalled_growth(&self) -> bool {
        self.duration < 0.0
    }

    pub fn initial_stress_state(&self) -> Option<InitialStressState> {
        self.initial_stress_state
    }

    /// 1-based position within the owning [`super::PropagationControl`]'s
    /// episode list; `0` before insertion.
    pub fn episode_index(&self) -> usize {
        self.episode_index
    }

    pub(super) fn set_episode_index(&mut self, index: usize) {
        self.episode_index = index;
    }

    /// `true` when either the strain-rate load or (if present) the
    /// stress-rate load is anisotropic in the horizontal plane.
    pub fn has_anisotropic_load(&self) -> bool {
        !self.strain_rate.is_isotropic() || self.stress_rate.map_or(false, |s| !s.is_isotropic())
    }

    /// Minimum-horizontal-strain azimuth: derived from the stress-rate
    /// tensor when present, else the strain-rate tensor; `NaN` when the
    /// governing tensor is isotropic.
    pub fn min_horizontal_strain_azimuth(&self) -> f64 {
        match self.stress_rate {
            Some(stress) => stress.min_eigenvalue_azimuth(),
            None => self.strain_rate.min_eigenvalue_azimuth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_rate_is_stored_as_si_and_reads_back_scaled() {
        let episode =
            DeformationEpisode::new(HorizontalTensor2::new(1.0, 1.0, 0.0), 1.0, TimeUnit::Year)
                .unwrap();
        assert_eq!(episode.strain_rate().xx, 1.0 / (365.25 * 86400.0));
    }

    #[test]
    fn negative_duration_means_stall_termination() {
        let episode =
            DeformationEpisode::new(HorizontalTensor2::default(), -1.0, TimeUnit::Ma).unwrap();
        assert!(episode.terminates_on_stalled_growth());
        assert_eq!(episode.duration(), -1.0);
    }

    #[test]
    fn stress_rate_overrides_strain_for_azimuth() {
        let episode = DeformationEpisode::new(
            HorizontalTensor2::new(2.0, 1.0, 0.0),
            1.0,
            TimeUnit::Second,
        )
        .unwrap()
        .with_stress_rate(HorizontalTensor2::new(1.0, 2.0, 0.0), TimeUnit::Second)
        .unwrap();
        assert!(episode.is_stress_controlled());
        // Strain alone would put the minimum along y (pi/2); the stress
        // override swaps which axis is weaker, moving it to x (0 or pi).
        let az = episode.min_horizontal_strain_azimuth();
        assert!(az.abs() < 1e-9 || (az - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn isotropic_load_yields_nan_azimuth() {
        let episode = DeformationEpisode::new(
            HorizontalTensor2::isotropic(1.0),
            1.0,
            TimeUnit::Second,
        )
        .unwrap();
        assert!(episode.min_horizontal_strain_azimuth().is_nan());
        assert!(!episode.has_anisotropic_load());
    }

    #[test]
    fn non_finite_rate_is_rejected() {
        let result = DeformationEpisode::new(
            HorizontalTensor2::new(f64::NAN, 0.0, 0.0),
            1.0,
            TimeUnit::Second,
        );
        assert!(result.is_err());
    }
}
