//! The ordered sequence of deformation episodes plus the numerical
//! accuracy/binning knobs that govern how a timestep is advanced.

use super::deformation_episode::DeformationEpisode;
use super::error::ControlError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressDistribution {
    EvenlyDistributedStress,
    StressShadow,
    DuctileBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractureApertureType {
    Uniform,
    SizeDependent,
    Dynamic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationControl {
    episodes: Vec<DeformationEpisode>,
    max_ts_mfp33_increase: f64,
    historic_a_mfp33_termination_ratio: f64,
    active_total_mfp30_termination_ratio: f64,
    minimum_clear_zone_volume: f64,
    min_timestep: f64,
    max_timestep: f64,
    microfracture_radius_bin_count: usize,
    /// `[0, 1]`, or exactly `-1.0` for "random".
    nucleation_position_control: f64,
    stress_distribution: StressDistribution,
    fracture_porosity: bool,
    fracture_aperture_type: FractureApertureType,
    default_hmin_azimuth: f64,
}

impl Default for PropagationControl {
    fn default() -> Self {
        Self {
            episodes: Vec::new(),
            max_ts_mfp33_increase: 0.5,
            historic_a_mfp33_termination_ratio: 0.01,
            active_total_mfp30_termination_ratio: 0.01,
            minimum_clear_zone_volume: 0.0,
            min_timestep: 0.0,
            max_timestep: f64::INFINITY,
            microfracture_radius_bin_count: 10,
            nucleation_position_control: -1.0,
            stress_distribution: StressDistribution::StressShadow,
            fracture_porosity: false,
            fracture_aperture_type: FractureApertureType::Uniform,
            default_hmin_azimuth: 0.0,
        }
    }
}

impl PropagationControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an episode, rewriting its `episode_index` to its new
    /// 1-based position in the list.
    pub fn push_episode(&mut self, mut episode: DeformationEpisode) {
        let index = self.episodes.len() + 1;
        episode.set_episode_index(index);
        self.episodes.push(episode);
    }

    pub fn episodes(&self) -> &[DeformationEpisode] {
        &self.episodes
    }

    pub fn with_accuracy_controls(
        mut self,
        max_ts_mfp33_increase: f64,
        historic_a_mfp33_termination_ratio: f64,
        active_total_mfp30_termination_ratio: f64,
        minimum_clear_zone_volume: f64,
    ) -> Result<Self> {
        if max_ts_mfp33_increase <= 0.0 {
            return Err(ControlError::NonPositiveTolerance("max_TS_MFP33_increase").into());
        }
        if historic_a_mfp33_termination_ratio <= 0.0 {
            return Err(
                ControlError::NonPositiveTolerance("historic_a_MFP33_termination_ratio").into(),
            );
        }
        if active_total_mfp30_termination_ratio <= 0.0 {
            return Err(ControlError::NonPositiveTolerance(
                "active_total_MFP30_termination_ratio",
            )
            .into());
        }
        if minimum_clear_zone_volume < 0.0 {
            return Err(ControlError::NegativeCutoff("minimum_ClearZone_Volume").into());
        }
        self.max_ts_mfp33_increase = max_ts_mfp33_increase;
        self.historic_a_mfp33_termination_ratio = historic_a_mfp33_termination_ratio;
        self.active_total_mfp30_termination_ratio = active_total_mfp30_termination_ratio;
        self.minimum_clear_zone_volume = minimum_clear_zone_volume;
        Ok(self)
    }

    pub fn with_timestep_limits(mut self, min_timestep: f64, max_timestep: f64) -> Result<Self> {
        if min_timestep < 0.0 || max_timestep <= 0.0 || min_timestep > max_timestep {
            return Err(ControlError::NonPositiveTolerance("timestep limits").into());
        }
        self.min_timestep = min_timestep;
        self.max_timestep = max_timestep;
        Ok(self)
    }

    pub fn with_microfracture_radius_bin_count(mut self, bin_count: usize) -> Result<Self> {
        if bin_count == 0 {
            return Err(ControlError::NonPositiveTolerance("microfracture_radius_bin_count").into());
        }
        self.microfracture_radius_bin_count = bin_count;
        Ok(self)
    }

    pub fn with_nucleation_position_control(mut self, control: f64) -> Result<Self> {
        if control != -1.0 && !(0.0..=1.0).contains(&control) {
            return Err(ControlError::InvalidNucleationPositionControl.into());
        }
        self.nucleation_position_control = control;
        Ok(self)
    }

    pub fn with_stress_distribution(mut self, distribution: StressDistribution) -> Self {
        self.stress_distribution = distribution;
        self
    }

    pub fn with_fracture_porosity(mut self, enabled: bool) -> Self {
        self.fracture_porosity = enabled;
        self
    }

    pub fn with_fracture_aperture_type(mut self, aperture_type: FractureApertureType) -> Self {
        self.fracture_aperture_type = aperture_type;
        self
    }

    pub fn with_default_hmin_azimuth(mut self, azimuth: f64) -> Self {
        self.default_hmin_azimuth = azimuth;
        self
    }

    pub fn max_ts_mfp33_increase(&self) -> f64 {
        self.max_ts_mfp33_increase
    }

    pub fn historic_a_mfp33_termination_ratio(&self) -> f64 {
        self.historic_a_mfp33_termination_ratio
    }

    pub fn active_total_mfp30_termination_ratio(&self) -> f64 {
        self.active_total_mfp30_termination_ratio
    }

    pub fn minimum_clear_zone_volume(&self) -> f64 {
        self.minimum_clear_zone_volume
    }

    pub fn min_timestep(&self) -> f64 {
        self.min_timestep
    }

    pub fn max_timestep(&self) -> f64 {
        self.max_timestep
    }

    pub fn microfracture_radius_bin_count(&self) -> usize {
        self.microfracture_radius_bin_count
    }

    pub fn nucleation_position_control(&self) -> f64 {
        self.nucleation_position_control
    }

    pub fn stress_distribution(&self) -> StressDistribution {
        self.stress_distribution
    }

    pub fn fracture_porosity(&self) -> bool {
        self.fracture_porosity
    }

    pub fn fracture_aperture_type(&self) -> FractureApertureType {
        self.fracture_aperture_type
    }

    /// Initial minimum-horizontal-strain azimuth: the first episode with an
    /// anisotropic strain or stress load, else the configured default
    /// load.
    pub fn initial_hmin_azimuth(&self) -> f64 {
        self.episodes
            .iter()
            .find(|episode| episode.has_anisotropic_load())
            .map(|episode| episode.min_horizontal_strain_azimuth())
            .unwrap_or(self.default_hmin_azimuth)
    }
}
