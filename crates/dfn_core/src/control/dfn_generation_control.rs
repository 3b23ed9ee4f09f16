//! Generation-wide knobs that are independent of any one deformation
//! episode: size cutoffs, output cadence, and file-writing options.

use super::common::TimeUnit;
use super::error::ControlError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntermediateOutputInterval {
    SpecifiedTime,
    EqualTime,
    EqualArea,
}

/// Neighbour-gridblock search mode used when a propagating tip crosses a
/// gridblock boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutomaticFlag {
    None,
    All,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DfnFileType {
    Ascii,
    Fab,
}

/// Sentinel used for "undefined" fracture permeability/compressibility/
/// aperture.
pub const UNDEFINED_SENTINEL: f64 = f32::MAX as f64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DfnGenerationControl {
    microfracture_min_radius: f64,
    macrofracture_min_strike_length: f64,
    /// `< 0` means unlimited, matching `GlobalDfn::remove_shortest_fractures`'s
    /// `maxCount` convention.
    absolute_max_fracture_count: i64,
    new_fractures_per_gridblock_per_timestep: usize,
    layer_thickness_cutoff: f64,
    max_propagation_azimuth_change: f64,
    crop_to_grid: bool,
    link_in_stress_shadow: bool,
    /// `>= 3` for a polygon, `0` for a circle.
    microfracture_polygon_vertex_count: usize,
    intermediate_output_count: usize,
    intermediate_output_interval: IntermediateOutputInterval,
    probabilistic_nucleation_limit: f64,
    automatic_flag: AutomaticFlag,
    propagate_in_nucleation_order: bool,
    write_to_file: bool,
    output_file_type: DfnFileType,
    output_centrepoints: bool,
    folder_path: String,
    time_unit: TimeUnit,
    /// Strictly increasing, positive SI seconds. Maintained by
    /// [`Self::set_intermediate_output_times`].
    intermediate_output_times: Vec<f64>,
    default_fracture_permeability: f64,
    default_fracture_compressibility: f64,
    default_fracture_aperture: f64,
}

impl Default for DfnGenerationControl {
    fn default() -> Self {
        Self {
            microfracture_min_radius: 0.0,
            macrofracture_min_strike_length: 0.0,
            absolute_max_fracture_count: -1,
            new_fractures_per_gridblock_per_timestep: usize::MAX,
            layer_thickness_cutoff: 0.0,
            max_propagation_azimuth_change: std::f64::consts::FRAC_PI_2,
            crop_to_grid: true,
            link_in_stress_shadow: false,
            microfracture_polygon_vertex_count: 0,
            intermediate_output_count: 0,
            intermediate_output_interval: IntermediateOutputInterval::EqualTime,
            probabilistic_nucleation_limit: 1.0,
            automatic_flag: AutomaticFlag::Automatic,
            propagate_in_nucleation_order: true,
            write_to_file: false,
            output_file_type: DfnFileType::Ascii,
            output_centrepoints: false,
            folder_path: String::new(),
            time_unit: TimeUnit::Second,
            intermediate_output_times: Vec::new(),
            default_fracture_permeability: UNDEFINED_SENTINEL,
            default_fracture_compressibility: UNDEFINED_SENTINEL,
            default_fracture_aperture: UNDEFINED_SENTINEL,
        }
    }
}

impl DfnGenerationControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_minimum_size_cutoffs(mut self, min_radius: f64, min_strike_length: f64) -> Result<Self> {
        if min_radius < 0.0 {
            return Err(ControlError::NegativeCutoff("microfracture_min_radius").into());
        }
        if min_strike_length < 0.0 {
            return Err(ControlError::NegativeCutoff("macrofracture_min_strike_length").into());
        }
        self.microfracture_min_radius = min_radius;
        self.macrofracture_min_strike_length = min_strike_length;
        Ok(self)
    }

    pub fn with_absolute_max_fracture_count(mut self, max_count: i64) -> Self {
        self.absolute_max_fracture_count = max_count;
        self
    }

    pub fn with_microfracture_polygon_vertex_count(mut self, vertex_count: usize) -> Result<Self> {
        if vertex_count != 0 && vertex_count < 3 {
            return Err(ControlError::InvalidPolygonVertexCount.into());
        }
        self.microfracture_polygon_vertex_count = vertex_count;
        Ok(self)
    }

    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn with_folder_path(mut self, folder_path: impl Into<String>) -> Self {
        self.folder_path = folder_path.into();
        self
    }

    pub fn with_write_to_file(mut self, write_to_file: bool, file_type: DfnFileType) -> Self {
        self.write_to_file = write_to_file;
        self.output_file_type = file_type;
        self
    }

    pub fn with_automatic_flag(mut self, flag: AutomaticFlag) -> Self {
        self.automatic_flag = flag;
        self
    }

    pub fn with_intermediate_output_interval(
        mut self,
        count: usize,
        interval: IntermediateOutputInterval,
    ) -> Self {
        self.intermediate_output_count = count;
        self.intermediate_output_interval = interval;
        self
    }

    /// Replaces the intermediate output times, converting each from the
    /// control's configured [`TimeUnit`] to SI seconds and then keeping only
    /// the subsequence that is strictly increasing and positive — entries
    /// that are non-positive or out of order relative to the previous kept
    /// entry are silently dropped.
    pub fn set_intermediate_output_times(&mut self, times: &[f64]) {
        self.intermediate_output_times.clear();
        let mut last = 0.0_f64;
        for &t in times {
            let si = self.time_unit.duration_to_si(t);
            if si > 0.0 && si > last {
                self.intermediate_output_times.push(si);
                last = si;
            }
        }
    }

    pub fn intermediate_output_times(&self) -> &[f64] {
        &self.intermediate_output_times
    }

    pub fn microfracture_min_radius(&self) -> f64 {
        self.microfracture_min_radius
    }

    pub fn macrofracture_min_strike_length(&self) -> f64 {
        self.macrofracture_min_strike_length
    }

    pub fn absolute_max_fracture_count(&self) -> i64 {
        self.absolute_max_fracture_count
    }

    pub fn new_fractures_per_gridblock_per_timestep(&self) -> usize {
        self.new_fractures_per_gridblock_per_timestep
    }

    pub fn layer_thickness_cutoff(&self) -> f64 {
        self.layer_thickness_cutoff
    }

    pub fn max_propagation_azimuth_change(&self) -> f64 {
        self.max_propagation_azimuth_change
    }

    pub fn crop_to_grid(&self) -> bool {
        self.crop_to_grid
    }

    pub fn link_in_stress_shadow(&self) -> bool {
        self.link_in_stress_shadow
    }

    pub fn microfracture_polygon_vertex_count(&self) -> usize {
        self.microfracture_polygon_vertex_count
    }

    pub fn probabilistic_nucleation_limit(&self) -> f64 {
        self.probabilistic_nucleation_limit
    }

    pub fn automatic_flag(&self) -> AutomaticFlag {
        self.automatic_flag
    }

    pub fn propagate_in_nucleation_order(&self) -> bool {
        self.propagate_in_nucleation_order
    }

    pub fn write_to_file(&self) -> bool {
        self.write_to_file
    }

    pub fn output_file_type(&self) -> DfnFileType {
        self.output_file_type
    }

    pub fn output_centrepoints(&self) -> bool {
        self.output_centrepoints
    }

    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn default_fracture_permeability(&self) -> f64 {
        self.default_fracture_permeability
    }

    pub fn default_fracture_compressibility(&self) -> f64 {
        self.default_fracture_compressibility
    }

    pub fn default_fracture_aperture(&self) -> f64 {
        self.default_fracture_aperture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_max_f32_as_undefined_sentinel() {
        let control = DfnGenerationControl::default();
        assert_eq!(control.default_fracture_permeability(), f32::MAX as f64);
        assert_eq!(control.default_fracture_compressibility(), f32::MAX as f64);
        assert_eq!(control.default_fracture_aperture(), f32::MAX as f64);
    }

    #[test]
    fn intermediate_output_times_drop_non_positive_and_out_of_order_entries() {
        let mut control = DfnGenerationControl::new().with_time_unit(TimeUnit::Second);
        control.set_intermediate_output_times(&[10.0, -5.0, 20.0, 15.0, 30.0, 0.0]);
        assert_eq!(control.intermediate_output_times(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn intermediate_output_times_are_converted_to_si() {
        let mut control = DfnGenerationControl::new().with_time_unit(TimeUnit::Year);
        control.set_intermediate_output_times(&[1.0, 2.0]);
        let expected_year = 365.25 * 86400.0;
        assert_eq!(control.intermediate_output_times(), &[expected_year, 2.0 * expected_year]);
    }

    #[test]
    fn reassigning_intermediate_output_times_replaces_the_previous_list() {
        let mut control = DfnGenerationControl::new();
        control.set_intermediate_output_times(&[1.0, 2.0, 3.0]);
        control.set_intermediate_output_times(&[5.0]);
        assert_eq!(control.intermediate_output_times(), &[5.0]);
    }

    #[test]
    fn invalid_polygon_vertex_count_is_rejected() {
        assert!(DfnGenerationControl::new()
            .with_microfracture_polygon_vertex_count(2)
            .is_err());
        assert!(DfnGenerationControl::new()
            .with_microfracture_polygon_vertex_count(0)
            .is_ok());
        assert!(DfnGenerationControl::new()
            .with_microfracture_polygon_vertex_count(3)
            .is_ok());
    }

    #[test]
    fn negative_size_cutoff_is_rejected() {
        assert!(DfnGenerationControl::new()
            .with_minimum_size_cutoffs(-1.0, 0.0)
            .is_err());
    }
}
