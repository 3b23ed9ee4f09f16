//! Local (gridblock-owned) microfractures.

use crate::collaborators::{DipDirection, FractureDipSet, GridblockFractureSet};
use crate::geometry::{wrap_azimuth, PointIjk, PointXyz};
use crate::ids::MicroId;

/// A penny-shaped, layer-bound microfracture, owned by the gridblock it
/// nucleated in. Mutated in place by the external propagation solver
/// (`centre`, `radius`, `active`); `global_link` is the non-owning
/// back-reference to the snapshot [`crate::global::GlobalMicrofracture`]
/// created for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMicrofracture {
    pub centre: PointIjk,
    pub radius: f64,
    pub dip_set_index: usize,
    pub dip_direction: DipDirection,
    pub active: bool,
    pub nucleated_macrofracture: bool,
    pub nucleation_l_time: f64,
    pub nucleation_timestep: u32,
    pub global_link: Option<MicroId>,
}

impl LocalMicrofracture {
    /// Nucleates a new microfracture at an in-layer `centre` (`K` is not
    /// forced to zero here; callers that nucleate at the layer mid-plane
    /// should pass `PointIjk::at_nucleation`).
    pub fn new(
        centre: PointIjk,
        radius: f64,
        dip_set_index: usize,
        dip_direction: DipDirection,
        nucleation_l_time: f64,
        nucleation_timestep: u32,
    ) -> Self {
        Self {
            centre,
            radius,
            dip_set_index,
            dip_direction,
            active: true,
            nucleated_macrofracture: false,
            nucleation_l_time,
            nucleation_timestep,
            global_link: None,
        }
    }

    /// Nucleates from an XYZ point by converting through the gridblock.
    pub fn from_xyz(
        gridblock: &dyn GridblockFractureSet,
        centre_xyz: PointXyz,
        radius: f64,
        dip_set_index: usize,
        dip_direction: DipDirection,
        nucleation_l_time: f64,
        nucleation_timestep: u32,
    ) -> Self {
        Self::new(
            gridblock.xyz_to_ijk(centre_xyz),
            radius,
            dip_set_index,
            dip_direction,
            nucleation_l_time,
            nucleation_timestep,
        )
    }

    pub fn dip(&self, dip_set: &dyn FractureDipSet) -> f64 {
        dip_set.dip()
    }

    /// Azimuth derived from the gridblock's strike, offset by `+-pi/2`
    /// depending on dip direction, wrapped to `[0, 2*pi)`.
    pub fn azimuth(&self, strike: f64) -> f64 {
        let offset = match self.dip_direction {
            DipDirection::JPlus => std::f64::consts::FRAC_PI_2,
            DipDirection::JMinus => -std::f64::consts::FRAC_PI_2,
        };
        wrap_azimuth(strike + offset)
    }

    /// Real-time nucleation instant, via the dip set's length-to-time
    /// conversion evaluated at zero propagation length.
    pub fn nucleation_real_time(&self, dip_set: &dyn FractureDipSet) -> f64 {
        dip_set.convert_length_to_time(self.nucleation_l_time, self.nucleation_timestep)
    }

    pub fn centre_point_in_xyz(&self, gridblock: &dyn GridblockFractureSet) -> PointXyz {
        gridblock.ijk_to_xyz(self.centre)
    }

    /// Marks this microfracture as having nucleated a macrofracture; it is
    /// evicted from the owning gridblock and the DFN on the next update.
    pub fn mark_nucleated_macrofracture(&mut self) {
        self.nucleated_macrofracture = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::FakeDipSet;

    #[test]
    fn azimuth_offsets_by_dip_direction_and_wraps() {
        let mut m = LocalMicrofracture::new(
            PointIjk::at_nucleation(0.0, 0.0),
            1.0,
            0,
            DipDirection::JPlus,
            0.0,
            0,
        );
        let az_plus = m.azimuth(0.0);
        assert!((az_plus - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        m.dip_direction = DipDirection::JMinus;
        let az_minus = m.azimuth(0.0);
        assert!((az_minus - (std::f64::consts::TAU - std::f64::consts::FRAC_PI_2)).abs() < 1e-12);
    }

    #[test]
    fn nucleation_real_time_uses_dip_set_conversion() {
        let dip_set = FakeDipSet {
            time_per_length: 2.0,
            ..Default::default()
        };
        let m = LocalMicrofracture::new(
            PointIjk::at_nucleation(0.0, 0.0),
            1.0,
            0,
            DipDirection::JPlus,
            3.0,
            0,
        );
        assert_eq!(m.nucleation_real_time(&dip_set), 6.0);
    }

    #[test]
    fn marking_nucleated_sets_flag() {
        let mut m = LocalMicrofracture::new(
            PointIjk::at_nucleation(0.0, 0.0),
            1.0,
            0,
            DipDirection::JPlus,
            0.0,
            0,
        );
        assert!(!m.nucleated_macrofracture);
        m.mark_nucleated_macrofracture();
        assert!(m.nucleated_macrofracture);
    }
}
