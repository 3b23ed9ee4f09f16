//! Global (grid-level) microfractures: an XYZ snapshot of one local
//! microfracture.

use crate::collaborators::{FractureDipSet, GridblockFractureSet};
use crate::geometry::PointXyz;
use crate::ids::MicroId;
use crate::local::LocalMicrofracture;

/// A snapshot of one [`LocalMicrofracture`] in the grid's XYZ frame.
/// Immutable fields are fixed at construction; the rest is refreshed from
/// the linked local by [`GlobalMicrofracture::populate_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMicrofracture {
    id: MicroId,
    dip_set_index: usize,
    azimuth: f64,
    dip: f64,
    nucleation_real_time: f64,
    pub radius: f64,
    pub centre: PointXyz,
    pub active: bool,
    pub nucleated_macrofracture: bool,
    pub aperture: f64,
    pub compressibility: f64,
}

impl GlobalMicrofracture {
    pub fn new(
        id: MicroId,
        local: &LocalMicrofracture,
        gridblock: &dyn GridblockFractureSet,
        dip_set: &dyn FractureDipSet,
    ) -> Self {
        let mut global = Self {
            id,
            dip_set_index: local.dip_set_index,
            azimuth: local.azimuth(gridblock.strike()),
            dip: dip_set.dip(),
            nucleation_real_time: local.nucleation_real_time(dip_set),
            radius: 0.0,
            centre: PointXyz::new(0.0, 0.0, 0.0),
            active: true,
            nucleated_macrofracture: false,
            aperture: 0.0,
            compressibility: 0.0,
        };
        global.populate_data(local, gridblock, dip_set);
        global
    }

    pub fn id(&self) -> MicroId {
        self.id
    }

    pub fn dip_set_index(&self) -> usize {
        self.dip_set_index
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn dip(&self) -> f64 {
        self.dip
    }

    pub fn nucleation_real_time(&self) -> f64 {
        self.nucleation_real_time
    }

    /// Refreshes the mutable fields from the linked local microfracture.
    pub fn populate_data(
        &mut self,
        local: &LocalMicrofracture,
        gridblock: &dyn GridblockFractureSet,
        dip_set: &dyn FractureDipSet,
    ) {
        self.radius = local.radius;
        self.centre = local.centre_point_in_xyz(gridblock);
        self.active = local.active;
        self.nucleated_macrofracture = local.nucleated_macrofracture;
        self.aperture = dip_set.mean_microfracture_aperture(local.radius);
        self.compressibility = dip_set.microfracture_compressibility(local.radius);
    }

    /// `n` equally spaced perimeter points of the tilted disc: `I` along
    /// strike, `J` along the dip direction projected by `cos(dip)`, `Z`
    /// offset by `sin(dip)`.
    pub fn fracture_cornerpoints_in_xyz(&self, n: usize) -> Vec<PointXyz> {
        if n == 0 {
            return Vec::new();
        }
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_dip, cos_dip) = self.dip.sin_cos();
        (0..n)
            .map(|k| {
                let theta = std::f64::consts::TAU * (k as f64) / (n as f64);
                let local_i = self.radius * theta.cos();
                let local_j = self.radius * theta.sin() * cos_dip;
                let local_z = self.radius * theta.sin() * sin_dip;
                PointXyz::new(
                    self.centre.x + local_i * cos_az - local_j * sin_az,
                    self.centre.y + local_i * sin_az + local_j * cos_az,
                    self.centre.z + local_z,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::{FakeDipSet, FakeGridblock};
    use crate::collaborators::DipDirection;
    use crate::geometry::PointIjk;

    #[test]
    fn populate_data_refreshes_mutable_fields_from_local() {
        let gridblock = FakeGridblock::new(10.0);
        let dip_set = FakeDipSet::default();
        let mut local = LocalMicrofracture::new(
            PointIjk::at_nucleation(1.0, 2.0),
            5.0,
            0,
            DipDirection::JPlus,
            0.0,
            0,
        );
        let mut global = GlobalMicrofracture::new(MicroId(1), &local, &gridblock, &dip_set);
        assert_eq!(global.radius, 5.0);
        assert_eq!(global.centre, PointXyz::new(1.0, 2.0, 0.0));

        local.radius = 8.0;
        local.mark_nucleated_macrofracture();
        global.populate_data(&local, &gridblock, &dip_set);
        assert_eq!(global.radius, 8.0);
        assert!(global.nucleated_macrofracture);
    }

    #[test]
    fn fracture_cornerpoints_produces_requested_count() {
        let gridblock = FakeGridblock::new(10.0);
        let dip_set = FakeDipSet::default();
        let local = LocalMicrofracture::new(
            PointIjk::at_nucleation(0.0, 0.0),
            3.0,
            0,
            DipDirection::JPlus,
            0.0,
            0,
        );
        let global = GlobalMicrofracture::new(MicroId(1), &local, &gridblock, &dip_set);
        let pts = global.fracture_cornerpoints_in_xyz(8);
        assert_eq!(pts.len(), 8);
        for p in &pts {
            let d = ((p.x - global.centre.x).powi(2) + (p.y - global.centre.y).powi(2)).sqrt();
            assert!(d <= global.radius + 1e-9);
        }
    }
}
