//! The external trait boundary this core consumes: a per-gridblock
//! fracture set and its ordered dip sets. A production host implements
//! these against its own grid/rock-property model; this crate ships only
//! a `tests`-only fake used to exercise the geometry/topology engine
//! rather than importing a harness crate.

use crate::geometry::{PointIjk, PointXyz};
use crate::local::{LocalMacrofractureSegment, LocalMicrofracture};

/// The local propagation direction a macrofracture segment or a
/// gridblock-owned collection is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropagationDirection {
    IPlus,
    IMinus,
}

impl PropagationDirection {
    pub fn opposite(self) -> Self {
        match self {
            PropagationDirection::IPlus => PropagationDirection::IMinus,
            PropagationDirection::IMinus => PropagationDirection::IPlus,
        }
    }
}

/// The dip direction of a fracture relative to the gridblock's strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DipDirection {
    JPlus,
    JMinus,
}

/// A named gridblock boundary face, used to look up boundary corner
/// points for outer-tip bevelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridBoundary {
    IPlus,
    IMinus,
    JPlus,
    JMinus,
}

/// Supplies dip angle, aperture/compressibility helpers, stress-shadow
/// width, and L-time-to-real-time conversion for one dip set.
pub trait FractureDipSet {
    fn dip(&self) -> f64;
    fn mean_microfracture_aperture(&self, radius: f64) -> f64;
    fn microfracture_compressibility(&self, radius: f64) -> f64;
    fn mean_macrofracture_aperture(&self) -> f64;
    fn macrofracture_compressibility(&self) -> f64;
    fn mean_stress_shadow_width(&self, arg: f64) -> f64;
    /// Maps a per-timestep propagation-length coordinate to real time,
    /// given the nucleation timestep.
    fn convert_length_to_time(&self, length: f64, nucleation_timestep: u32) -> f64;
}

/// Supplies strike azimuth, IJK<->XYZ conversion, boundary corners, true
/// vertical thickness, and the per-direction collections that own the
/// local microfractures and segments nucleated in this gridblock.
pub trait GridblockFractureSet {
    fn strike(&self) -> f64;
    fn ijk_to_xyz(&self, p: PointIjk) -> PointXyz;
    fn xyz_to_ijk(&self, p: PointXyz) -> PointIjk;
    fn i_coordinate(&self, p: PointXyz) -> f64;
    fn j_coordinate(&self, p: PointXyz) -> f64;
    fn tvt_at_point(&self, p: PointXyz) -> f64;
    /// Four corner points of `boundary`; any entry may be absent when the
    /// gridblock has no neighbour on that face.
    fn boundary_corners(&self, boundary: GridBoundary) -> [Option<PointXyz>; 4];

    fn dip_set_count(&self) -> usize;
    fn dip_set(&self, index: usize) -> &dyn FractureDipSet;

    fn local_microfractures(&self) -> &[LocalMicrofracture];
    fn local_microfractures_mut(&mut self) -> &mut Vec<LocalMicrofracture>;
    fn local_macrofracture_segments(&self, dir: PropagationDirection) -> &[LocalMacrofractureSegment];
    fn local_macrofracture_segments_mut(
        &mut self,
        dir: PropagationDirection,
    ) -> &mut Vec<LocalMacrofractureSegment>;
}

#[cfg(test)]
pub mod fakes {
    use super::*;

    /// A single, isotropic dip set with constant aperture/compressibility,
    /// enough to exercise `PopulateData` without modelling real rock
    /// properties.
    pub struct FakeDipSet {
        pub dip: f64,
        pub micro_aperture: f64,
        pub micro_compressibility: f64,
        pub macro_aperture: f64,
        pub macro_compressibility: f64,
        pub stress_shadow_width: f64,
        pub time_per_length: f64,
    }

    impl Default for FakeDipSet {
        fn default() -> Self {
            Self {
                dip: std::f64::consts::FRAC_PI_2,
                micro_aperture: 1e-4,
                micro_compressibility: 1e-9,
                macro_aperture: 1e-3,
                macro_compressibility: 1e-9,
                stress_shadow_width: 1.0,
                time_per_length: 1.0,
            }
        }
    }

    impl FractureDipSet for FakeDipSet {
        fn dip(&self) -> f64 {
            self.dip
        }
        fn mean_microfracture_aperture(&self, _radius: f64) -> f64 {
            self.micro_aperture
        }
        fn microfracture_compressibility(&self, _radius: f64) -> f64 {
            self.micro_compressibility
        }
        fn mean_macrofracture_aperture(&self) -> f64 {
            self.macro_aperture
        }
        fn macrofracture_compressibility(&self) -> f64 {
            self.macro_compressibility
        }
        fn mean_stress_shadow_width(&self, _arg: f64) -> f64 {
            self.stress_shadow_width
        }
        fn convert_length_to_time(&self, length: f64, _nucleation_timestep: u32) -> f64 {
            length * self.time_per_length
        }
    }

    /// A flat, rectangular gridblock with strike along the global X axis,
    /// `I == x`, `J == y`, `K == z`, and a fixed true vertical thickness.
    /// Boundary corners are derived from `half_extent_i`/`half_extent_j`.
    pub struct FakeGridblock {
        pub strike: f64,
        pub tvt: f64,
        pub half_extent_i: f64,
        pub half_extent_j: f64,
        pub dip_sets: Vec<FakeDipSet>,
        pub microfractures: Vec<LocalMicrofracture>,
        pub segments_iplus: Vec<LocalMacrofractureSegment>,
        pub segments_iminus: Vec<LocalMacrofractureSegment>,
    }

    impl FakeGridblock {
        pub fn new(tvt: f64) -> Self {
            Self {
                strike: 0.0,
                tvt,
                half_extent_i: 1_000.0,
                half_extent_j: 1_000.0,
                dip_sets: vec![FakeDipSet::default()],
                microfractures: Vec::new(),
                segments_iplus: Vec::new(),
                segments_iminus: Vec::new(),
            }
        }
    }

    impl GridblockFractureSet for FakeGridblock {
        fn strike(&self) -> f64 {
            self.strike
        }

        fn ijk_to_xyz(&self, p: PointIjk) -> PointXyz {
            PointXyz::new(p.i, p.j, p.k)
        }

        fn xyz_to_ijk(&self, p: PointXyz) -> PointIjk {
            PointIjk::new(p.x, p.y, p.z)
        }

        fn i_coordinate(&self, p: PointXyz) -> f64 {
            p.x
        }

        fn j_coordinate(&self, p: PointXyz) -> f64 {
            p.y
        }

        fn tvt_at_point(&self, _p: PointXyz) -> f64 {
            self.tvt
        }

        fn boundary_corners(&self, boundary: GridBoundary) -> [Option<PointXyz>; 4] {
            let (i, j) = (self.half_extent_i, self.half_extent_j);
            let t = self.tvt;
            let quad = match boundary {
                GridBoundary::IPlus => (
                    PointXyz::new(i, -j, t / 2.0),
                    PointXyz::new(i, j, t / 2.0),
                    PointXyz::new(i, j, -t / 2.0),
                    PointXyz::new(i, -j, -t / 2.0),
                ),
                GridBoundary::IMinus => (
                    PointXyz::new(-i, j, t / 2.0),
                    PointXyz::new(-i, -j, t / 2.0),
                    PointXyz::new(-i, -j, -t / 2.0),
                    PointXyz::new(-i, j, -t / 2.0),
                ),
                GridBoundary::JPlus => (
                    PointXyz::new(-i, j, t / 2.0),
                    PointXyz::new(i, j, t / 2.0),
                    PointXyz::new(i, j, -t / 2.0),
                    PointXyz::new(-i, j, -t / 2.0),
                ),
                GridBoundary::JMinus => (
                    PointXyz::new(i, -j, t / 2.0),
                    PointXyz::new(-i, -j, t / 2.0),
                    PointXyz::new(-i, -j, -t / 2.0),
                    PointXyz::new(i, -j, -t / 2.0),
                ),
            };
            [Some(quad.0), Some(quad.1), Some(quad.2), Some(quad.3)]
        }

        fn dip_set_count(&self) -> usize {
            self.dip_sets.len()
        }

        fn dip_set(&self, index: usize) -> &dyn FractureDipSet {
            &self.dip_sets[index]
        }

        fn local_microfractures(&self) -> &[LocalMicrofracture] {
            &self.microfractures
        }

        fn local_microfractures_mut(&mut self) -> &mut Vec<LocalMicrofracture> {
            &mut self.microfractures
        }

        fn local_macrofracture_segments(&self, dir: PropagationDirection) -> &[LocalMacrofractureSegment] {
            match dir {
                PropagationDirection::IPlus => &self.segments_iplus,
                PropagationDirection::IMinus => &self.segments_iminus,
            }
        }

        fn local_macrofracture_segments_mut(
            &mut self,
            dir: PropagationDirection,
        ) -> &mut Vec<LocalMacrofractureSegment> {
            match dir {
                PropagationDirection::IPlus => &mut self.segments_iplus,
                PropagationDirection::IMinus => &mut self.segments_iminus,
            }
        }
    }
}
