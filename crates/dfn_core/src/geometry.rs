//! Geometry primitives: points, vectors, and line-crossover routines.
//!
//! These are the leaves of the dependency graph: everything else in this
//! crate (local/global fracture primitives, the `PopulateData`
//! reconstruction) is built on top of `PointXyz`, `PointIjk`, `VectorXyz`,
//! and the crossover routines defined here.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A mutable point in the global (grid) XYZ coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointXyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PointXyz {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector3(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector3(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Exact equality after rounding each coordinate to single precision.
/// Used wherever single-precision coordinate equality is required (zero-
/// length flags, centre-line duplicate suppression).
pub fn compare_points(a: PointXyz, b: PointXyz) -> bool {
    a.x as f32 == b.x as f32 && a.y as f32 == b.y as f32 && a.z as f32 == b.z as f32
}

/// A mutable point in a gridblock's local in-layer coordinate frame: `I`
/// along strike, `J` across strike, `K` vertical. `K == 0.0` is the layer
/// mid-plane; fractures always nucleate at `K = 0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointIjk {
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

impl PointIjk {
    pub fn new(i: f64, j: f64, k: f64) -> Self {
        Self { i, j, k }
    }

    pub fn at_nucleation(i: f64, j: f64) -> Self {
        Self::new(i, j, 0.0)
    }
}

/// A 3D vector with the trimmed trigonometric helpers the core uses to
/// avoid propagating microscopic noise from near-zero angles into the
/// geometry it drives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorXyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl VectorXyz {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The outward unit normal of a plane with the given `azimuth` (strike
    /// direction measured from the J axis, radians) and `dip` (radians
    /// from horizontal).
    pub fn normal_to_plane(azimuth: f64, dip: f64) -> VectorXyz {
        let (sin_dip, cos_dip) = dip.sin_cos();
        let (sin_az, cos_az) = azimuth.sin_cos();
        VectorXyz::new(sin_dip * cos_az, sin_dip * sin_az, cos_dip)
    }
}

/// `arg.sin()`, clamped to `0.0` when `|arg| < epsilon`.
pub fn sin_trim(arg: f64, epsilon: f64) -> f64 {
    if arg.abs() < epsilon {
        0.0
    } else {
        arg.sin()
    }
}

/// `arg.cos()`, clamped to `0.0` when `|arg - pi/2|` (mod pi) is within
/// `epsilon` of zero.
pub fn cos_trim(arg: f64, epsilon: f64) -> f64 {
    let value = arg.cos();
    if value.abs() < epsilon {
        0.0
    } else {
        value
    }
}

/// Wraps an azimuth into `[0, 2*pi)`.
pub fn wrap_azimuth(azimuth: f64) -> f64 {
    let two_pi = std::f64::consts::TAU;
    let wrapped = azimuth % two_pi;
    if wrapped < 0.0 {
        wrapped + two_pi
    } else {
        wrapped
    }
}

/// Selects whether a crossover may be extrapolated beyond the two input
/// lines' endpoints (`Trim`) or must fall within them (`Restrict`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverMode {
    Trim,
    Restrict,
}

/// Tolerances controlling a crossover computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverParams {
    pub mode: CrossoverMode,
    /// How far past a line's own extent (as a fraction of its length) the
    /// crossover point may land, in `Trim` mode.
    pub extension_ratio: f64,
    /// Minimum angle (radians) between the two lines for a crossover to
    /// be considered defined.
    pub angular_tolerance: f64,
}

impl CrossoverParams {
    /// The default bevelling tolerances: an extension ratio of 1.0 and an
    /// angular tolerance of about 1 degree.
    pub fn default_trim() -> Self {
        Self {
            mode: CrossoverMode::Trim,
            extension_ratio: 1.0,
            angular_tolerance: 0.02,
        }
    }

    pub fn default_restrict() -> Self {
        Self {
            mode: CrossoverMode::Restrict,
            extension_ratio: 1.0,
            angular_tolerance: 0.02,
        }
    }
}

fn within_bounds(t: f64, params: &CrossoverParams) -> bool {
    match params.mode {
        CrossoverMode::Trim => t >= -params.extension_ratio && t <= 1.0 + params.extension_ratio,
        CrossoverMode::Restrict => (0.0..=1.0).contains(&t),
    }
}

/// Intersects two lines projected onto the XY plane, each given as
/// `(start, end)`. Returns `None` when the lines are parallel, the angle
/// between them is below `params.angular_tolerance`, either line has zero
/// length, or the crossover parameter falls outside the bounds allowed by
/// `params.mode`.
///
/// The returned point's Z is linearly interpolated along `line1` at the
/// crossover parameter; callers that need the non-relay side's
/// perspective get it by choosing which line is passed as `line1`.
pub fn crossover_2d(
    line1: (PointXyz, PointXyz),
    line2: (PointXyz, PointXyz),
    params: CrossoverParams,
) -> Option<PointXyz> {
    let (p1, p2) = line1;
    let (p3, p4) = line2;

    let d1x = p2.x - p1.x;
    let d1y = p2.y - p1.y;
    let d2x = p4.x - p3.x;
    let d2y = p4.y - p3.y;

    let len1 = (d1x * d1x + d1y * d1y).sqrt();
    let len2 = (d2x * d2x + d2y * d2y).sqrt();
    if len1 == 0.0 || len2 == 0.0 {
        return None;
    }

    let denom = d1x * d2y - d1y * d2x;
    // sin(angle between directions) * len1 * len2 == |denom|
    let sin_angle = (denom / (len1 * len2)).abs().min(1.0);
    let angle = sin_angle.asin();
    if angle < params.angular_tolerance {
        return None;
    }

    let t1 = ((p3.x - p1.x) * d2y - (p3.y - p1.y) * d2x) / denom;
    let t2 = ((p3.x - p1.x) * d1y - (p3.y - p1.y) * d1x) / denom;

    if !within_bounds(t1, &params) || !within_bounds(t2, &params) {
        return None;
    }

    Some(PointXyz::new(
        p1.x + t1 * d1x,
        p1.y + t1 * d1y,
        p1.z + t1 * (p2.z - p1.z),
    ))
}

/// Closest-approach crossover of two 3D lines, each given as `(start,
/// end)`. Returns `None` for parallel lines, a sub-tolerance angle, or a
/// zero-length input. The returned point is the midpoint of the shortest
/// segment joining the two lines at their respective crossover
/// parameters, which collapses to a true intersection whenever the lines
/// are coplanar and not parallel.
pub fn crossover_3d(
    line1: (PointXyz, PointXyz),
    line2: (PointXyz, PointXyz),
    params: CrossoverParams,
) -> Option<PointXyz> {
    let (p1, p2) = line1;
    let (p3, p4) = line2;

    let d1 = p2.to_vector3() - p1.to_vector3();
    let d2 = p4.to_vector3() - p3.to_vector3();
    let len1 = d1.norm();
    let len2 = d2.norm();
    if len1 == 0.0 || len2 == 0.0 {
        return None;
    }

    let cross = d1.cross(&d2);
    let sin_angle = (cross.norm() / (len1 * len2)).min(1.0);
    let angle = sin_angle.asin();
    if angle < params.angular_tolerance {
        return None;
    }

    let r = p1.to_vector3() - p3.to_vector3();
    let a = d1.dot(&d1);
    let b = d1.dot(&d2);
    let c = d2.dot(&d2);
    let d = d1.dot(&r);
    let e = d2.dot(&r);

    let denom = a * c - b * b;
    if denom.abs() < 1e-12 {
        return None;
    }
    let t1 = (b * e - c * d) / denom;
    let t2 = (a * e - b * d) / denom;

    if !within_bounds(t1, &params) || !within_bounds(t2, &params) {
        return None;
    }

    let closest1 = p1.to_vector3() + d1 * t1;
    let closest2 = p3.to_vector3() + d2 * t2;
    Some(PointXyz::from_vector3((closest1 + closest2) * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_points_rounds_to_single_precision() {
        let a = PointXyz::new(1.0, 2.0, 3.0);
        let b = PointXyz::new(1.0 + 1e-10, 2.0, 3.0);
        assert!(compare_points(a, b));

        let c = PointXyz::new(1.001, 2.0, 3.0);
        assert!(!compare_points(a, c));
    }

    #[test]
    fn wrap_azimuth_stays_in_range() {
        for raw in [-10.0, -0.1, 0.0, 3.5, 6.5, 20.0] {
            let wrapped = wrap_azimuth(raw);
            assert!((0.0..std::f64::consts::TAU).contains(&wrapped));
        }
    }

    #[test]
    fn sin_trim_clamps_near_zero() {
        assert_eq!(sin_trim(1e-9, 1e-6), 0.0);
        assert!((sin_trim(std::f64::consts::FRAC_PI_2, 1e-6) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn crossover_2d_finds_perpendicular_intersection() {
        let line1 = (PointXyz::new(0.0, 0.0, 0.0), PointXyz::new(10.0, 0.0, 2.0));
        let line2 = (PointXyz::new(5.0, -5.0, 0.0), PointXyz::new(5.0, 5.0, 0.0));
        let crossing = crossover_2d(line1, line2, CrossoverParams::default_trim())
            .expect("perpendicular lines should cross");
        assert!((crossing.x - 5.0).abs() < 1e-9);
        assert!((crossing.y - 0.0).abs() < 1e-9);
        // Z interpolated along line1 at t=0.5.
        assert!((crossing.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn crossover_2d_returns_none_for_parallel_lines() {
        let line1 = (PointXyz::new(0.0, 0.0, 0.0), PointXyz::new(10.0, 0.0, 0.0));
        let line2 = (PointXyz::new(0.0, 1.0, 0.0), PointXyz::new(10.0, 1.0, 0.0));
        assert!(crossover_2d(line1, line2, CrossoverParams::default_trim()).is_none());
    }

    #[test]
    fn crossover_2d_restrict_mode_rejects_out_of_bounds() {
        let line1 = (PointXyz::new(0.0, 0.0, 0.0), PointXyz::new(1.0, 0.0, 0.0));
        let line2 = (PointXyz::new(5.0, -5.0, 0.0), PointXyz::new(5.0, 5.0, 0.0));
        // Lines cross at x=5, far outside line1's [0,1] extent.
        assert!(crossover_2d(line1, line2, CrossoverParams::default_restrict()).is_none());
    }

    #[test]
    fn crossover_2d_zero_length_line_has_no_crossover() {
        let degenerate = (PointXyz::new(1.0, 1.0, 0.0), PointXyz::new(1.0, 1.0, 0.0));
        let other = (PointXyz::new(0.0, 0.0, 0.0), PointXyz::new(2.0, 2.0, 0.0));
        assert!(crossover_2d(degenerate, other, CrossoverParams::default_trim()).is_none());
    }

    #[test]
    fn crossover_3d_intersects_coplanar_lines() {
        let line1 = (PointXyz::new(0.0, 0.0, 0.0), PointXyz::new(10.0, 0.0, 10.0));
        let line2 = (PointXyz::new(5.0, -5.0, 5.0), PointXyz::new(5.0, 5.0, 5.0));
        let crossing = crossover_3d(line1, line2, CrossoverParams::default_trim())
            .expect("coplanar non-parallel lines should cross");
        assert!((crossing.x - 5.0).abs() < 1e-9);
        assert!((crossing.y - 0.0).abs() < 1e-9);
        assert!((crossing.z - 5.0).abs() < 1e-9);
    }

    #[test]
    fn normal_to_plane_is_unit_length() {
        let n = VectorXyz::normal_to_plane(0.3, 1.1);
        let len = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
        assert!((len - 1.0).abs() < 1e-12);
    }
}
