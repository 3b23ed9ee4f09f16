//! Global (grid-level) macrofractures: the segment-corner reconstruction
//! engine (`PopulateData`), combination, tip classification, and output
//! projections. This is the hardest subsystem in the crate.

use nalgebra::Vector3;

use crate::arena::{Arena, Handle};
use crate::collaborators::PropagationDirection;
use crate::geometry::{compare_points, crossover_2d, crossover_3d, CrossoverParams, PointXyz, VectorXyz};
use crate::ids::MacroId;
use crate::local::{LocalMacrofractureSegment, SegmentNodeType};

/// A handle into a macrofracture's own [`Arena<PointXyz>`].
pub type CornerHandle = Handle<PointXyz>;

/// Classification of an outer tip, derived purely from the outer node's
/// [`SegmentNodeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FractureTipType {
    Propagating,
    StressShadow,
    Intersection,
    Convergence,
    OutOfBounds,
    Pinchout,
}

fn classify_tip(outer_type: SegmentNodeType) -> FractureTipType {
    match outer_type {
        SegmentNodeType::Propagating => FractureTipType::Propagating,
        SegmentNodeType::ConnectedStressShadow | SegmentNodeType::NonconnectedStressShadow => {
            FractureTipType::StressShadow
        }
        SegmentNodeType::Intersection => FractureTipType::Intersection,
        SegmentNodeType::Convergence => FractureTipType::Convergence,
        SegmentNodeType::NonconnectedGridblockBound => FractureTipType::OutOfBounds,
        SegmentNodeType::Relay => FractureTipType::StressShadow,
        SegmentNodeType::Pinchout => FractureTipType::Pinchout,
        SegmentNodeType::ConnectedGridblockBound | SegmentNodeType::NucleationPoint => {
            FractureTipType::OutOfBounds
        }
    }
}

fn tip_carries_terminating_ref(outer_type: SegmentNodeType) -> bool {
    matches!(
        outer_type,
        SegmentNodeType::ConnectedStressShadow
            | SegmentNodeType::Intersection
            | SegmentNodeType::Convergence
            | SegmentNodeType::Relay
    )
}

/// External per-segment properties `PopulateData` cannot derive on its
/// own: the dip set's aperture/compressibility and the owning
/// gridblock's strike/dip, supplied by the caller for each segment
/// (segments in one macrofracture may belong to different gridblocks).
#[derive(Debug, Clone, Copy)]
pub struct SegmentProperties {
    pub strike: f64,
    pub dip: f64,
    pub mean_aperture: f64,
    pub compressibility: f64,
}

/// The four cornerpoint handles of one segment, in the order
/// `[UpperInner, UpperOuter, LowerOuter, LowerInner]` conceptually; stored
/// as named fields here for clarity. `inner_centre`/`outer_centre` are
/// the raw (pre-bevel) node centrepoints, kept only as a stable reference
/// axis for the inversion-detection math in step 5/6 — they are not
/// shared or mutated by bevelling.
#[derive(Debug, Clone, Copy)]
struct SegmentCorners {
    upper_inner: CornerHandle,
    upper_outer: CornerHandle,
    lower_inner: CornerHandle,
    lower_outer: CornerHandle,
    inner_centre: PointXyz,
    outer_centre: PointXyz,
}

#[derive(Debug, Clone, Copy, Default)]
struct SegmentFlags {
    adjust_upper_inner: bool,
    adjust_lower_inner: bool,
    zero_length: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SegmentDerived {
    mean_aperture: f64,
    compressibility: f64,
    azimuth: f64,
    dip: f64,
}

#[derive(Debug, Clone, Default)]
struct DirectionData {
    segments: Vec<LocalMacrofractureSegment>,
    corners: Vec<SegmentCorners>,
    flags: Vec<SegmentFlags>,
    derived: Vec<SegmentDerived>,
    strike_half_length: f64,
    total_half_length: f64,
    tip_type: Option<FractureTipType>,
    tip_active: bool,
    terminating_fracture: MacroId,
}

/// Owns two ordered segment chains (one per [`PropagationDirection`]),
/// the per-macrofracture cornerpoint arena that realises the "shared
/// mutable cornerpoint" design, and the
/// derived geometry `PopulateData` produces.
#[derive(Debug, Clone)]
pub struct GlobalMacrofracture {
    id: MacroId,
    dip_set_index: usize,
    nucleation_real_time: f64,
    corner_arena: Arena<PointXyz>,
    iplus: DirectionData,
    iminus: DirectionData,
    centre_line: Vec<PointXyz>,
}

fn reference_axis(corners: &SegmentCorners) -> Vector3<f64> {
    let d = corners.outer_centre.to_vector3() - corners.inner_centre.to_vector3();
    if d.norm() > 1e-12 {
        d.normalize()
    } else {
        Vector3::new(1.0, 0.0, 0.0)
    }
}

fn weighted_point(a: PointXyz, weight_a: f64, b: PointXyz, weight_b: f64) -> PointXyz {
    PointXyz::new(
        a.x * weight_a + b.x * weight_b,
        a.y * weight_a + b.y * weight_b,
        a.z * weight_a + b.z * weight_b,
    )
}

impl GlobalMacrofracture {
    /// Constructs a new global macrofracture from a seed local segment and
    /// its freshly spawned mirror, given the seed's own
    /// cornerpoints already computed by its owning gridblock.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MacroId,
        dip_set_index: usize,
        nucleation_real_time: f64,
        seed: LocalMacrofractureSegment,
        seed_upper_inner: PointXyz,
        seed_upper_outer: PointXyz,
        seed_lower_inner: PointXyz,
        seed_lower_outer: PointXyz,
        seed_inner_centre: PointXyz,
        seed_outer_centre: PointXyz,
        properties: &mut dyn FnMut(&LocalMacrofractureSegment) -> SegmentProperties,
    ) -> Self {
        let mut arena = Arena::new();
        let ui = arena.insert(seed_upper_inner);
        let uo = arena.insert(seed_upper_outer);
        let li = arena.insert(seed_lower_inner);
        let lo = arena.insert(seed_lower_outer);

        let seed_dir = seed.local_propagation_direction;
        let mut seed = seed;
        seed.global_link = Some(id);
        let mut mirror = seed.create_mirror_segment();
        mirror.global_link = Some(id);

        let seed_corners = SegmentCorners {
            upper_inner: ui,
            upper_outer: uo,
            lower_inner: li,
            lower_outer: lo,
            inner_centre: seed_inner_centre,
            outer_centre: seed_outer_centre,
        };
        // The mirror is zero-length at the nucleation point, so its
        // corners literally share the seed's inner cornerpoint objects
        // rather than owning independent copies at the same position.
        let mirror_corners = SegmentCorners {
            upper_inner: ui,
            upper_outer: ui,
            lower_inner: li,
            lower_outer: li,
            inner_centre: seed_inner_centre,
            outer_centre: seed_inner_centre,
        };

        let mut dfn = Self {
            id,
            dip_set_index,
            nucleation_real_time,
            corner_arena: arena,
            iplus: DirectionData::default(),
            iminus: DirectionData::default(),
            centre_line: Vec::new(),
        };

        match seed_dir {
            PropagationDirection::IPlus => {
                dfn.iplus.segments.push(seed);
                dfn.iplus.corners.push(seed_corners);
                dfn.iminus.segments.push(mirror);
                dfn.iminus.corners.push(mirror_corners);
            }
            PropagationDirection::IMinus => {
                dfn.iminus.segments.push(seed);
                dfn.iminus.corners.push(seed_corners);
                dfn.iplus.segments.push(mirror);
                dfn.iplus.corners.push(mirror_corners);
            }
        }
        dfn.populate_data(properties);
        dfn
    }

    pub fn id(&self) -> MacroId {
        self.id
    }

    pub fn dip_set_index(&self) -> usize {
        self.dip_set_index
    }

    pub fn nucleation_real_time(&self) -> f64 {
        self.nucleation_real_time
    }

    pub fn segment_count(&self, dir: PropagationDirection) -> usize {
        self.direction(dir).segments.len()
    }

    fn direction(&self, dir: PropagationDirection) -> &DirectionData {
        match dir {
            PropagationDirection::IPlus => &self.iplus,
            PropagationDirection::IMinus => &self.iminus,
        }
    }

    fn direction_mut(&mut self, dir: PropagationDirection) -> &mut DirectionData {
        match dir {
            PropagationDirection::IPlus => &mut self.iplus,
            PropagationDirection::IMinus => &mut self.iminus,
        }
    }

    /// Appends a further segment to `dir`, sharing its inner cornerpoints
    /// with the current outer cornerpoints of that direction's chain.
    pub fn add_segment(
        &mut self,
        dir: PropagationDirection,
        mut segment: LocalMacrofractureSegment,
        upper_outer: PointXyz,
        lower_outer: PointXyz,
        outer_centre: PointXyz,
    ) {
        segment.global_link = Some(self.id);
        let data = self.direction_mut(dir);
        let prev = *data
            .corners
            .last()
            .expect("a direction always has at least its mirror segment");
        let inner_centre = prev.outer_centre;
        let corners = SegmentCorners {
            upper_inner: prev.upper_outer,
            upper_outer: self.corner_arena.insert(upper_outer),
            lower_inner: prev.lower_outer,
            lower_outer: self.corner_arena.insert(lower_outer),
            inner_centre,
            outer_centre,
        };
        let data = self.direction_mut(dir);
        data.segments.push(segment);
        data.corners.push(corners);
    }

    pub fn tip_type(&self, dir: PropagationDirection) -> Option<FractureTipType> {
        self.direction(dir).tip_type
    }

    pub fn tip_active(&self, dir: PropagationDirection) -> bool {
        self.direction(dir).tip_active
    }

    pub fn terminating_fracture(&self, dir: PropagationDirection) -> MacroId {
        self.direction(dir).terminating_fracture
    }

    pub fn strike_length(&self) -> f64 {
        self.iplus.strike_half_length + self.iminus.strike_half_length
    }

    pub fn total_length(&self) -> f64 {
        self.iplus.total_half_length + self.iminus.total_half_length
    }

    fn corner(&self, h: CornerHandle) -> PointXyz {
        *self
            .corner_arena
            .get(h)
            .expect("corner handle always valid within its own macrofracture's arena")
    }

    fn set_corner(&mut self, h: CornerHandle, p: PointXyz) {
        *self
            .corner_arena
            .get_mut(h)
            .expect("corner handle always valid within its own macrofracture's arena") = p;
    }

    /// Recomputes bevelling, inversion handling, tip classification, and
    /// centre-line for both directions.
    pub fn populate_data(&mut self, properties: &mut dyn FnMut(&LocalMacrofractureSegment) -> SegmentProperties) {
        self.reconstruct_direction(PropagationDirection::IPlus, properties);
        self.reconstruct_direction(PropagationDirection::IMinus, properties);
        self.adjust_nucleation_point();
        self.rebuild_centre_line();
    }

    fn reconstruct_direction(
        &mut self,
        dir: PropagationDirection,
        properties: &mut dyn FnMut(&LocalMacrofractureSegment) -> SegmentProperties,
    ) {
        let segments = self.direction(dir).segments.clone();
        let mut corners = self.direction(dir).corners.clone();
        let n = segments.len();
        let mut flags = vec![SegmentFlags::default(); n];

        // Step 2: bevel interior joints.
        let trim = CrossoverParams::default_trim();
        for k in 0..n.saturating_sub(1) {
            let upper_k = (self.corner(corners[k].upper_inner), self.corner(corners[k].upper_outer));
            let upper_k1 = (
                self.corner(corners[k + 1].upper_inner),
                self.corner(corners[k + 1].upper_outer),
            );
            let lower_k = (self.corner(corners[k].lower_inner), self.corner(corners[k].lower_outer));
            let lower_k1 = (
                self.corner(corners[k + 1].lower_inner),
                self.corner(corners[k + 1].lower_outer),
            );

            let relay_reverse = segments[k].is_relay() && !segments[k + 1].is_relay();
            let (u1, u2) = if relay_reverse { (upper_k1, upper_k) } else { (upper_k, upper_k1) };
            if let Some(p) = crossover_2d(u1, u2, trim) {
                self.set_corner(corners[k].upper_outer, p);
            }
            let (l1, l2) = if relay_reverse { (lower_k1, lower_k) } else { (lower_k, lower_k1) };
            if let Some(p) = crossover_2d(l1, l2, trim) {
                self.set_corner(corners[k].lower_outer, p);
            }
        }

        // Step 3: outer-tip bevel.
        if n > 0 {
            let last = n - 1;
            let outer_type = segments[last].outer_node_type();
            let upper_edge = (
                self.corner(corners[last].upper_inner),
                self.corner(corners[last].upper_outer),
            );
            let lower_edge = (
                self.corner(corners[last].lower_inner),
                self.corner(corners[last].lower_outer),
            );
            match outer_type {
                SegmentNodeType::Intersection | SegmentNodeType::Convergence | SegmentNodeType::Relay => {
                    if let Some(term) = segments[last].terminating_segment {
                        if let Some(p) = crossover_2d(upper_edge, term.upper_edge, trim) {
                            self.set_corner(corners[last].upper_outer, p);
                        }
                        if let Some(p) = crossover_2d(lower_edge, term.lower_edge, trim) {
                            self.set_corner(corners[last].lower_outer, p);
                        }
                    }
                }
                SegmentNodeType::NonconnectedGridblockBound => {
                    if let Some(boundary) = segments[last].boundary_termination {
                        let restrict = CrossoverParams::default_restrict();
                        for candidate in [boundary.upper_edge, boundary.left_half_upper, boundary.right_half_upper] {
                            if let Some(p) = crossover_2d(upper_edge, candidate, restrict) {
                                self.set_corner(corners[last].upper_outer, p);
                                break;
                            }
                        }
                        for candidate in [boundary.lower_edge, boundary.left_half_lower, boundary.right_half_lower] {
                            if let Some(p) = crossover_2d(lower_edge, candidate, restrict) {
                                self.set_corner(corners[last].lower_outer, p);
                                break;
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        // Step 4: tip classification.
        let (tip_type, terminating_fracture, tip_active) = if n > 0 {
            let last = &segments[n - 1];
            let outer_type = last.outer_node_type();
            let term = if tip_carries_terminating_ref(outer_type) {
                last.terminating_segment.map(|t| t.macro_id).unwrap_or(MacroId::NONE)
            } else {
                MacroId::NONE
            };
            (Some(classify_tip(outer_type)), term, last.is_active())
        } else {
            (None, MacroId::NONE, true)
        };

        // Step 5: inverted-join detection.
        for k in 0..n {
            if segments[k].outer_node_type() == SegmentNodeType::Relay {
                continue;
            }
            let axis = reference_axis(&corners[k]);
            let inner_ref = corners[k].inner_centre.to_vector3();
            let i_of = |p: PointXyz| (p.to_vector3() - inner_ref).dot(&axis);
            let upper_inner_i = i_of(self.corner(corners[k].upper_inner));
            let upper_outer_i = i_of(self.corner(corners[k].upper_outer));
            let lower_inner_i = i_of(self.corner(corners[k].lower_inner));
            let lower_outer_i = i_of(self.corner(corners[k].lower_outer));
            let orientation = segments[k].local_orientation();
            let inverted_upper = match orientation {
                PropagationDirection::IPlus => upper_outer_i <= upper_inner_i,
                PropagationDirection::IMinus => upper_outer_i >= upper_inner_i,
            };
            let inverted_lower = match orientation {
                PropagationDirection::IPlus => lower_outer_i <= lower_inner_i,
                PropagationDirection::IMinus => lower_outer_i >= lower_inner_i,
            };
            flags[k].adjust_upper_inner = inverted_upper;
            flags[k].adjust_lower_inner = inverted_lower;
        }
        // Second pass: replace flagged inner joints (k >= 1 only; the
        // nucleation-side joint of segment 0 is handled by
        // `adjust_nucleation_point`).
        for k in 1..n {
            let l_k = segments[k].total_length();
            let l_km1 = segments[k - 1].total_length();
            let denom = l_k + l_km1;
            if flags[k].adjust_upper_inner {
                let p_km1_inner = self.corner(corners[k - 1].upper_inner);
                let p_k_outer = self.corner(corners[k].upper_outer);
                let p = if denom == 0.0 {
                    p_km1_inner
                } else {
                    weighted_point(p_km1_inner, l_k / denom, p_k_outer, l_km1 / denom)
                };
                self.set_corner(corners[k].upper_inner, p);
            }
            if flags[k].adjust_lower_inner {
                let p_km1_inner = self.corner(corners[k - 1].lower_inner);
                let p_k_outer = self.corner(corners[k].lower_outer);
                let p = if denom == 0.0 {
                    p_km1_inner
                } else {
                    weighted_point(p_km1_inner, l_k / denom, p_k_outer, l_km1 / denom)
                };
                self.set_corner(corners[k].lower_inner, p);
            }
        }

        // Step 6: inverted relay segments.
        for k in 0..n {
            if !segments[k].is_relay() {
                continue;
            }
            let axis = reference_axis(&corners[k]);
            let upper_inner = self.corner(corners[k].upper_inner);
            let upper_outer = self.corner(corners[k].upper_outer);
            let lower_inner = self.corner(corners[k].lower_inner);
            let lower_outer = self.corner(corners[k].lower_outer);
            let dj_upper = (upper_outer.to_vector3() - upper_inner.to_vector3()).dot(&axis);
            let dj_lower = (lower_outer.to_vector3() - lower_inner.to_vector3()).dot(&axis);
            if dj_upper != 0.0 && dj_lower != 0.0 && dj_upper.signum() != dj_lower.signum() {
                std::mem::swap(&mut corners[k].lower_outer, &mut corners[k].lower_inner);
            }
        }

        // Step 8: per-segment derived data.
        let mut strike_half_length = 0.0;
        let mut total_half_length = 0.0;
        let mut derived = Vec::with_capacity(n);
        for k in 0..n {
            strike_half_length += segments[k].strike_length();
            total_half_length += segments[k].total_length();
            let zero_length = compare_points(self.corner(corners[k].upper_inner), self.corner(corners[k].upper_outer))
                && compare_points(self.corner(corners[k].lower_inner), self.corner(corners[k].lower_outer));
            flags[k].zero_length = zero_length;
            let props = properties(&segments[k]);
            derived.push(SegmentDerived {
                mean_aperture: props.mean_aperture,
                compressibility: props.compressibility,
                azimuth: props.strike,
                dip: props.dip,
            });
        }

        let data = self.direction_mut(dir);
        data.segments = segments;
        data.corners = corners;
        data.flags = flags;
        data.derived = derived;
        data.strike_half_length = strike_half_length;
        data.total_half_length = total_half_length;
        data.tip_type = tip_type;
        data.tip_active = tip_active;
        data.terminating_fracture = terminating_fracture;
    }

    /// Step 7: nucleation-point adjustment across both directions.
    fn adjust_nucleation_point(&mut self) {
        if self.iplus.segments.is_empty() || self.iminus.segments.is_empty() {
            return;
        }
        let trim = CrossoverParams::default_trim();
        let plus0 = self.iplus.corners[0];
        let minus0 = self.iminus.corners[0];
        let axis = reference_axis(&plus0);
        let nucleation_point = plus0.inner_centre.to_vector3();
        let i_of = |p: PointXyz| (p.to_vector3() - nucleation_point).dot(&axis);

        let plus_upper_outer = self.corner(plus0.upper_outer);
        let minus_upper_outer = self.corner(minus0.upper_outer);

        if i_of(plus_upper_outer) < i_of(minus_upper_outer) {
            let plus_upper_edge = (self.corner(plus0.upper_inner), plus_upper_outer);
            let minus_upper_edge = (self.corner(minus0.upper_inner), minus_upper_outer);
            let new_upper =
                crossover_3d(plus_upper_edge, minus_upper_edge, trim).unwrap_or_else(|| self.corner(plus0.upper_inner));
            self.set_corner(plus0.upper_outer, new_upper);
            self.set_corner(minus0.upper_outer, new_upper);

            let plus_lower_edge = (self.corner(plus0.lower_inner), self.corner(plus0.lower_outer));
            let minus_lower_edge = (self.corner(minus0.lower_inner), self.corner(minus0.lower_outer));
            let new_lower =
                crossover_3d(plus_lower_edge, minus_lower_edge, trim).unwrap_or_else(|| self.corner(plus0.lower_inner));
            self.set_corner(plus0.lower_outer, new_lower);
            self.set_corner(minus0.lower_outer, new_lower);
        }

        let l_plus = self.iplus.segments[0].total_length();
        let l_minus = self.iminus.segments[0].total_length();
        let denom = l_plus + l_minus;
        let (w_plus, w_minus) = if denom == 0.0 { (0.5, 0.5) } else { (l_minus / denom, l_plus / denom) };

        if self.iplus.flags[0].adjust_upper_inner || self.iminus.flags[0].adjust_upper_inner {
            let p_plus_outer = self.corner(self.iplus.corners[0].upper_outer);
            let p_minus_outer = self.corner(self.iminus.corners[0].upper_outer);
            let p = weighted_point(p_plus_outer, w_plus, p_minus_outer, w_minus);
            self.set_corner(self.iplus.corners[0].upper_inner, p);
            self.set_corner(self.iminus.corners[0].upper_inner, p);
        }
        if self.iplus.flags[0].adjust_lower_inner || self.iminus.flags[0].adjust_lower_inner {
            let p_plus_outer = self.corner(self.iplus.corners[0].lower_outer);
            let p_minus_outer = self.corner(self.iminus.corners[0].lower_outer);
            let p = weighted_point(p_plus_outer, w_plus, p_minus_outer, w_minus);
            self.set_corner(self.iplus.corners[0].lower_inner, p);
            self.set_corner(self.iminus.corners[0].lower_inner, p);
        }
    }

    /// Step 9: rebuild the centre-line, outermost IMinus tip -> nucleation
    /// -> outermost IPlus tip, suppressing consecutive duplicates.
    fn rebuild_centre_line(&mut self) {
        let mut raw = Vec::new();
        for corners in self.iminus.corners.iter().rev() {
            raw.push(corners.outer_centre);
            raw.push(corners.inner_centre);
        }
        for corners in self.iplus.corners.iter() {
            raw.push(corners.inner_centre);
            raw.push(corners.outer_centre);
        }
        let mut line: Vec<PointXyz> = Vec::with_capacity(raw.len());
        for p in raw {
            if line.last().map_or(true, |last| !compare_points(*last, p)) {
                line.push(p);
            }
        }
        self.centre_line = line;
    }

    fn quad(&self, corners: &SegmentCorners) -> [PointXyz; 4] {
        [
            self.corner(corners.upper_inner),
            self.corner(corners.upper_outer),
            self.corner(corners.lower_outer),
            self.corner(corners.lower_inner),
        ]
    }

    /// Deep-copied list of non-zero-length quadrilaterals ordered
    /// outer-IMinus -> nucleation -> outer-IPlus.
    pub fn fracture_segments_in_xyz(&self) -> Vec<[PointXyz; 4]> {
        let mut out = Vec::new();
        for (seg_corners, flags) in self.iminus.corners.iter().zip(self.iminus.flags.iter()).rev() {
            if !flags.zero_length {
                out.push(self.quad(seg_corners));
            }
        }
        for (seg_corners, flags) in self.iplus.corners.iter().zip(self.iplus.flags.iter()) {
            if !flags.zero_length {
                out.push(self.quad(seg_corners));
            }
        }
        out
    }

    /// Same order as [`Self::fracture_segments_in_xyz`], each quadrilateral
    /// split into triangles `(0,1,2)` and `(2,3,0)`.
    pub fn triangular_fracture_segments_in_xyz(&self) -> Vec<[PointXyz; 3]> {
        self.fracture_segments_in_xyz()
            .into_iter()
            .flat_map(|q| [[q[0], q[1], q[2]], [q[2], q[3], q[0]]])
            .collect()
    }

    /// A single boundary polyline for the whole fracture: IPlus-top ->
    /// IPlus-bottom -> IMinus-bottom -> IMinus-top, duplicate-suppressed.
    pub fn cornerpoints(&self) -> Vec<PointXyz> {
        let mut raw = Vec::new();
        for c in self.iplus.corners.iter() {
            raw.push(self.corner(c.upper_inner));
            raw.push(self.corner(c.upper_outer));
        }
        for c in self.iplus.corners.iter().rev() {
            raw.push(self.corner(c.lower_outer));
            raw.push(self.corner(c.lower_inner));
        }
        for c in self.iminus.corners.iter() {
            raw.push(self.corner(c.lower_inner));
            raw.push(self.corner(c.lower_outer));
        }
        for c in self.iminus.corners.iter().rev() {
            raw.push(self.corner(c.upper_outer));
            raw.push(self.corner(c.upper_inner));
        }
        let mut out: Vec<PointXyz> = Vec::with_capacity(raw.len());
        for p in raw {
            if out.last().map_or(true, |last| !compare_points(*last, p)) {
                out.push(p);
            }
        }
        out
    }

    /// Per-segment plane normal, ordered the same way as
    /// [`Self::fracture_segments_in_xyz`] (including zero-length segments,
    /// unlike the mesh projections, since a normal is still well-defined
    /// for a degenerate quad's azimuth/dip).
    pub fn segment_normal_vectors(&self) -> Vec<VectorXyz> {
        let mut out = Vec::new();
        for d in self.iminus.derived.iter().rev() {
            out.push(VectorXyz::normal_to_plane(d.azimuth, d.dip));
        }
        for d in self.iplus.derived.iter() {
            out.push(VectorXyz::normal_to_plane(d.azimuth, d.dip));
        }
        out
    }

    pub fn centre_line(&self) -> &[PointXyz] {
        &self.centre_line
    }

    /// Splices `other` into `self` at `tip_to_add_onto`.
    /// A no-op when `other` is (by id) the same macrofracture as `self`.
    pub fn combine_macrofractures(
        &mut self,
        tip_to_add_onto: PropagationDirection,
        other: &mut GlobalMacrofracture,
        other_tip: PropagationDirection,
        properties: &mut dyn FnMut(&LocalMacrofractureSegment) -> SegmentProperties,
    ) {
        if other.id == self.id {
            return;
        }
        let invert = other_tip != tip_to_add_onto;

        // The donor's `other_tip` side is walked outer -> inner (it is
        // being welded tip-to-tip onto `self`); the donor's remaining
        // side keeps its natural inner -> outer order, continuing the
        // chain outward past where the donor's own nucleation point was.
        self.splice_in(tip_to_add_onto, other, other_tip, true, invert);
        self.splice_in(tip_to_add_onto.opposite(), other, other_tip.opposite(), false, invert);

        other.iplus = DirectionData::default();
        other.iminus = DirectionData::default();
        other.corner_arena = Arena::new();
        other.centre_line.clear();

        self.populate_data(properties);
    }

    /// Appends the donor's `donor_dir` chain onto `self`'s `target`
    /// chain. `reverse` walks the donor outer -> inner (the side being
    /// welded tip-to-tip); `!reverse` keeps the donor's natural inner ->
    /// outer order (the side continuing the chain outward). `invert`
    /// flips each donor segment's inner/outer sense, applied whenever the
    /// donor tip being attached doesn't already match `target`.
    fn splice_in(
        &mut self,
        target: PropagationDirection,
        other: &mut GlobalMacrofracture,
        donor_dir: PropagationDirection,
        reverse: bool,
        invert: bool,
    ) {
        let donor_segments = other.direction(donor_dir).segments.clone();
        let donor_corners = other.direction(donor_dir).corners.clone();
        if donor_segments.is_empty() {
            return;
        }

        let order: Vec<usize> = if reverse {
            (0..donor_segments.len()).rev().collect()
        } else {
            (0..donor_segments.len()).collect()
        };

        let mut handle_map: std::collections::HashMap<usize, CornerHandle> = std::collections::HashMap::new();
        let mut migrate = |arena: &mut Arena<PointXyz>, donor_arena: &Arena<PointXyz>, h: CornerHandle, map: &mut std::collections::HashMap<usize, CornerHandle>| -> CornerHandle {
            let key = h.index();
            if let Some(existing) = map.get(&key) {
                *existing
            } else {
                let value = *donor_arena.get(h).expect("donor corner handle always valid");
                let new_handle = arena.insert(value);
                map.insert(key, new_handle);
                new_handle
            }
        };

        let mut appended_segments = Vec::with_capacity(donor_segments.len());
        let mut appended_corners = Vec::with_capacity(donor_corners.len());
        for &idx in order.iter() {
            let mut seg = donor_segments[idx].clone();
            if invert {
                seg.swap_nodes();
            }
            seg.global_link = Some(self.id);
            let c = donor_corners[idx];
            let mut new_corners = SegmentCorners {
                upper_inner: migrate(&mut self.corner_arena, &other.corner_arena, c.upper_inner, &mut handle_map),
                upper_outer: migrate(&mut self.corner_arena, &other.corner_arena, c.upper_outer, &mut handle_map),
                lower_inner: migrate(&mut self.corner_arena, &other.corner_arena, c.lower_inner, &mut handle_map),
                lower_outer: migrate(&mut self.corner_arena, &other.corner_arena, c.lower_outer, &mut handle_map),
                inner_centre: c.inner_centre,
                outer_centre: c.outer_centre,
            };
            if invert {
                std::mem::swap(&mut new_corners.upper_inner, &mut new_corners.upper_outer);
                std::mem::swap(&mut new_corners.lower_inner, &mut new_corners.lower_outer);
                std::mem::swap(&mut new_corners.inner_centre, &mut new_corners.outer_centre);
            }
            appended_segments.push(seg);
            appended_corners.push(new_corners);
        }

        // Weld the boundary joint to self's existing chain end, if any.
        let data = self.direction_mut(target);
        if let Some(existing_last) = data.corners.last() {
            appended_corners[0].upper_inner = existing_last.upper_outer;
            appended_corners[0].lower_inner = existing_last.lower_outer;
        }
        data.segments.extend(appended_segments);
        data.corners.extend(appended_corners);
    }
}
