//! Local (gridblock-owned) macrofracture segments and the segment-node
//! state machine.

use crate::collaborators::{
    DipDirection, FractureDipSet, GridBoundary, GridblockFractureSet, PropagationDirection,
};
use crate::geometry::{wrap_azimuth, PointIjk, PointXyz, VectorXyz};
use crate::ids::MacroId;

/// The state of one end of a [`LocalMacrofractureSegment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentNodeType {
    NucleationPoint,
    Propagating,
    ConnectedStressShadow,
    NonconnectedStressShadow,
    Intersection,
    Convergence,
    ConnectedGridblockBound,
    NonconnectedGridblockBound,
    Relay,
    Pinchout,
}

/// A snapshot of the handful of fields `PopulateData` needs from a
/// segment in a different gridblock that this segment's tip terminates
/// against. The gridblock-owned segment graph is external to this core
/// and not modelled here, so the terminating relationship is captured as
/// owned geometry plus the terminating macrofracture's id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminatingSegmentRef {
    pub macro_id: MacroId,
    pub upper_edge: (PointXyz, PointXyz),
    pub lower_edge: (PointXyz, PointXyz),
}

/// The candidate edges a `NonconnectedGridblockBound` tip bevels against,
/// supplied by the owning gridblock from `getBoundaryCorners`,
/// `MacroId`-free since a grid boundary does not terminate against
/// another fracture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryTermination {
    pub upper_edge: (PointXyz, PointXyz),
    pub lower_edge: (PointXyz, PointXyz),
    pub left_half_upper: (PointXyz, PointXyz),
    pub left_half_lower: (PointXyz, PointXyz),
    pub right_half_upper: (PointXyz, PointXyz),
    pub right_half_lower: (PointXyz, PointXyz),
}

/// A quadrilateral slab between two in-plane nodes, confined to one
/// gridblock and one dip set.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalMacrofractureSegment {
    pub non_prop_node: PointIjk,
    pub prop_node: PointIjk,
    pub non_prop_node_type: SegmentNodeType,
    pub prop_node_type: SegmentNodeType,
    pub dip_direction: DipDirection,
    pub local_propagation_direction: PropagationDirection,
    pub original_propagation_direction: PropagationDirection,
    pub non_prop_node_boundary: Option<GridBoundary>,
    prop_node_boundary: Option<GridBoundary>,
    tracking_boundary: Option<GridBoundary>,
    pub reverse_nodes: bool,
    pub dip_set_index: usize,
    pub nucleation_l_time: f64,
    pub nucleation_timestep: u32,
    pub global_link: Option<MacroId>,
    pub terminating_segment: Option<TerminatingSegmentRef>,
    pub boundary_termination: Option<BoundaryTermination>,
}

impl LocalMacrofractureSegment {
    pub fn new(
        non_prop_node: PointIjk,
        prop_node: PointIjk,
        dip_direction: DipDirection,
        local_propagation_direction: PropagationDirection,
        original_propagation_direction: PropagationDirection,
        non_prop_node_boundary: Option<GridBoundary>,
        dip_set_index: usize,
        nucleation_l_time: f64,
        nucleation_timestep: u32,
    ) -> Self {
        Self {
            non_prop_node,
            prop_node,
            non_prop_node_type: SegmentNodeType::NucleationPoint,
            prop_node_type: SegmentNodeType::Propagating,
            dip_direction,
            local_propagation_direction,
            original_propagation_direction,
            non_prop_node_boundary,
            prop_node_boundary: None,
            tracking_boundary: None,
            reverse_nodes: false,
            dip_set_index,
            nucleation_l_time,
            nucleation_timestep,
            global_link: None,
            terminating_segment: None,
            boundary_termination: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.prop_node_type == SegmentNodeType::Propagating
    }

    fn delta_i(&self) -> f64 {
        self.prop_node.i - self.non_prop_node.i
    }

    fn delta_j(&self) -> f64 {
        self.prop_node.j - self.non_prop_node.j
    }

    pub fn strike_length(&self) -> f64 {
        self.delta_i().abs()
    }

    pub fn total_length(&self) -> f64 {
        (self.delta_i().powi(2) + self.delta_j().powi(2)).sqrt()
    }

    pub fn is_relay(&self) -> bool {
        self.non_prop_node_type == SegmentNodeType::Relay
            && self.prop_node_type == SegmentNodeType::Relay
    }

    /// Normal segments offset set-strike by `+-pi/2` by dip direction;
    /// pure-relay segments (`delta_i == 0`) use set-strike unmodified;
    /// otherwise set-strike plus the in-plane jog angle, offset by dip
    /// direction.
    pub fn azimuth(&self, strike: f64) -> f64 {
        let di = self.delta_i();
        let dj = self.delta_j();
        let offset = match self.dip_direction {
            DipDirection::JPlus => std::f64::consts::FRAC_PI_2,
            DipDirection::JMinus => -std::f64::consts::FRAC_PI_2,
        };
        let raw = if dj == 0.0 {
            strike + offset
        } else if di == 0.0 {
            strike
        } else {
            strike + (dj / di).atan() + offset
        };
        wrap_azimuth(raw)
    }

    /// Dip-set dip, except both-ends-Relay segments are vertical
    /// (`pi/2`).
    pub fn dip(&self, dip_set: &dyn FractureDipSet) -> f64 {
        if self.is_relay() {
            std::f64::consts::FRAC_PI_2
        } else {
            dip_set.dip()
        }
    }

    // -- reversal-aware accessors -------------------------------------

    pub fn swap_nodes(&mut self) {
        self.reverse_nodes = !self.reverse_nodes;
    }

    pub fn inner_node(&self) -> PointIjk {
        if self.reverse_nodes {
            self.prop_node
        } else {
            self.non_prop_node
        }
    }

    pub fn outer_node(&self) -> PointIjk {
        if self.reverse_nodes {
            self.non_prop_node
        } else {
            self.prop_node
        }
    }

    pub fn inner_node_type(&self) -> SegmentNodeType {
        if self.reverse_nodes {
            self.prop_node_type
        } else {
            self.non_prop_node_type
        }
    }

    pub fn outer_node_type(&self) -> SegmentNodeType {
        if self.reverse_nodes {
            self.non_prop_node_type
        } else {
            self.prop_node_type
        }
    }

    pub fn inner_centrepoint_in_xyz(&self, gridblock: &dyn GridblockFractureSet) -> PointXyz {
        gridblock.ijk_to_xyz(self.inner_node())
    }

    pub fn outer_centrepoint_in_xyz(&self, gridblock: &dyn GridblockFractureSet) -> PointXyz {
        gridblock.ijk_to_xyz(self.outer_node())
    }

    /// This segment's local propagation direction, flipped if reversed.
    pub fn local_orientation(&self) -> PropagationDirection {
        if self.reverse_nodes {
            self.local_propagation_direction.opposite()
        } else {
            self.local_propagation_direction
        }
    }

    /// The original nucleating-gridblock propagation direction, flipped
    /// if reversed.
    pub fn side_of_fracture(&self) -> PropagationDirection {
        if self.reverse_nodes {
            self.original_propagation_direction.opposite()
        } else {
            self.original_propagation_direction
        }
    }

    // -- boundary tracking ----------------------------------------------

    pub fn tracking_boundary(&self) -> Option<GridBoundary> {
        self.tracking_boundary
    }

    pub fn prop_node_boundary(&self) -> Option<GridBoundary> {
        self.prop_node_boundary
    }

    /// Locks the propagating node to `boundary`: only legal while
    /// `tracking_boundary` is unset, and only to the same value as
    /// `non_prop_node_boundary`.
    pub fn set_tracking_boundary(&mut self, boundary: GridBoundary) -> bool {
        if self.tracking_boundary.is_some() {
            return false;
        }
        self.tracking_boundary = Some(boundary);
        true
    }

    /// Assigns `PropNodeBoundary`; silently ignored once a tracking
    /// boundary is set — intentional guard state, not an error. Returns
    /// whether the write was applied, so callers can distinguish success
    /// from rejection without changing the silent-ignore semantics.
    pub fn set_prop_node_boundary(&mut self, boundary: GridBoundary) -> bool {
        if self.tracking_boundary.is_some() {
            return false;
        }
        self.prop_node_boundary = Some(boundary);
        true
    }

    // -- cornerpoint projection ------------------------------------------

    fn corner_offset(
        &self,
        gridblock: &dyn GridblockFractureSet,
        dip_set: &dyn FractureDipSet,
        node_xyz: PointXyz,
        use_stress_shadow_width: bool,
    ) -> f64 {
        let dip = self.dip(dip_set);
        if use_stress_shadow_width {
            dip_set.mean_stress_shadow_width(dip)
        } else {
            let tvt = gridblock.tvt_at_point(node_xyz);
            (tvt / 2.0) / dip.tan()
        }
    }

    /// Upper/lower cornerpoints for `node`, translating by the horizontal
    /// offset (layer-thickness-based, or stress-shadow-width when
    /// `use_stress_shadow_width` selects the `MODIFY_FRAC_WIDTH` rendering
    /// option) along the azimuth unit vector in plan, and by
    /// `+-t/2` in Z.
    pub fn cornerpoints(
        &self,
        gridblock: &dyn GridblockFractureSet,
        dip_set: &dyn FractureDipSet,
        node: PointIjk,
        use_stress_shadow_width: bool,
    ) -> (PointXyz, PointXyz) {
        let node_xyz = gridblock.ijk_to_xyz(node);
        let azimuth = self.azimuth(gridblock.strike());
        let tvt = gridblock.tvt_at_point(node_xyz);
        let offset = self.corner_offset(gridblock, dip_set, node_xyz, use_stress_shadow_width);
        let normal = VectorXyz::normal_to_plane(azimuth, self.dip(dip_set));
        // Horizontal direction in plan is the azimuth unit vector, not the
        // plane normal; reuse sin/cos of azimuth directly.
        let (sin_az, cos_az) = azimuth.sin_cos();
        let upper = PointXyz::new(
            node_xyz.x + offset * cos_az,
            node_xyz.y + offset * sin_az,
            node_xyz.z + tvt / 2.0,
        );
        let lower = PointXyz::new(
            node_xyz.x - offset * cos_az,
            node_xyz.y - offset * sin_az,
            node_xyz.z - tvt / 2.0,
        );
        let _ = normal; // normal reserved for GetSegmentNormalVectors callers
        (upper, lower)
    }

    // -- mirror segment ---------------------------------------------------

    /// Produces a zero-length twin at the same nucleation point,
    /// propagating in the opposite local direction. The twin's non-prop
    /// node type is forced to `NucleationPoint`; registering it with the
    /// gridblock's per-direction collection is the caller's
    /// responsibility — the gridblock exclusively owns its local
    /// collections.
    pub fn create_mirror_segment(&self) -> Self {
        let mut mirror = Self::new(
            self.non_prop_node,
            self.non_prop_node,
            self.dip_direction,
            self.local_propagation_direction.opposite(),
            self.original_propagation_direction,
            self.non_prop_node_boundary,
            self.dip_set_index,
            self.nucleation_l_time,
            self.nucleation_timestep,
        );
        mirror.non_prop_node_type = SegmentNodeType::NucleationPoint;
        mirror
    }
}
