//! The global DFN container: owns every global microfracture and
//! macrofracture, drives their refresh each timestep, and applies the
//! size-/count-based culling that keeps a long-running simulation
//! bounded.

use crate::collaborators::{FractureDipSet, GridblockFractureSet, PropagationDirection};
use crate::geometry::PointXyz;
use crate::global::{GlobalMacrofracture, GlobalMicrofracture, SegmentProperties};
use crate::ids::{IdCounter, MacroId, MicroId};
use crate::local::{LocalMacrofractureSegment, LocalMicrofracture};

/// Sort criterion for [`GlobalDfn::sort_fractures`], passed explicitly to
/// the sort call rather than latched onto the collection as static
/// comparator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortProperty {
    SizeSmallestFirst,
    SizeLargestFirst,
    NucleationTime,
}

fn micro_key(m: &GlobalMicrofracture, criterion: SortProperty) -> f64 {
    match criterion {
        SortProperty::SizeSmallestFirst => m.radius,
        SortProperty::SizeLargestFirst => -m.radius,
        SortProperty::NucleationTime => m.nucleation_real_time(),
    }
}

fn macro_key(m: &GlobalMacrofracture, criterion: SortProperty) -> f64 {
    match criterion {
        SortProperty::SizeSmallestFirst => m.strike_length(),
        SortProperty::SizeLargestFirst => -m.strike_length(),
        SortProperty::NucleationTime => m.nucleation_real_time(),
    }
}

fn sort_key_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Owns the two top-level collections of global fractures, the two
/// process-wide-style ID counters (owned here rather than hidden
/// statics), and `current_time`, the real time of the last `update`.
#[derive(Debug, Clone, Default)]
pub struct GlobalDfn {
    microfractures: Vec<GlobalMicrofracture>,
    macrofractures: Vec<GlobalMacrofracture>,
    micro_ids: IdCounter,
    macro_ids: IdCounter,
    current_time: f64,
}

impl GlobalDfn {
    pub fn new() -> Self {
        Self {
            microfractures: Vec::new(),
            macrofractures: Vec::new(),
            micro_ids: IdCounter::new(),
            macro_ids: IdCounter::new(),
            current_time: 0.0,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn microfractures(&self) -> &[GlobalMicrofracture] {
        &self.microfractures
    }

    pub fn macrofractures(&self) -> &[GlobalMacrofracture] {
        &self.macrofractures
    }

    pub fn next_micro_id(&mut self) -> MicroId {
        self.micro_ids.next_micro()
    }

    pub fn next_macro_id(&mut self) -> MacroId {
        self.macro_ids.next_macro()
    }

    /// Links a fresh global microfracture into the DFN, consuming an ID
    /// from this container's counter.
    pub fn link_microfracture(
        &mut self,
        local: &LocalMicrofracture,
        gridblock: &dyn GridblockFractureSet,
        dip_set: &dyn FractureDipSet,
    ) -> MicroId {
        let id = self.next_micro_id();
        self.microfractures.push(GlobalMicrofracture::new(id, local, gridblock, dip_set));
        id
    }

    /// Links a fresh global macrofracture into the DFN from a seed
    /// segment + its mirror, consuming an ID from this container's
    /// counter.
    #[allow(clippy::too_many_arguments)]
    pub fn link_macrofracture(
        &mut self,
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
    ) -> MacroId {
        let id = self.next_macro_id();
        self.macrofractures.push(GlobalMacrofracture::new(
            id,
            dip_set_index,
            nucleation_real_time,
            seed,
            seed_upper_inner,
            seed_upper_outer,
            seed_lower_inner,
            seed_lower_outer,
            seed_inner_centre,
            seed_outer_centre,
            properties,
        ));
        id
    }

    /// Refreshes every global micro/macro fracture from its linked local,
    /// evicts microfractures that have nucleated a macrofracture (walking
    /// the list in reverse so removal never skips an entry), refreshes
    /// macrofractures again, and records `current_time`.
    pub fn update_dfn(
        &mut self,
        current_time: f64,
        locals: &[LocalMicrofracture],
        gridblock: &dyn GridblockFractureSet,
        segment_properties: &mut dyn FnMut(&LocalMacrofractureSegment) -> SegmentProperties,
    ) {
        for (global, local) in self.microfractures.iter_mut().zip(locals.iter()) {
            let dip_set = gridblock.dip_set(global.dip_set_index());
            global.populate_data(local, gridblock, dip_set);
        }

        for i in (0..self.microfractures.len()).rev() {
            if self.microfractures[i].nucleated_macrofracture {
                self.microfractures.remove(i);
            }
        }

        for global in self.macrofractures.iter_mut() {
            global.populate_data(segment_properties);
        }

        self.current_time = current_time;
    }

    /// Sets the sort criterion explicitly for this call and sorts both
    /// collections by it (largest/smallest/nucleation-time).
    pub fn sort_fractures(&mut self, criterion: SortProperty) {
        self.microfractures
            .sort_by(|a, b| sort_key_cmp(micro_key(a, criterion), micro_key(b, criterion)));
        self.macrofractures
            .sort_by(|a, b| sort_key_cmp(macro_key(a, criterion), macro_key(b, criterion)));
    }

    /// Sorts largest-first, drops microfractures with radius ≤
    /// `min_radius` and macrofractures with strike length ≤
    /// `min_length` (single-precision comparison), then — if `max_count
    /// >= 0` — continues dropping the smallest survivors (microfractures
    /// first, then macrofractures) until the combined count is at most
    /// `max_count`.
    pub fn remove_shortest_fractures(&mut self, min_radius: f64, min_length: f64, max_count: i64) {
        self.sort_fractures(SortProperty::SizeLargestFirst);

        self.microfractures
            .retain(|m| (m.radius as f32) > (min_radius as f32));
        self.macrofractures
            .retain(|m| (m.strike_length() as f32) > (min_length as f32));

        if max_count < 0 {
            return;
        }
        let max_count = max_count as usize;
        // Collections are currently largest-first; drop smallest-first
        // (microfractures, then macrofractures) until within budget.
        while self.microfractures.len() + self.macrofractures.len() > max_count {
            if !self.microfractures.is_empty() {
                self.microfractures.pop();
            } else if !self.macrofractures.is_empty() {
                self.macrofractures.pop();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::{FakeDipSet, FakeGridblock};
    use crate::collaborators::{DipDirection, GridblockFractureSet as _};
    use crate::geometry::PointIjk;
    use crate::local::SegmentNodeType;

    fn micro_with_radius(dfn: &mut GlobalDfn, gridblock: &FakeGridblock, dip_set: &FakeDipSet, radius: f64) {
        let local = LocalMicrofracture::new(PointIjk::at_nucleation(0.0, 0.0), radius, 0, DipDirection::JPlus, 0.0, 0);
        dfn.link_microfracture(&local, gridblock, dip_set);
    }

    fn macro_with_strike_length(dfn: &mut GlobalDfn, gridblock: &FakeGridblock, dip_set: &FakeDipSet, length: f64) {
        let mut seed = LocalMacrofractureSegment::new(
            PointIjk::at_nucleation(0.0, 0.0),
            PointIjk::at_nucleation(length, 0.0),
            DipDirection::JPlus,
            PropagationDirection::IPlus,
            PropagationDirection::IPlus,
            None,
            0,
            0.0,
            0,
        );
        seed.prop_node_type = SegmentNodeType::Propagating;
        let inner_xyz = gridblock.ijk_to_xyz(seed.inner_node());
        let outer_xyz = gridblock.ijk_to_xyz(seed.outer_node());
        let (ui, li) = seed.cornerpoints(gridblock, dip_set, seed.inner_node(), false);
        let (uo, lo) = seed.cornerpoints(gridblock, dip_set, seed.outer_node(), false);
        let mut properties = |s: &LocalMacrofractureSegment| SegmentProperties {
            strike: s.azimuth(gridblock.strike()),
            dip: s.dip(dip_set),
            mean_aperture: 0.0,
            compressibility: 0.0,
        };
        dfn.link_macrofracture(0, 0.0, seed, ui, uo, li, lo, inner_xyz, outer_xyz, &mut properties);
    }

    #[test]
    fn s5_remove_shortest_fractures_culls_by_size_then_by_count() {
        let gridblock = FakeGridblock::new(10.0);
        let dip_set = FakeDipSet::default();
        let mut dfn = GlobalDfn::new();
        for r in [0.1, 0.2, 0.3] {
            micro_with_radius(&mut dfn, &gridblock, &dip_set, r);
        }
        for l in [5.0, 15.0, 25.0] {
            macro_with_strike_length(&mut dfn, &gridblock, &dip_set, l);
        }

        dfn.remove_shortest_fractures(0.2, 10.0, -1);
        let mut radii: Vec<f64> = dfn.microfractures().iter().map(|m| m.radius).collect();
        radii.sort_by(sort_key_cmp);
        assert_eq!(radii, vec![0.3]);
        let mut lengths: Vec<f64> = dfn.macrofractures().iter().map(|m| m.strike_length()).collect();
        lengths.sort_by(sort_key_cmp);
        assert_eq!(lengths, vec![15.0, 25.0]);

        dfn.remove_shortest_fractures(-1.0, -1.0, 1);
        assert_eq!(dfn.microfractures().len(), 0);
        assert_eq!(dfn.macrofractures().len(), 1);
        assert_eq!(dfn.macrofractures()[0].strike_length(), 25.0);
    }

    #[test]
    fn culling_an_already_culled_dfn_is_a_no_op() {
        let gridblock = FakeGridblock::new(10.0);
        let dip_set = FakeDipSet::default();
        let mut dfn = GlobalDfn::new();
        for r in [0.3, 0.5] {
            micro_with_radius(&mut dfn, &gridblock, &dip_set, r);
        }
        for l in [15.0, 25.0] {
            macro_with_strike_length(&mut dfn, &gridblock, &dip_set, l);
        }

        dfn.remove_shortest_fractures(0.2, 10.0, -1);
        let before_micro = dfn.microfractures().len();
        let before_macro = dfn.macrofractures().len();

        dfn.remove_shortest_fractures(0.2, 10.0, -1);
        assert_eq!(dfn.microfractures().len(), before_micro);
        assert_eq!(dfn.macrofractures().len(), before_macro);
        assert!(dfn.microfractures().iter().all(|m| m.radius as f32 > 0.2_f32));
        assert!(dfn.macrofractures().iter().all(|m| m.strike_length() as f32 > 10.0_f32));
    }

    #[test]
    fn ids_are_strictly_increasing_across_links() {
        let gridblock = FakeGridblock::new(10.0);
        let dip_set = FakeDipSet::default();
        let mut dfn = GlobalDfn::new();
        micro_with_radius(&mut dfn, &gridblock, &dip_set, 1.0);
        micro_with_radius(&mut dfn, &gridblock, &dip_set, 2.0);
        assert!(dfn.microfractures()[0].id().0 < dfn.microfractures()[1].id().0);

        macro_with_strike_length(&mut dfn, &gridblock, &dip_set, 10.0);
        macro_with_strike_length(&mut dfn, &gridblock, &dip_set, 20.0);
        assert!(dfn.macrofractures()[0].id().0 < dfn.macrofractures()[1].id().0);
    }

    #[test]
    fn update_dfn_evicts_nucleated_microfractures_and_records_current_time() {
        let gridblock = FakeGridblock::new(10.0);
        let dip_set = FakeDipSet::default();
        let mut dfn = GlobalDfn::new();
        let mut local_a = LocalMicrofracture::new(PointIjk::at_nucleation(0.0, 0.0), 1.0, 0, DipDirection::JPlus, 0.0, 0);
        let local_b = LocalMicrofracture::new(PointIjk::at_nucleation(5.0, 0.0), 2.0, 0, DipDirection::JPlus, 0.0, 0);
        dfn.link_microfracture(&local_a, &gridblock, &dip_set);
        dfn.link_microfracture(&local_b, &gridblock, &dip_set);

        local_a.mark_nucleated_macrofracture();
        let locals = [local_a, local_b];
        let mut seg_props = |_: &LocalMacrofractureSegment| SegmentProperties {
            strike: 0.0,
            dip: 0.0,
            mean_aperture: 0.0,
            compressibility: 0.0,
        };
        dfn.update_dfn(123.0, &locals, &gridblock, &mut seg_props);

        assert_eq!(dfn.microfractures().len(), 1);
        assert!(!dfn.microfractures()[0].nucleated_macrofracture);
        assert_eq!(dfn.current_time(), 123.0);
    }
}
