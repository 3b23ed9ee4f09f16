//! `dfn_core` is the geometry and topology engine for a geomechanical
//! discrete fracture network (DFN) generator.
//!
//! Given a layered rock volume discretised into gridblocks and a sequence
//! of deformation episodes, an external propagation solver grows discrete
//! microfractures and macrofractures; this crate owns the data model of
//! fracture segments and composite fractures, the rules by which segments
//! are joined into multi-segment macrofractures, the segment-node state
//! machine, the geometric reconstruction of each macrofracture as a
//! sequence of bevelled quadrilateral segments, and the global DFN
//! lifecycle (update, sort, cull).
//!
//! Key components:
//! - **`geometry`**: 3D/in-layer point and vector primitives, line
//!   crossover routines.
//! - **`ids`**: process-wide-style monotonic identifiers for global
//!   fractures, owned by [`dfn::GlobalDfn`] rather than hidden statics.
//! - **`arena`**: a small generational-free index arena used both for
//!   gridblock-owned local fracture collections and for the cornerpoints
//!   shared between adjacent macrofracture segments.
//! - **`collaborators`**: the external trait boundary (`GridblockFractureSet`,
//!   `FractureDipSet`) this core consumes; not implemented here except by
//!   test fakes.
//! - **`local`**: local (gridblock-scoped) microfractures and
//!   macrofracture segments.
//! - **`global`**: global (grid-level) microfractures and macrofractures,
//!   including the `PopulateData` geometric reconstruction.
//! - **`dfn`**: the `GlobalDfn` container (update/sort/cull).
//! - **`control`**: deformation episodes and DFN-generation/propagation
//!   control objects.
pub mod arena;
pub mod collaborators;
pub mod control;
pub mod dfn;
pub mod geometry;
pub mod global;
pub mod ids;
pub mod local;
