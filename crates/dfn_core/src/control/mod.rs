//! Deformation and DFN-generation control objects.
//!
//! These are the crate's configuration surface: a `DeformationEpisode`
//! describes one bounded (or growth-terminated) load step, a
//! `DfnGenerationControl` carries the cutoffs and output options that apply
//! across the whole run, and a `PropagationControl` orders the episodes and
//! carries the numerical accuracy/binning knobs that drive a timestep.
//! Construction is fallible (`anyhow::Result`); the geometry/topology core
//! itself stays total.

mod common;
mod deformation_episode;
mod dfn_generation_control;
mod error;
mod propagation_control;

pub use common::{HorizontalTensor2, TimeUnit};
pub use deformation_episode::{DeformationEpisode, InitialStressState};
pub use dfn_generation_control::{
    AutomaticFlag, DfnFileType, DfnGenerationControl, IntermediateOutputInterval,
    UNDEFINED_SENTINEL,
};
pub use error::ControlError;
pub use propagation_control::{FractureApertureType, PropagationControl, StressDistribution};
