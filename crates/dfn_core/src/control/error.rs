//! Named, structurally-distinguishable configuration rejections, wrapped
//! into `anyhow::Error` at each builder method's call site.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("rate is not representable: {0}")]
    NonFiniteRate(&'static str),
    #[error("duration must be finite")]
    NonFiniteDuration,
    #[error("tolerance must be positive: {0}")]
    NonPositiveTolerance(&'static str),
    #[error("minimum size cutoff must be non-negative: {0}")]
    NegativeCutoff(&'static str),
    #[error("microfracture polygon vertex count must be at least 3 or exactly 0 (circle)")]
    InvalidPolygonVertexCount,
    #[error("nucleation position control must lie in [0, 1] or be exactly -1 (random)")]
    InvalidNucleationPositionControl,
}
