//! Global (grid-level) fractures: XYZ snapshots and the segment-corner
//! reconstruction engine that turns a gridblock-owned segment chain into
//! renderable geometry.

mod macrofracture;
mod microfracture;

pub use macrofracture::{CornerHandle, FractureTipType, GlobalMacrofracture, SegmentProperties};
pub use microfracture::GlobalMicrofracture;
