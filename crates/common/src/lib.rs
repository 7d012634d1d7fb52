pub mod geometry;
pub mod tracking;

pub use geometry::{BoundingBox, Zone};
pub use tracking::{DwellRecord, FrameStats, VideoFrame};
