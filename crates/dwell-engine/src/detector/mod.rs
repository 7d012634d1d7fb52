pub mod mock;
pub mod onnx;

use anyhow::Result;
use common::geometry::BoundingBox;
use common::tracking::VideoFrame;

/// Object detection capability consumed by the pipeline.
///
/// The pipeline is single-threaded and calls `detect` synchronously, one
/// sampled frame at a time. Implementations make no ordering guarantee on
/// the returned boxes and may return an empty set. A detector error on a
/// frame is not fatal: the pipeline logs it and treats the frame as having
/// zero detections.
pub trait Detector {
    /// Unique plugin identifier (e.g., "onnx_person_detector")
    fn id(&self) -> &'static str;

    /// Detect entities in a single frame.
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<BoundingBox>>;
}
