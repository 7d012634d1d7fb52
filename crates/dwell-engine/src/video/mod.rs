pub mod ffmpeg;

use anyhow::Result;
use common::tracking::VideoFrame;

/// Sequential video source consumed by the pipeline.
///
/// Frames are read strictly in increasing index order. `Ok(None)` signals
/// end of stream; a read error mid-stream is treated by the pipeline as a
/// premature end of stream, not a fatal error.
pub trait FrameSource {
    /// Source frame rate in frames per second.
    fn frame_rate(&self) -> f64;

    /// Declared total frame count of the source.
    fn total_frames(&self) -> u64;

    /// Read the next frame, or `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<VideoFrame>>;
}
