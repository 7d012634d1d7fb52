use crate::error::EngineError;

/// Decides which frames of the source are sampled for detection, and how
/// much real time one sample step represents.
///
/// The stride is derived once from the source frame rate and the configured
/// skip interval; a frame at index `i` is sampled iff `i % stride == 0`.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    stride: u64,
    seconds_per_sample: f64,
    output_frame_rate: f64,
}

impl FrameSampler {
    pub fn new(frame_rate: f64, skip_interval_seconds: f64) -> Result<Self, EngineError> {
        if frame_rate <= 0.0 {
            return Err(EngineError::configuration(format!(
                "frame rate must be positive, got {frame_rate}"
            )));
        }
        if skip_interval_seconds <= 0.0 {
            return Err(EngineError::configuration(format!(
                "skip interval must be positive, got {skip_interval_seconds}"
            )));
        }

        let stride = ((frame_rate * skip_interval_seconds).round() as u64).max(1);

        Ok(Self {
            stride,
            // The time attributed to each sampled detection is the configured
            // interval, not a measured delta. Deliberate approximation.
            seconds_per_sample: skip_interval_seconds,
            output_frame_rate: frame_rate / stride as f64,
        })
    }

    pub fn is_sampled(&self, frame_index: u64) -> bool {
        frame_index % self.stride == 0
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn seconds_per_sample(&self) -> f64 {
        self.seconds_per_sample
    }

    /// Frame rate implied by the stride, for any downstream frame sink.
    pub fn output_frame_rate(&self) -> f64 {
        self.output_frame_rate
    }
}
