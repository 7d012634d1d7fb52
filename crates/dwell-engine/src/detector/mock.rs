/// Scripted detector for tests and dry runs
use super::Detector;
use anyhow::Result;
use common::geometry::BoundingBox;
use common::tracking::VideoFrame;
use std::collections::HashMap;

/// Returns pre-scripted detections keyed by frame sequence number.
///
/// Frames with no script entry yield zero detections, which is also what the
/// pipeline expects from a real detector that finds nothing. Fully
/// deterministic: the same script always produces the same run.
#[derive(Debug, Default)]
pub struct MockDetector {
    script: HashMap<u64, Vec<BoundingBox>>,
    fail_on: Option<u64>,
}

impl MockDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the detections returned for a given frame sequence.
    pub fn with_frame(mut self, sequence: u64, boxes: Vec<BoundingBox>) -> Self {
        self.script.insert(sequence, boxes);
        self
    }

    /// Make detection fail on one frame, for error-path tests.
    pub fn failing_on(mut self, sequence: u64) -> Self {
        self.fail_on = Some(sequence);
        self
    }
}

impl Detector for MockDetector {
    fn id(&self) -> &'static str {
        "mock_detector"
    }

    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<BoundingBox>> {
        if self.fail_on == Some(frame.sequence) {
            anyhow::bail!("scripted detector failure on frame {}", frame.sequence);
        }
        Ok(self.script.get(&frame.sequence).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u64) -> VideoFrame {
        VideoFrame {
            sequence,
            width: 640,
            height: 480,
            format: "raw".to_string(),
            data: vec![],
        }
    }

    #[test]
    fn test_scripted_detections() {
        let mut detector = MockDetector::new()
            .with_frame(0, vec![BoundingBox::new(100, 100, 50, 50)])
            .with_frame(30, vec![]);

        let boxes = detector.detect(&frame(0)).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].x, 100);

        assert!(detector.detect(&frame(30)).unwrap().is_empty());
        // Unscripted frames contribute zero detections.
        assert!(detector.detect(&frame(60)).unwrap().is_empty());
    }

    #[test]
    fn test_scripted_failure() {
        let mut detector = MockDetector::new().failing_on(30);
        assert!(detector.detect(&frame(0)).is_ok());
        assert!(detector.detect(&frame(30)).is_err());
    }
}
