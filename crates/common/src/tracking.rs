//! Contracts shared between the frame pipeline, the detector plugins, and
//! the report stage.

use serde::{Deserialize, Serialize};

/// A single decoded video frame handed to the detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFrame {
    /// Frame index within the source stream (0-based)
    pub sequence: u64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Image format (e.g., "jpeg", "raw")
    pub format: String,

    /// Encoded frame bytes
    pub data: Vec<u8>,
}

/// Final per-entity report record
///
/// Records are emitted in entity creation order, so output is deterministic
/// for a given input stream and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellRecord {
    /// Opaque stable entity identifier
    pub entity_id: String,

    /// Total observed seconds, clamped to the video duration
    pub overall_time: f64,

    /// Seconds observed overlapping the zone, clamped to `overall_time`
    pub zone_time: f64,
}

/// Per-sampled-frame counters, surfaced for logging and any overlay consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Index of the sampled frame these counts describe
    pub frame_index: u64,

    /// Detections returned for this frame
    pub current_detections: usize,

    /// Detections currently overlapping the zone
    pub in_zone: usize,

    /// Distinct entities created so far in the run
    pub total_entities: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dwell_record_serialization() {
        let record = DwellRecord {
            entity_id: "8f4e2a10".to_string(),
            overall_time: 12.5,
            zone_time: 3.0,
        };

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: DwellRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, record);
    }

    #[test]
    fn test_frame_stats_serialization() {
        let stats = FrameStats {
            frame_index: 30,
            current_detections: 4,
            in_zone: 1,
            total_entities: 7,
        };

        let json = serde_json::to_string(&stats).unwrap();
        let deserialized: FrameStats = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, stats);
    }
}
