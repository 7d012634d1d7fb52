//! Geometry primitives shared across the dwelltrack pipeline.
//!
//! This module defines the axis-aligned rectangle types used by the detector
//! contracts and the dwell accounting engine.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates (top-left + size)
///
/// Coordinates are signed so per-axis distance arithmetic between two boxes
/// never underflows. Identity matching compares top-left corners only, never
/// size or overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl BoundingBox {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A degenerate box (non-positive width or height) carries no area and
    /// is rejected by the pipeline before matching.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Fixed rectangular region of interest used for dwell-time-in-area
/// accounting. Defined at configuration time; immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,

    /// Human-readable label carried into logs and reports
    #[serde(default = "default_zone_label")]
    pub label: String,
}

fn default_zone_label() -> String {
    "A1".to_string()
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            x: 500,
            y: 100,
            width: 400,
            height: 200,
            label: default_zone_label(),
        }
    }
}

impl Zone {
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Half-open interval overlap on both axes. Touching edges do NOT count
    /// as overlap.
    pub fn overlaps(&self, bbox: &BoundingBox) -> bool {
        bbox.x + bbox.width > self.x
            && bbox.x < self.x + self.width
            && bbox.y + bbox.height > self.y
            && bbox.y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_inside() {
        let zone = Zone::default();
        let bbox = BoundingBox::new(520, 150, 50, 50);
        assert!(zone.overlaps(&bbox));
    }

    #[test]
    fn test_overlap_disjoint() {
        let zone = Zone::default();
        let bbox = BoundingBox::new(100, 100, 50, 50);
        assert!(!zone.overlaps(&bbox));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let zone = Zone {
            x: 100,
            y: 100,
            width: 100,
            height: 100,
            label: "A1".to_string(),
        };

        // Right edge of the box lands exactly on the left edge of the zone.
        let left_neighbor = BoundingBox::new(50, 120, 50, 50);
        assert!(!zone.overlaps(&left_neighbor));

        // Bottom edge of the box lands exactly on the top edge of the zone.
        let top_neighbor = BoundingBox::new(120, 50, 50, 50);
        assert!(!zone.overlaps(&top_neighbor));

        // One pixel further in on either axis does overlap.
        let barely_in = BoundingBox::new(51, 120, 50, 50);
        assert!(zone.overlaps(&barely_in));
    }

    #[test]
    fn test_partial_overlap() {
        let zone = Zone::default();
        // Straddles the zone's left edge.
        let bbox = BoundingBox::new(480, 150, 50, 50);
        assert!(zone.overlaps(&bbox));
    }

    #[test]
    fn test_bbox_validity() {
        assert!(BoundingBox::new(0, 0, 10, 10).is_valid());
        assert!(!BoundingBox::new(0, 0, 0, 10).is_valid());
        assert!(!BoundingBox::new(0, 0, 10, -5).is_valid());
    }

    #[test]
    fn test_zone_serialization_defaults() {
        let zone: Zone = serde_json::from_str(r#"{"x":10,"y":20,"width":30,"height":40}"#)
            .unwrap();
        assert_eq!(zone.label, "A1");

        let json = serde_json::to_string(&zone).unwrap();
        let round_trip: Zone = serde_json::from_str(&json).unwrap();
        assert_eq!(round_trip, zone);
    }
}
