use crate::entity::{Entity, EntityTable};
use common::geometry::BoundingBox;
use sha2::{Digest, Sha256};

/// Result of resolving one detection against the entity table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Creation index of the matched or newly created entity
    pub index: usize,
    /// Whether this detection created a new entity
    pub created: bool,
}

/// Maps a frame's raw detections to stable entity identities by top-left
/// corner proximity.
///
/// Matching scans entities in creation order and takes the FIRST one within
/// the per-axis threshold, not the closest. When two entities sit near each
/// other this can misattribute a detection; that tie-break is part of the
/// observable contract and must not be "improved" to nearest-match.
///
/// Known limitation: the anchor is the creation-time box and is never
/// re-updated, so an entity drifting slowly across many sampled frames can
/// eventually exceed the threshold against its own anchor and be registered
/// again under a new id.
#[derive(Debug, Clone, Copy)]
pub struct IdentityMatcher {
    proximity_threshold: i64,
}

impl IdentityMatcher {
    pub fn new(proximity_threshold: i64) -> Self {
        Self {
            proximity_threshold,
        }
    }

    /// Resolve a detection to an existing entity or create a new one.
    pub fn resolve(
        &self,
        bbox: &BoundingBox,
        frame_index: u64,
        table: &mut EntityTable,
    ) -> Resolution {
        for (index, entity) in table.iter().enumerate() {
            if (bbox.x - entity.anchor.x).abs() < self.proximity_threshold
                && (bbox.y - entity.anchor.y).abs() < self.proximity_threshold
            {
                return Resolution {
                    index,
                    created: false,
                };
            }
        }

        let id = entity_id(bbox, frame_index);
        let index = table.insert(Entity::new(id, *bbox));
        Resolution {
            index,
            created: true,
        }
    }
}

/// Deterministic 128-bit entity id from the creating detection.
///
/// Purely a lookup key; collisions are not handled because the hash space
/// makes them negligible within a single run.
fn entity_id(bbox: &BoundingBox, frame_index: u64) -> String {
    let material = format!(
        "{},{},{},{},{}",
        bbox.x, bbox.y, bbox.width, bbox.height, frame_index
    );
    let digest = Sha256::digest(material.as_bytes());
    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: i64, y: i64) -> BoundingBox {
        BoundingBox::new(x, y, 50, 50)
    }

    #[test]
    fn test_first_detection_creates_entity() {
        let matcher = IdentityMatcher::new(30);
        let mut table = EntityTable::new();

        let res = matcher.resolve(&bbox(100, 100), 0, &mut table);
        assert!(res.created);
        assert_eq!(res.index, 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().anchor, bbox(100, 100));
    }

    #[test]
    fn test_nearby_detection_matches() {
        let matcher = IdentityMatcher::new(30);
        let mut table = EntityTable::new();

        matcher.resolve(&bbox(100, 100), 0, &mut table);
        let res = matcher.resolve(&bbox(105, 103), 30, &mut table);
        assert!(!res.created);
        assert_eq!(res.index, 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let matcher = IdentityMatcher::new(30);
        let mut table = EntityTable::new();
        matcher.resolve(&bbox(100, 100), 0, &mut table);

        // Exactly at the threshold on one axis: no match.
        let at_threshold = matcher.resolve(&bbox(130, 100), 30, &mut table);
        assert!(at_threshold.created);

        // One pixel inside: match.
        let inside = matcher.resolve(&bbox(129, 100), 60, &mut table);
        assert!(!inside.created);
        assert_eq!(inside.index, 0);
    }

    #[test]
    fn test_threshold_is_per_axis() {
        let matcher = IdentityMatcher::new(30);
        let mut table = EntityTable::new();
        matcher.resolve(&bbox(100, 100), 0, &mut table);

        // Inside on x, at threshold on y: no match.
        let res = matcher.resolve(&bbox(105, 130), 30, &mut table);
        assert!(res.created);
    }

    #[test]
    fn test_first_created_entity_wins_tie() {
        let matcher = IdentityMatcher::new(30);
        let mut table = EntityTable::new();

        // Two entities 20px apart, both within threshold of a later box.
        matcher.resolve(&bbox(100, 100), 0, &mut table);
        matcher.resolve(&bbox(150, 100), 0, &mut table);
        assert_eq!(table.len(), 2);

        // (125,100) is 25 from the first anchor and 25 from the second;
        // the first-created entity takes it.
        let res = matcher.resolve(&bbox(125, 100), 30, &mut table);
        assert!(!res.created);
        assert_eq!(res.index, 0);
    }

    #[test]
    fn test_anchor_never_updates() {
        let matcher = IdentityMatcher::new(30);
        let mut table = EntityTable::new();
        matcher.resolve(&bbox(100, 100), 0, &mut table);

        // Drifts 25px, still matches the frozen anchor.
        let drifted = matcher.resolve(&bbox(125, 100), 30, &mut table);
        assert!(!drifted.created);
        assert_eq!(table.get(0).unwrap().anchor, bbox(100, 100));

        // The cumulative drift now exceeds the threshold against the
        // original anchor, so a new entity is registered.
        let past_anchor = matcher.resolve(&bbox(135, 100), 60, &mut table);
        assert!(past_anchor.created);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_entity_id_is_deterministic() {
        let a = entity_id(&bbox(100, 100), 30);
        let b = entity_id(&bbox(100, 100), 30);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32); // 128 bits, hex encoded

        let other_frame = entity_id(&bbox(100, 100), 60);
        assert_ne!(a, other_frame);

        let other_box = entity_id(&bbox(101, 100), 30);
        assert_ne!(a, other_box);
    }
}
