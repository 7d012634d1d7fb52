use crate::entity::EntityTable;
use common::geometry::{BoundingBox, Zone};

/// Updates per-entity dwell totals, one sample step per matched detection.
///
/// Counters only ever increase and entities are never removed here, so no
/// error path needs rollback handling.
#[derive(Debug, Clone)]
pub struct DwellAccumulator {
    seconds_per_sample: f64,
    zone: Zone,
}

impl DwellAccumulator {
    pub fn new(seconds_per_sample: f64, zone: Zone) -> Self {
        Self {
            seconds_per_sample,
            zone,
        }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Credit one sample step to the entity at `index` for the given
    /// detection. Returns whether the detection overlapped the zone.
    pub fn credit(&self, table: &mut EntityTable, index: usize, bbox: &BoundingBox) -> bool {
        let in_zone = self.zone.overlaps(bbox);
        if let Some(entity) = table.get_mut(index) {
            entity.overall_time += self.seconds_per_sample;
            if in_zone {
                entity.zone_time += self.seconds_per_sample;
            }
        }
        in_zone
    }
}
