//! Run-scoped entity table.
//!
//! Entities live in a creation-ordered arena. The table only ever grows and
//! per-entity counters only ever increase; nothing is removed during a run.
//! The report stage may exclude entities from the output, but never deletes
//! them here.

use common::geometry::BoundingBox;

/// A tracked entity persisted across sampled frames
#[derive(Debug, Clone)]
pub struct Entity {
    /// Stable, deterministically derived identifier, unique within the run
    pub id: String,

    /// Bounding box observed at creation time. All future proximity
    /// comparisons run against this anchor; it is never updated as the
    /// entity moves (see `IdentityMatcher` for the consequences).
    pub anchor: BoundingBox,

    /// Accumulated observed seconds, in units of one sample step
    pub overall_time: f64,

    /// Accumulated seconds observed overlapping the zone
    pub zone_time: f64,
}

impl Entity {
    pub fn new(id: String, anchor: BoundingBox) -> Self {
        Self {
            id,
            anchor,
            overall_time: 0.0,
            zone_time: 0.0,
        }
    }
}

/// Creation-ordered arena of entities. The only shared mutable state in a
/// run, owned exclusively by the pipeline.
#[derive(Debug, Default)]
pub struct EntityTable {
    entities: Vec<Entity>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Insert a new entity, returning its creation index.
    pub fn insert(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    /// Iterate entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }
}
