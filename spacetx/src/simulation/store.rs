//! Canonical entity collection
//!
//! `EntityStore` owns every live `Entity`: creation (id + timestamp
//! assignment), lookup, removal, parent links and age-based eviction.
//! Entities are kept in a `BTreeMap` keyed by id; ids are handed out in
//! increasing order, so iteration is in creation order and is stable within
//! a tick.
//!
//! Timestamps come from the store's simulation clock, which the core
//! advances on every active tick. Entities created between the same two
//! ticks share a timestamp and are ordered by id.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::simulation::states::{Entity, EntityId, EntityKind, NVec3, OrbitDescriptor};

/// Process-wide id counter, so ids stay unique across stores
fn next_entity_id() -> EntityId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    EntityId(COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Default)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, Entity>,
    now: f64, // simulation clock, seconds
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity at the origin with no parent, stamped with the current clock
    pub fn create(
        &mut self,
        orbit: OrbitDescriptor,
        arm_index: usize,
        phase_angle: f64,
        scale: f64,
        kind: EntityKind,
        source_amount: f64,
    ) -> Entity {
        let id = next_entity_id();
        let entity = Entity {
            id,
            position: NVec3::zeros(),
            orbit,
            arm_index,
            phase_angle,
            scale,
            kind,
            parent_id: None,
            created_at: self.now,
            source_amount,
        };
        self.entities.insert(id, entity.clone());
        entity
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// All entities in creation order
    pub fn all(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    /// Link `id` to `parent_id`. Returns false (and changes nothing) if `id` is unknown.
    pub fn set_parent(&mut self, id: EntityId, parent_id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                debug!(entity = %id, parent = %parent_id, "parent assigned");
                entity.parent_id = Some(parent_id);
                true
            }
            None => false,
        }
    }

    /// Everything except the `keep_count` most recent entities, oldest first
    pub fn oldest_beyond(&self, keep_count: usize) -> Vec<Entity> {
        let total = self.entities.len();
        if total <= keep_count {
            return Vec::new();
        }

        let mut by_age: Vec<&Entity> = self.entities.values().collect();
        by_age.sort_by(|a, b| a.created_at.total_cmp(&b.created_at).then(a.id.cmp(&b.id)));

        by_age
            .into_iter()
            .take(total - keep_count)
            .cloned()
            .collect()
    }

    /// Remove everything except the `keep_count` most recent entities
    pub fn evict_oldest_beyond(&mut self, keep_count: usize) -> usize {
        let victims = self.oldest_beyond(keep_count);
        victims.iter().filter(|e| self.remove(e.id)).count()
    }

    /// Entities created no more than `max_age` seconds ago
    pub fn recent(&self, max_age: f64) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| self.now - e.created_at <= max_age)
            .collect()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub(crate) fn advance_clock(&mut self, delta_time: f64) {
        self.now += delta_time;
    }
}
