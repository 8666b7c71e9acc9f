//! Simulation core
//!
//! `SimulationCore` owns the entity store, the spatial index, the event
//! queue and the random source, and is the only thing that mutates them.
//!
//! - `process_transaction` turns one transaction into one entity
//! - `tick` runs the capture pass, advances every entity and rebuilds the index
//! - `query_visible` answers renderer visibility queries from the index
//!
//! Everything runs on the caller's thread. `tick` must finish before any
//! other call is made; transactions may arrive any number of times between
//! ticks. Readers get cloned `Entity` snapshots, never mutable access.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::simulation::error::{ConfigError, SimError};
use crate::simulation::events::{EventQueue, SimEvent};
use crate::simulation::frustum::Frustum;
use crate::simulation::integrator::{self, OrbitFrame};
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{Bounds, SpatialIndex};
use crate::simulation::states::{Entity, EntityId, EntityKind, NVec3, Transaction};
use crate::simulation::store::EntityStore;
use crate::simulation::synthesis::{synthesize, synthesize_captured};

/// Upper bound on the world radius
pub const MAX_WORLD_RADIUS: f64 = 1000.0;

/// Mass at which the world radius reaches `galaxy_scale`
const WORLD_MASS_UNIT: f64 = 1000.0;

pub struct SimulationCore<R = ChaCha8Rng> {
    params: Parameters,
    store: EntityStore,
    index: SpatialIndex,
    events: EventQueue,
    rng: R,
    total_mass_ingested: f64,
    world_radius: f64,
    announced_radius: f64, // last radius sent in a WorldScaled event
    active: bool,
}

impl SimulationCore<ChaCha8Rng> {
    /// Core driven by a ChaCha8 generator seeded from `params.seed`
    pub fn new(params: Parameters) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(params.seed);
        Self::with_rng(params, rng)
    }
}

impl<R: Rng> SimulationCore<R> {
    /// Core driven by a caller-supplied random source
    pub fn with_rng(params: Parameters, rng: R) -> Result<Self, ConfigError> {
        params.validate()?;

        let world_radius = params.galaxy_scale;
        let index = SpatialIndex::new(
            Bounds::centered(0.0, 0.0, world_radius),
            params.index_max_objects,
            params.index_max_depth,
        );

        Ok(Self {
            params,
            store: EntityStore::new(),
            index,
            events: EventQueue::new(),
            rng,
            total_mass_ingested: 0.0,
            world_radius,
            announced_radius: world_radius,
            active: false,
        })
    }

    // ingestion ============================================================================

    /// Turn a transaction into an entity, or `None` if the amount is rejected
    pub fn process_transaction(&mut self, transaction: &Transaction) -> Option<Entity> {
        match self.try_process_transaction(transaction) {
            Ok(entity) => Some(entity),
            Err(err) => {
                trace!(tx = %transaction.id, %err, "transaction rejected");
                None
            }
        }
    }

    /// Same as `process_transaction`, reporting why a transaction was rejected
    pub fn try_process_transaction(&mut self, transaction: &Transaction) -> Result<Entity, SimError> {
        let amount = transaction.amount;
        let min = self.params.min_transaction_value;
        if !amount.is_finite() || amount <= 0.0 || amount < min {
            return Err(SimError::InvalidInput { amount, min });
        }

        let kind = EntityKind::classify(amount);
        let scale = kind.scale(amount);
        let orbit = synthesize(amount, &self.params, &mut self.rng);
        let arm_index = self.rng.gen_range(0..self.params.galaxy_arms);
        let phase_angle = self.rng.gen_range(0.0..TAU);

        let created = self.store.create(orbit, arm_index, phase_angle, scale, kind, amount);
        let id = created.id;

        // One-time placement; no phase advance
        let position = if orbit.is_degenerate() {
            warn!(entity = %id, radius = orbit.radius, "degenerate orbit at creation; placing at origin");
            NVec3::zeros()
        } else {
            integrator::spiral_position(&orbit, phase_angle, arm_index, &self.params)
        };

        let entity = match self.store.get_mut(id) {
            Some(entity) => {
                entity.position = position;
                entity.clone()
            }
            None => created,
        };
        self.index.insert(&entity);

        debug!(entity = %id, tx = %transaction.id, amount, kind = ?kind, scale, "entity created");

        self.total_mass_ingested += amount;
        self.rescale_world();

        self.events.push(SimEvent::EntityCreated(entity.clone()));
        Ok(entity)
    }

    /// `min(1000, galaxy_scale * log10(total / 1000))`, never negative
    fn rescale_world(&mut self) {
        let radius = (self.params.galaxy_scale * (self.total_mass_ingested / WORLD_MASS_UNIT).log10())
            .min(MAX_WORLD_RADIUS)
            .max(0.0);
        self.world_radius = radius;

        if (radius - self.announced_radius).abs() > 1.0 {
            info!(world_radius = radius, total_mass = self.total_mass_ingested, "world rescaled");
            self.announced_radius = radius;
            self.events.push(SimEvent::WorldScaled(radius));
        }
    }

    // per-tick update ======================================================================

    /// Advance the simulation by `delta_time` seconds. No-op while stopped.
    pub fn tick(&mut self, delta_time: f64) {
        if !self.active {
            return;
        }
        if !delta_time.is_finite() {
            warn!(delta_time, "non-finite delta time; tick skipped");
            return;
        }

        self.store.advance_clock(delta_time);

        let captures = self.detect_captures();
        self.advance_all(delta_time);
        self.rebuild_index();

        trace!(
            delta_time,
            entities = self.store.len(),
            captures,
            nodes = self.index.node_count(),
            "tick complete"
        );
        self.events.push(SimEvent::TickCompleted(delta_time));
    }

    /// Capture pass. Every free non-major entity inside a major body's capture
    /// radius rolls against a chance drawn from `[capture_chance_min, capture_chance_max]`.
    /// At most one capture per entity per tick. Returns the number of captures.
    fn detect_captures(&mut self) -> usize {
        // majors are never captured, so this snapshot stays valid for the whole pass
        let majors: Vec<(EntityId, NVec3, f64)> = self
            .store
            .all()
            .filter(|e| e.kind.is_major())
            .map(|e| (e.id, e.position, e.scale))
            .collect();
        if majors.is_empty() {
            return 0;
        }

        let candidates: Vec<(EntityId, NVec3, f64)> = self
            .store
            .all()
            .filter(|e| !e.kind.is_major() && !e.is_captured())
            .map(|e| (e.id, e.position, e.source_amount))
            .collect();

        let (chance_min, chance_max) = (self.params.capture_chance_min, self.params.capture_chance_max);
        let mut captures = 0;

        for (id, position, amount) in candidates {
            for &(major_id, major_position, major_scale) in &majors {
                let capture_radius = major_scale * self.params.capture_radius_multiplier;
                let distance = (position - major_position).norm();
                if distance > capture_radius {
                    continue;
                }

                let chance = self.rng.gen_range(chance_min..=chance_max);
                let roll: f64 = self.rng.gen();
                debug!(entity = %id, major = %major_id, distance, capture_radius, roll, chance, "capture check");
                if roll > chance {
                    continue;
                }

                if self.store.set_parent(id, major_id) {
                    let orbit = synthesize_captured(amount, major_scale, &self.params, &mut self.rng);
                    let phase_angle = self.rng.gen_range(0.0..TAU);
                    if let Some(entity) = self.store.get_mut(id) {
                        entity.orbit = orbit;
                        entity.phase_angle = phase_angle;
                    }
                    info!(entity = %id, parent = %major_id, radius = orbit.radius, "entity captured");
                    self.events.push(SimEvent::EntityCaptured { entity: id, parent: major_id });
                    captures += 1;
                }
                break;
            }
        }

        captures
    }

    /// Advance free entities first so captured ones read their parent's new position
    fn advance_all(&mut self, delta_time: f64) {
        let (captured, free): (Vec<&Entity>, Vec<&Entity>) = self.store.all().partition(|e| e.is_captured());
        let free: Vec<EntityId> = free.into_iter().map(|e| e.id).collect();
        let captured: Vec<(EntityId, EntityId)> = captured
            .into_iter()
            .filter_map(|e| e.parent_id.map(|p| (e.id, p)))
            .collect();

        for id in free {
            self.advance_one(id, delta_time, OrbitFrame::Galactic);
        }

        for (id, parent_id) in captured {
            let frame = match self.store.get(parent_id) {
                Some(parent) => OrbitFrame::Parent(parent.position),
                None => {
                    let err = SimError::MissingReference { entity: id, parent: parent_id };
                    warn!(%err, "integrating about the galactic centre this tick");
                    OrbitFrame::Galactic
                }
            };
            self.advance_one(id, delta_time, frame);
        }
    }

    fn advance_one(&mut self, id: EntityId, delta_time: f64, frame: OrbitFrame) {
        let params = &self.params;
        if let Some(entity) = self.store.get_mut(id) {
            if let Err(err) = integrator::advance(entity, delta_time, frame, params) {
                warn!(%err, "advance skipped");
            }
        }
    }

    /// Re-root the index on a square covering the world radius and every
    /// footprint, then insert every live entity once.
    fn rebuild_index(&mut self) {
        let half_extent = self.store.all().fold(self.world_radius.max(1.0), |acc, e| {
            acc.max(e.position.x.abs() + e.scale).max(e.position.z.abs() + e.scale)
        });
        let half_extent = if half_extent.is_finite() { half_extent } else { self.world_radius.max(1.0) };

        self.index.reset(Bounds::centered(0.0, 0.0, half_extent));
        for entity in self.store.all() {
            self.index.insert(entity);
        }
    }

    // queries ==============================================================================

    /// Entities inside `frustum`, narrowed first to a `2 * view_distance` square around the viewer
    pub fn query_visible(&self, viewer_position: &NVec3, frustum: &Frustum, view_distance: f64) -> Vec<Entity> {
        self.index
            .query_visible(viewer_position, frustum, view_distance)
            .into_iter()
            .filter_map(|id| self.store.get(id).cloned())
            .collect()
    }

    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.store.get(id).cloned()
    }

    /// Snapshot of every entity in creation order
    pub fn entities(&self) -> Vec<Entity> {
        self.store.all().cloned().collect()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn total_mass_ingested(&self) -> f64 {
        self.total_mass_ingested
    }

    pub fn world_radius(&self) -> f64 {
        self.world_radius
    }

    /// Simulation clock: total delta time of all active ticks
    pub fn elapsed(&self) -> f64 {
        self.store.now()
    }

    // eviction + capacity ==================================================================

    /// Everything except the `keep_count` most recent entities, oldest first
    pub fn oldest_beyond(&self, keep_count: usize) -> Vec<Entity> {
        self.store.oldest_beyond(keep_count)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let removed = self.store.remove(id);
        if removed {
            self.events.push(SimEvent::EntitiesEvicted(1));
        }
        removed
    }

    /// Keep only the `keep_count` most recent entities; returns how many were removed
    pub fn evict_oldest_beyond(&mut self, keep_count: usize) -> usize {
        let removed = self.store.evict_oldest_beyond(keep_count);
        if removed > 0 {
            info!(removed, remaining = self.store.len(), "evicted oldest entities");
            self.events.push(SimEvent::EntitiesEvicted(removed));
        }
        removed
    }

    /// Population as a fraction of `max_entities`
    pub fn occupancy(&self) -> f64 {
        self.store.len() as f64 / self.params.max_entities.max(1) as f64
    }

    /// `CapacityExceeded` once the population is above `max_entities`.
    /// The core never evicts on its own.
    pub fn check_capacity(&self) -> Result<(), SimError> {
        let count = self.store.len();
        let max = self.params.max_entities;
        if count > max {
            return Err(SimError::CapacityExceeded { count, max });
        }
        Ok(())
    }

    // lifecycle ============================================================================

    pub fn start(&mut self) {
        self.active = true;
        info!(entities = self.store.len(), "simulation started");
        self.events.push(SimEvent::Started);
    }

    /// Later ticks become no-ops until `start` is called again
    pub fn stop(&mut self) {
        self.active = false;
        info!(entities = self.store.len(), "simulation stopped");
        self.events.push(SimEvent::Stopped);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }
}
