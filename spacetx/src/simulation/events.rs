//! Events produced by the simulation core.
//!
//! The core never calls back into its consumers. Each operation appends
//! tagged events to a queue, and the caller drains the queue after
//! `process_transaction` / `tick` returns.

use std::collections::VecDeque;

use crate::simulation::states::{Entity, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A transaction was accepted; carries a snapshot of the new entity
    EntityCreated(Entity),
    /// World radius moved by more than one unit since it was last announced
    WorldScaled(f64),
    /// A free entity was captured by a major body
    EntityCaptured { entity: EntityId, parent: EntityId },
    /// Entities removed through the core's eviction surface
    EntitiesEvicted(usize),
    /// An active tick finished; carries its delta time
    TickCompleted(f64),
    Started,
    Stopped,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.pending.push_back(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
