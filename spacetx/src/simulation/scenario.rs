//! Build runnable scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`:
//! - a `SimulationCore` built from the merged `Parameters`
//! - the run settings (tick count, step, eviction target)
//! - the transaction stream, fed in order
//!
//! `Scenario::run` drives the core headlessly the way a render loop would:
//! feed the transactions that arrived this frame, tick, evict, drain events.

use tracing::info;

use crate::configuration::config::ScenarioConfig;
use crate::simulation::engine::SimulationCore;
use crate::simulation::error::ConfigError;
use crate::simulation::events::SimEvent;
use crate::simulation::frustum::Frustum;
use crate::simulation::states::{NVec3, Transaction};

/// Runtime stepping settings
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub ticks: usize,
    pub delta_time: f64,
    pub keep_count: Option<usize>,
    pub view_distance: f64,
}

/// What happened during `Scenario::run`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub entities: usize,
    pub captured: usize,
    pub evicted: usize,
    pub world_rescales: usize,
    pub world_radius: f64,
    pub total_mass: f64,
    pub visible_from_overview: usize,
    pub events: usize,
}

pub struct Scenario {
    pub core: SimulationCore,
    pub run: RunSettings,
    pub transactions: Vec<Transaction>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        let parameters = cfg.parameters.into_parameters();

        let delta_time = cfg.run.delta_time.unwrap_or_else(|| parameters.frame_delta());
        if !(delta_time.is_finite() && delta_time >= 0.0) {
            return Err(ConfigError::Negative { name: "delta_time", value: delta_time });
        }
        let run = RunSettings {
            ticks: cfg.run.ticks,
            delta_time,
            keep_count: cfg.run.keep_count,
            view_distance: cfg.run.view_distance,
        };

        let transactions = cfg
            .transactions
            .into_iter()
            .enumerate()
            .map(|(i, tc)| tc.into_transaction(i))
            .collect();

        let core = SimulationCore::new(parameters)?;

        Ok(Self { core, run, transactions })
    }

    /// Run every tick, spreading the transactions evenly across them
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let per_tick = if self.run.ticks == 0 {
            self.transactions.len()
        } else {
            self.transactions.len().div_ceil(self.run.ticks)
        };
        let mut pending = self.transactions.iter();

        self.core.start();

        for tick in 0..self.run.ticks.max(1) {
            for tx in pending.by_ref().take(per_tick) {
                match self.core.process_transaction(tx) {
                    Some(_) => summary.accepted += 1,
                    None => summary.rejected += 1,
                }
            }

            if tick < self.run.ticks {
                self.core.tick(self.run.delta_time);
                summary.ticks += 1;
            }

            if let Some(keep) = self.run.keep_count {
                self.core.evict_oldest_beyond(keep);
            }

            for event in self.core.drain_events() {
                summary.events += 1;
                match event {
                    SimEvent::EntityCaptured { .. } => summary.captured += 1,
                    SimEvent::EntitiesEvicted(n) => summary.evicted += n,
                    SimEvent::WorldScaled(_) => summary.world_rescales += 1,
                    _ => {}
                }
            }
        }

        self.core.stop();
        summary.events += self.core.drain_events().len();

        let (eye, frustum) = self.overview();
        summary.visible_from_overview = self
            .core
            .query_visible(&eye, &frustum, self.run.view_distance)
            .len();
        summary.entities = self.core.store().len();
        summary.world_radius = self.core.world_radius();
        summary.total_mass = self.core.total_mass_ingested();

        info!(
            ticks = summary.ticks,
            entities = summary.entities,
            captured = summary.captured,
            evicted = summary.evicted,
            world_radius = summary.world_radius,
            "scenario finished"
        );
        summary
    }

    /// Top-down camera framing the whole population
    pub fn overview(&self) -> (NVec3, Frustum) {
        let extent = self.core.store().all().fold(self.core.world_radius(), |acc, e| {
            acc.max(e.position.abs().max() + e.scale)
        });
        Frustum::top_down(0.0, 0.0, extent)
    }
}
