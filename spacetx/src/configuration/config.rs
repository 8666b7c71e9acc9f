//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`ParametersConfig`]  – overrides for the core's constructor-time parameters
//! - [`RunConfig`]         – how long to run and how to step
//! - [`TransactionConfig`] – the transactions to feed in, in order
//! - [`ScenarioConfig`]    – top-level wrapper used to load a scenario from YAML
//!
//! Every parameter is optional; anything left out keeps its default from
//! [`Parameters::default`].
//!
//! # YAML format
//!
//! ```yaml
//! parameters:
//!   min_transaction_value: 1.0
//!   galaxy_arms: 4
//!   capture_chance_min: 0.01
//!   capture_chance_max: 0.05
//!   seed: 7
//!
//! run:
//!   ticks: 600              # number of ticks to run
//!   delta_time: 0.016       # optional, defaults to 1 / update_frequency
//!   keep_count: 500         # optional, evict down to this after every tick
//!   view_distance: 2000.0   # half-size of the overview visibility query
//!
//! transactions:
//!   - amount: 50.0
//!   - amount: 7200.0
//!     id: "tx-whale"
//!     timestamp: 12.5
//!     direction: sell
//! ```
//!
//! `Scenario::build_scenario` maps this onto the runtime types.

use serde::Deserialize;

use crate::simulation::params::Parameters;
use crate::simulation::states::{Transaction, TransactionDirection};

/// Optional overrides for [`Parameters`]
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ParametersConfig {
    pub max_entities: Option<usize>,
    pub update_frequency: Option<f64>,
    pub min_transaction_value: Option<f64>,
    pub galaxy_scale: Option<f64>,
    pub galaxy_arms: Option<usize>,
    pub galaxy_pitch: Option<f64>,
    pub spiral_tightness: Option<f64>,
    pub vertical_scale: Option<f64>,
    pub rotation_speed: Option<f64>,
    pub max_tilt: Option<f64>,
    pub gravitational_parameter: Option<f64>,
    pub base_orbital_period: Option<f64>,
    pub min_radius: Option<f64>,
    pub max_radius: Option<f64>,
    pub capture_radius_multiplier: Option<f64>,
    pub capture_chance_min: Option<f64>,
    pub capture_chance_max: Option<f64>,
    pub index_max_objects: Option<usize>,
    pub index_max_depth: Option<usize>,
    pub seed: Option<u64>,
}

impl ParametersConfig {
    /// Apply these overrides on top of the defaults
    pub fn into_parameters(self) -> Parameters {
        let d = Parameters::default();
        Parameters {
            max_entities: self.max_entities.unwrap_or(d.max_entities),
            update_frequency: self.update_frequency.unwrap_or(d.update_frequency),
            min_transaction_value: self.min_transaction_value.unwrap_or(d.min_transaction_value),
            galaxy_scale: self.galaxy_scale.unwrap_or(d.galaxy_scale),
            galaxy_arms: self.galaxy_arms.unwrap_or(d.galaxy_arms),
            galaxy_pitch: self.galaxy_pitch.unwrap_or(d.galaxy_pitch),
            spiral_tightness: self.spiral_tightness.unwrap_or(d.spiral_tightness),
            vertical_scale: self.vertical_scale.unwrap_or(d.vertical_scale),
            rotation_speed: self.rotation_speed.unwrap_or(d.rotation_speed),
            max_tilt: self.max_tilt.unwrap_or(d.max_tilt),
            gravitational_parameter: self.gravitational_parameter.unwrap_or(d.gravitational_parameter),
            base_orbital_period: self.base_orbital_period.unwrap_or(d.base_orbital_period),
            min_radius: self.min_radius.unwrap_or(d.min_radius),
            max_radius: self.max_radius.unwrap_or(d.max_radius),
            capture_radius_multiplier: self.capture_radius_multiplier.unwrap_or(d.capture_radius_multiplier),
            capture_chance_min: self.capture_chance_min.unwrap_or(d.capture_chance_min),
            capture_chance_max: self.capture_chance_max.unwrap_or(d.capture_chance_max),
            index_max_objects: self.index_max_objects.unwrap_or(d.index_max_objects),
            index_max_depth: self.index_max_depth.unwrap_or(d.index_max_depth),
            seed: self.seed.unwrap_or(d.seed),
        }
    }
}

/// How a scenario is stepped
#[derive(Deserialize, Debug, Clone)]
pub struct RunConfig {
    pub ticks: usize,                // number of ticks to run
    pub delta_time: Option<f64>,     // seconds per tick, defaults to 1 / update_frequency
    pub keep_count: Option<usize>,   // evict down to this many entities after every tick
    #[serde(default = "default_view_distance")]
    pub view_distance: f64,          // half-size of the overview visibility query
}

fn default_view_distance() -> f64 {
    2000.0
}

/// One input transaction
#[derive(Deserialize, Debug, Clone)]
pub struct TransactionConfig {
    pub amount: f64,
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: f64, // seconds, carried through untouched
    #[serde(default)]
    pub direction: TransactionDirection,
}

impl TransactionConfig {
    /// Runtime transaction; `index` names it when no id is given
    pub fn into_transaction(self, index: usize) -> Transaction {
        Transaction {
            id: self.id.unwrap_or_else(|| format!("tx-{index}")),
            amount: self.amount,
            timestamp: self.timestamp,
            direction: self.direction,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub parameters: ParametersConfig, // core parameters
    pub run: RunConfig,               // stepping
    #[serde(default)]
    pub transactions: Vec<TransactionConfig>, // input stream, fed in order
}
