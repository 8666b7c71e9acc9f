//! Runtime parameters of the simulation core
//!
//! `Parameters` is the constructor-time configuration surface. It is built
//! from defaults or from a `ParametersConfig` loaded out of YAML, validated
//! once, and never mutated afterwards.

use std::f64::consts::{PI, TAU};

use crate::simulation::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub max_entities: usize,        // occupancy threshold reported to callers
    pub update_frequency: f64,      // ticks per second expected from the driver
    pub min_transaction_value: f64, // smaller amounts are rejected
    pub galaxy_scale: f64,          // world radius scale
    pub galaxy_arms: usize,         // number of spiral arms
    pub galaxy_pitch: f64,          // arm pitch, carried for renderers
    pub spiral_tightness: f64,      // exponent of the log-spiral warp
    pub vertical_scale: f64,        // height of the vertical wobble relative to radius
    pub rotation_speed: f64,        // global rotation speed, carried for renderers
    pub max_tilt: f64,              // radians
    pub gravitational_parameter: f64, // period scale, carried for renderers
    pub base_orbital_period: f64,   // seconds, period at min_radius
    pub min_radius: f64,
    pub max_radius: f64,
    pub capture_radius_multiplier: f64, // capture radius = major scale * this
    pub capture_chance_min: f64,
    pub capture_chance_max: f64,
    pub index_max_objects: usize,   // objects per quadtree node before splitting
    pub index_max_depth: usize,     // quadtree depth limit
    pub seed: u64,                  // deterministic seed for the default random source
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_entities: 1000,
            update_frequency: 60.0,
            min_transaction_value: 1.0,
            galaxy_scale: 100.0,
            galaxy_arms: 4,
            galaxy_pitch: 0.2,
            spiral_tightness: 0.1,
            vertical_scale: 0.1,
            rotation_speed: 0.5,
            max_tilt: PI / 6.0,
            gravitational_parameter: 100.0,
            base_orbital_period: 60.0,
            min_radius: 20.0,
            max_radius: 100.0,
            capture_radius_multiplier: 10.0,
            capture_chance_min: 0.01,
            capture_chance_max: 0.05,
            index_max_objects: 10,
            index_max_depth: 5,
            seed: 42,
        }
    }
}

impl Parameters {
    /// Reject values the core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.galaxy_arms == 0 {
            return Err(ConfigError::ZeroCount { name: "galaxy_arms" });
        }
        if self.index_max_objects == 0 {
            return Err(ConfigError::ZeroCount { name: "index_max_objects" });
        }

        let positive = [
            ("update_frequency", self.update_frequency),
            ("min_transaction_value", self.min_transaction_value),
            ("galaxy_scale", self.galaxy_scale),
            ("base_orbital_period", self.base_orbital_period),
            ("capture_radius_multiplier", self.capture_radius_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("spiral_tightness", self.spiral_tightness),
            ("vertical_scale", self.vertical_scale),
            ("max_tilt", self.max_tilt),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        if !(self.min_radius > 0.0 && self.min_radius < self.max_radius && self.max_radius.is_finite()) {
            return Err(ConfigError::RadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }

        let (lo, hi) = (self.capture_chance_min, self.capture_chance_max);
        if !(0.0 <= lo && lo <= hi && hi <= 1.0) {
            return Err(ConfigError::CaptureChanceRange { min: lo, max: hi });
        }

        Ok(())
    }

    /// Angular offset of a galaxy arm
    pub fn arm_offset(&self, arm_index: usize) -> f64 {
        TAU * arm_index as f64 / self.galaxy_arms as f64
    }

    /// Fixed step implied by `update_frequency`
    pub fn frame_delta(&self) -> f64 {
        1.0 / self.update_frequency
    }
}
