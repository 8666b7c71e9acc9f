//! Error types for the simulation core.
//!
//! Nothing in here is fatal. `SimError` values are produced by the fallible
//! inner operations and the orchestrator either returns them to the caller
//! or logs them and degrades (skips the affected entity for one tick).

use thiserror::Error;

use crate::simulation::states::EntityId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Transaction amount below the configured minimum, non-positive, or not finite
    #[error("transaction amount {amount} rejected (minimum {min})")]
    InvalidInput { amount: f64, min: f64 },

    /// A captured entity points at a parent that no longer exists
    #[error("{entity} references missing parent {parent}")]
    MissingReference { entity: EntityId, parent: EntityId },

    /// Orbit cannot be integrated (radius <= 0 or non-finite parameters)
    #[error("{entity} has a degenerate orbit (radius {radius})")]
    DegenerateOrbit { entity: EntityId, radius: f64 },

    /// Population is above `max_entities`; callers are expected to evict
    #[error("population {count} exceeds capacity {max}")]
    CapacityExceeded { count: usize, max: usize },
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("parameter `{name}` must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("capture chance range [{min}, {max}] must satisfy 0 <= min <= max <= 1")]
    CaptureChanceRange { min: f64, max: f64 },

    #[error("radius range [{min}, {max}] must satisfy 0 < min < max")]
    RadiusRange { min: f64, max: f64 },
}
