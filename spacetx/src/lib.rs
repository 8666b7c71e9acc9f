pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Entity, EntityId, EntityKind, NVec3, OrbitDescriptor, Transaction, TransactionDirection};
pub use simulation::params::Parameters;
pub use simulation::error::{ConfigError, SimError};
pub use simulation::synthesis::{synthesize, synthesize_captured};
pub use simulation::store::EntityStore;
pub use simulation::quadtree::{Bounds, Footprint, SpatialIndex};
pub use simulation::frustum::Frustum;
pub use simulation::integrator::{advance, advance_phase, effective_period, spiral_position, OrbitFrame};
pub use simulation::events::SimEvent;
pub use simulation::engine::SimulationCore;
pub use simulation::scenario::{RunSummary, Scenario};

pub use configuration::config::{ParametersConfig, RunConfig, ScenarioConfig, TransactionConfig};

pub use benchmark::benchmark::{bench_tick, bench_tick_curve, bench_visibility};
