pub mod states;
pub mod params;
pub mod error;
pub mod synthesis;
pub mod store;
pub mod quadtree;
pub mod frustum;
pub mod integrator;
pub mod events;
pub mod engine;
pub mod scenario;
