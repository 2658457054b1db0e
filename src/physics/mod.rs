pub mod engine;
pub mod state;

pub use engine::{PhysicsEngine, REBOUND_EPSILON, Wall, WorldBounds};
pub use state::{PhysicsState, heading, wrap_angle};
