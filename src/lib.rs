pub mod authority;
pub mod body;
pub mod config;
pub mod counters;
pub mod entity;
pub mod ids;
pub mod lifecycle;
pub mod physics;
pub mod player;
pub mod simulation;
pub mod snapshot;
pub mod tuning;
pub mod weapons;

pub use authority::{DecisionAuthority, StockAuthority};
pub use simulation::{SimSettings, Simulation};
