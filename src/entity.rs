use std::sync::{Arc, Weak};

use crate::counters::SimCounters;
use crate::ids;
use crate::lifecycle::{LifeCell, LifeState};
use crate::physics::{PhysicsEngine, PhysicsState};
use crate::simulation::Simulation;

/// Coarse body category. Drives decision strategy and the per-family
/// lifecycle tallies, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFamily {
    Ship,
    Asteroid,
    Projectile,
}

/// Sequencing mistakes around [`Entity::activate`]. These indicate a caller
/// bug, not a runtime condition, and are never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The owning simulation has been dropped or was never assigned.
    NoSimulation,
    /// The owning simulation is not alive yet (or already stopped).
    SimulationNotAlive,
    /// The entity already left the Starting state.
    NotStarting,
}

/// Identity plus lifecycle for one simulated body.
///
/// The entity exclusively owns its [`PhysicsEngine`]; the simulation is only
/// reachable through a weak reference for lookups, never owned.
#[derive(Debug)]
pub struct Entity {
    id: u64,
    family: BodyFamily,
    asset: String,
    life: LifeCell,
    engine: PhysicsEngine,
    simulation: Weak<Simulation>,
    counters: Arc<SimCounters>,
}

impl Entity {
    pub fn new(
        family: BodyFamily,
        asset: String,
        start: PhysicsState,
        simulation: Weak<Simulation>,
        counters: Arc<SimCounters>,
    ) -> Self {
        counters.record_created(family);
        Self {
            id: ids::fresh_id(),
            family,
            asset,
            life: LifeCell::new(),
            engine: PhysicsEngine::new(start),
            simulation,
            counters,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn family(&self) -> BodyFamily {
        self.family
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn life(&self) -> &LifeCell {
        &self.life
    }

    pub fn state(&self) -> LifeState {
        self.life.load()
    }

    pub fn engine(&self) -> &PhysicsEngine {
        &self.engine
    }

    pub fn simulation(&self) -> Option<Arc<Simulation>> {
        self.simulation.upgrade()
    }

    /// Starting -> Alive. Fails fast when the owning simulation is missing or
    /// not alive, or when the entity already left Starting. Only a successful
    /// activation bumps the family's alive tally.
    pub fn activate(&self) -> Result<(), LifecycleError> {
        let simulation = self
            .simulation
            .upgrade()
            .ok_or(LifecycleError::NoSimulation)?;
        if !simulation.is_alive() {
            return Err(LifecycleError::SimulationNotAlive);
        }
        if !self.life.transition(LifeState::Starting, LifeState::Alive) {
            return Err(LifecycleError::NotStarting);
        }
        self.counters.record_activated(self.family);
        Ok(())
    }

    /// Alive (or pipeline-owned HandsOff) -> Dead, once. Returns whether this
    /// call performed the transition; repeated calls are no-ops, so the
    /// alive/dead tallies never double-count.
    pub fn die(&self) -> bool {
        let died = self.life.transition(LifeState::Alive, LifeState::Dead)
            || self.life.transition(LifeState::HandsOff, LifeState::Dead);
        if died {
            self.counters.record_death(self.family);
        }
        died
    }

    pub fn pause(&self) -> bool {
        self.life.transition(LifeState::Alive, LifeState::Paused)
    }

    /// Paused -> Alive. The engine snapshot is re-stamped before the flip,
    /// so the next integration step starts at the freeze point instead of
    /// spanning the whole paused window.
    pub fn resume(&self) -> bool {
        if !self.life.is(LifeState::Paused) {
            return false;
        }
        self.engine.restamp();
        self.life.transition(LifeState::Paused, LifeState::Alive)
    }
}
