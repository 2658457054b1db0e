use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::entity::{BodyFamily, Entity, LifecycleError};
use crate::lifecycle::{LifeCell, LifeState};
use crate::physics::PhysicsEngine;
use crate::player::{Pilot, PlayerCommand};
use crate::simulation::Simulation;

/// How a body's task runs: its tick cadence and an optional cutoff after
/// which the body stops self-accelerating (powered projectiles burn out).
#[derive(Debug, Clone, Copy)]
pub struct RunProfile {
    pub tick_interval: Duration,
    pub accel_cutoff: Option<Duration>,
}

/// An entity bound to one dedicated tokio task.
///
/// The task free-runs the integration loop and reports every computed step
/// to the simulation pipeline; its lifetime is coupled to the entity's
/// lifecycle and the simulation's. An optional [`Pilot`] makes the body
/// player-controlled.
pub struct DynamicBody {
    entity: Entity,
    profile: RunProfile,
    pilot: Option<Pilot>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DynamicBody {
    pub fn new(entity: Entity, profile: RunProfile, pilot: Option<Pilot>) -> Self {
        Self {
            entity,
            profile,
            pilot,
            task: Mutex::new(None),
        }
    }

    pub fn id(&self) -> u64 {
        self.entity.id()
    }

    pub fn family(&self) -> BodyFamily {
        self.entity.family()
    }

    pub fn asset(&self) -> &str {
        self.entity.asset()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn life(&self) -> &LifeCell {
        self.entity.life()
    }

    pub fn engine(&self) -> &PhysicsEngine {
        self.entity.engine()
    }

    pub fn pilot(&self) -> Option<&Pilot> {
        self.pilot.as_ref()
    }

    pub fn profile(&self) -> RunProfile {
        self.profile
    }

    /// Activates the entity and spawns its single dedicated task.
    pub fn activate(self: Arc<Self>) -> Result<(), LifecycleError> {
        self.entity.activate()?;
        // activate() already proved the owner is present and alive.
        let simulation = self
            .entity
            .simulation()
            .ok_or(LifecycleError::NoSimulation)?;
        let handle = tokio::spawn(run_body(Arc::clone(&self), simulation));
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        info!(id = self.id(), family = ?self.family(), "body activated");
        Ok(())
    }

    /// Hands the task handle to the caller, once. Used by the simulation's
    /// shutdown to join all body tasks.
    pub fn take_task(&self) -> Option<JoinHandle<()>> {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Routes a control command to the pilot. Returns false for bodies
    /// nobody pilots.
    pub fn apply_command(&self, command: PlayerCommand) -> bool {
        match &self.pilot {
            Some(pilot) => {
                pilot.apply(command, self.entity.engine());
                true
            }
            None => false,
        }
    }
}

/// The body's integration loop.
///
/// Every tick: integrate, report to the pipeline, sleep. Termination is
/// cooperative; the exit conditions are polled once per tick, so a shutdown
/// or death takes effect within one tick interval. On exit the body removes
/// itself from the simulation's collections.
async fn run_body(body: Arc<DynamicBody>, simulation: Arc<Simulation>) {
    let spawned_at = Instant::now();
    let mut accel_cutoff = body.profile.accel_cutoff;
    debug!(id = body.id(), "body task started");

    loop {
        if body.life().is(LifeState::Dead) || simulation.is_stopped() {
            break;
        }

        if body.life().is(LifeState::Alive) && simulation.is_alive() {
            let (next, previous) = body.engine().calc_new_values();
            simulation.process_events(&body, next, previous).await;
        }

        if let Some(cutoff) = accel_cutoff {
            if spawned_at.elapsed() >= cutoff {
                body.engine().reset_acceleration();
                accel_cutoff = None;
            }
        }

        tokio::time::sleep(body.profile.tick_interval).await;
    }

    debug!(id = body.id(), state = ?body.life().load(), "body task exiting");
    simulation.retire(body.id()).await;
}
