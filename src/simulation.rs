use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::authority::{Action, ActionKind, BodyEvent, DecisionAuthority, Executor};
use crate::body::{DynamicBody, RunProfile};
use crate::config;
use crate::counters::SimCounters;
use crate::entity::{BodyFamily, Entity};
use crate::ids;
use crate::lifecycle::{HandsOffGuard, LifeState, SimState, SimStateCell};
use crate::physics::{PhysicsState, WorldBounds, heading, wrap_angle};
use crate::player::{Pilot, PlayerCommand};
use crate::snapshot::{BodyView, SceneryView};
use crate::tuning::fragments::FragmentTuning;
use crate::tuning::player::PlayerTuning;
use crate::weapons::WeaponConfig;

/// Shared configuration for one simulation world.
#[derive(Debug, Clone, Copy)]
pub struct SimSettings {
    /// Playable area bodies live in.
    pub bounds: WorldBounds,
    /// One cap across all dynamic bodies, players and projectiles included.
    pub body_capacity: usize,
    /// Separate cap for static/decorative bodies.
    pub scenery_capacity: usize,
    /// Default tick interval for body tasks.
    pub tick_interval: Duration,
}

impl SimSettings {
    /// Runtime settings from the environment, with compiled defaults.
    pub fn from_env() -> Self {
        Self {
            bounds: WorldBounds {
                width: config::world_width(),
                height: config::world_height(),
            },
            body_capacity: config::body_capacity(),
            scenery_capacity: config::scenery_capacity(),
            tick_interval: config::tick_interval(),
        }
    }
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            bounds: WorldBounds {
                width: config::DEFAULT_WORLD_WIDTH,
                height: config::DEFAULT_WORLD_HEIGHT,
            },
            body_capacity: config::DEFAULT_BODY_CAPACITY,
            scenery_capacity: config::DEFAULT_SCENERY_CAPACITY,
            tick_interval: config::DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Why a creation call refused. `AtCapacity` is a plain refusal the caller
/// may retry later; the other variants are sequencing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    NotAlive,
    AtCapacity,
    PlayerExists,
}

/// Why [`Simulation::activate`] refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateError {
    /// World dimensions must be strictly positive.
    InvalidBounds,
    /// The simulation already left the Starting state.
    NotStarting,
}

/// Everything needed to create one dynamic body.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub family: BodyFamily,
    pub asset: String,
    pub start: PhysicsState,
    /// Overrides the simulation's default tick interval.
    pub tick_interval: Option<Duration>,
    /// Stops the body's self-acceleration this long after spawn.
    pub accel_cutoff: Option<Duration>,
}

impl BodySpec {
    pub fn new(family: BodyFamily, asset: &str, start: PhysicsState) -> Self {
        Self {
            family,
            asset: asset.to_string(),
            start,
            tick_interval: None,
            accel_cutoff: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryKind {
    Static,
    Decor,
    Gravity,
}

/// A body with a fixed pose: no physics engine, no task, no lifecycle.
#[derive(Debug, Clone)]
pub struct Scenery {
    pub id: u64,
    pub kind: SceneryKind,
    pub asset: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

/// Placement for one scenery body.
#[derive(Debug, Clone)]
pub struct ScenerySpec {
    pub asset: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl ScenerySpec {
    pub fn new(asset: &str, size: f64, x: f64, y: f64) -> Self {
        Self {
            asset: asset.to_string(),
            size,
            x,
            y,
            angle: 0.0,
        }
    }
}

/// The arbiter owning every entity collection.
///
/// Bodies report each computed tick here; the simulation detects events,
/// delegates strategy to the [`DecisionAuthority`], applies the decided
/// actions and enforces the population caps. It decides mechanics only,
/// never strategy.
pub struct Simulation {
    settings: SimSettings,
    authority: Arc<dyn DecisionAuthority>,
    counters: Arc<SimCounters>,
    state: SimStateCell,
    /// Weak self-handle passed into every entity at creation.
    self_ref: Weak<Simulation>,
    bodies: RwLock<HashMap<u64, Arc<DynamicBody>>>,
    /// player id -> body id
    pilots: RwLock<HashMap<u64, u64>>,
    scenery: RwLock<HashMap<u64, Scenery>>,
}

impl Simulation {
    pub fn new(settings: SimSettings, authority: Arc<dyn DecisionAuthority>) -> Arc<Self> {
        Self::with_counters(settings, authority, Arc::new(SimCounters::new()))
    }

    /// Like [`Simulation::new`] with caller-shared lifecycle counters.
    pub fn with_counters(
        settings: SimSettings,
        authority: Arc<dyn DecisionAuthority>,
        counters: Arc<SimCounters>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            settings,
            authority,
            counters,
            state: SimStateCell::new(),
            self_ref: self_ref.clone(),
            bodies: RwLock::new(HashMap::new()),
            pilots: RwLock::new(HashMap::new()),
            scenery: RwLock::new(HashMap::new()),
        })
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn counters(&self) -> &SimCounters {
        &self.counters
    }

    pub fn state(&self) -> SimState {
        self.state.load()
    }

    pub fn is_alive(&self) -> bool {
        self.state.is(SimState::Alive)
    }

    pub fn is_stopped(&self) -> bool {
        self.state.is(SimState::Stopped)
    }

    /// Starting -> Alive, after validating the world setup.
    pub fn activate(&self) -> Result<(), ActivateError> {
        if !self.settings.bounds.is_valid() {
            return Err(ActivateError::InvalidBounds);
        }
        if !self.state.transition(SimState::Starting, SimState::Alive) {
            return Err(ActivateError::NotStarting);
        }
        info!(
            width = self.settings.bounds.width,
            height = self.settings.bounds.height,
            capacity = self.settings.body_capacity,
            "simulation activated"
        );
        Ok(())
    }

    /// Stops the simulation and joins every body task.
    ///
    /// Tasks poll the stopped state once per tick, so the join lags by at
    /// most one tick interval per body.
    pub async fn shutdown(&self) {
        if !self.state.transition(SimState::Alive, SimState::Stopped) {
            debug!("shutdown ignored; simulation not alive");
            return;
        }
        info!("simulation stopping");

        let bodies: Vec<Arc<DynamicBody>> = self.bodies.read().await.values().cloned().collect();
        let handles: Vec<_> = bodies.iter().filter_map(|body| body.take_task()).collect();
        for result in join_all(handles).await {
            if let Err(error) = result {
                warn!(%error, "body task ended abnormally");
            }
        }

        info!(counters = ?self.counters.report(), "simulation stopped");
    }

    pub async fn body(&self, id: u64) -> Option<Arc<DynamicBody>> {
        self.bodies.read().await.get(&id).cloned()
    }

    pub async fn player_body(&self, player_id: u64) -> Option<Arc<DynamicBody>> {
        let body_id = { self.pilots.read().await.get(&player_id).copied() }?;
        self.bodies.read().await.get(&body_id).cloned()
    }

    pub async fn body_count(&self) -> usize {
        self.bodies.read().await.len()
    }

    /// Creates, registers and activates one dynamic body.
    pub async fn spawn_body(&self, spec: BodySpec) -> Result<u64, SpawnError> {
        self.insert_body(spec, None).await
    }

    /// Creates a player-controlled body carrying the given loadout. One body
    /// per player id.
    pub async fn spawn_player(
        &self,
        player_id: u64,
        spec: BodySpec,
        loadout: Vec<WeaponConfig>,
    ) -> Result<u64, SpawnError> {
        let pilot = Pilot::new(player_id, PlayerTuning::default(), loadout);
        let id = self.insert_body(spec, Some(pilot)).await?;
        info!(player_id, body_id = id, "player spawned");
        Ok(id)
    }

    async fn insert_body(&self, spec: BodySpec, pilot: Option<Pilot>) -> Result<u64, SpawnError> {
        if !self.is_alive() {
            return Err(SpawnError::NotAlive);
        }

        let body = {
            let mut bodies = self.bodies.write().await;
            if bodies.len() >= self.settings.body_capacity {
                debug!(
                    family = ?spec.family,
                    occupied = bodies.len(),
                    "spawn refused at capacity"
                );
                return Err(SpawnError::AtCapacity);
            }
            let mut pilots = self.pilots.write().await;
            if let Some(pilot) = &pilot {
                if pilots.contains_key(&pilot.player_id()) {
                    return Err(SpawnError::PlayerExists);
                }
            }

            let entity = Entity::new(
                spec.family,
                spec.asset,
                spec.start,
                self.self_ref.clone(),
                Arc::clone(&self.counters),
            );
            let profile = RunProfile {
                tick_interval: spec.tick_interval.unwrap_or(self.settings.tick_interval),
                accel_cutoff: spec.accel_cutoff,
            };
            let body = Arc::new(DynamicBody::new(entity, profile, pilot));
            if let Some(pilot) = body.pilot() {
                pilots.insert(pilot.player_id(), body.id());
            }
            bodies.insert(body.id(), Arc::clone(&body));
            body
        };

        match Arc::clone(&body).activate() {
            Ok(()) => Ok(body.id()),
            Err(error) => {
                // The simulation stopped between the liveness check and the
                // activation; undo the registration.
                warn!(id = body.id(), ?error, "activation failed during spawn");
                self.remove_body_entry(body.id()).await;
                Err(SpawnError::NotAlive)
            }
        }
    }

    /// Places a scenery body. Seeding is allowed while the simulation is
    /// still starting.
    pub async fn add_scenery(
        &self,
        kind: SceneryKind,
        spec: ScenerySpec,
    ) -> Result<u64, SpawnError> {
        if self.is_stopped() {
            return Err(SpawnError::NotAlive);
        }
        let mut scenery = self.scenery.write().await;
        if scenery.len() >= self.settings.scenery_capacity {
            debug!(?kind, occupied = scenery.len(), "scenery refused at capacity");
            return Err(SpawnError::AtCapacity);
        }
        let id = ids::fresh_id();
        scenery.insert(
            id,
            Scenery {
                id,
                kind,
                asset: spec.asset,
                size: spec.size,
                x: spec.x,
                y: spec.y,
                angle: spec.angle,
            },
        );
        debug!(id, ?kind, "scenery added");
        Ok(id)
    }

    async fn remove_body_entry(&self, id: u64) -> Option<Arc<DynamicBody>> {
        let mut bodies = self.bodies.write().await;
        let removed = bodies.remove(&id);
        if let Some(body) = &removed {
            if let Some(pilot) = body.pilot() {
                self.pilots.write().await.remove(&pilot.player_id());
            }
        }
        removed
    }

    /// Drops a finished body from the collections. Called by the body's own
    /// task as its last act.
    pub(crate) async fn retire(&self, id: u64) {
        if let Some(body) = self.remove_body_entry(id).await {
            debug!(id, family = ?body.family(), "body retired");
        }
    }

    /// One pipeline run for one body's computed tick.
    ///
    /// The HandsOff acquisition transfers ownership of the body to the
    /// pipeline for the duration: nothing else mutates its physics mid-run,
    /// and the guard releases on every exit path. Errors and panics inside
    /// the run are contained to this body and this tick; the body is rolled
    /// back to the state it had before the call.
    pub async fn process_events(
        &self,
        body: &DynamicBody,
        next: PhysicsState,
        previous: PhysicsState,
    ) {
        if !self.is_alive() || !body.life().is(LifeState::Alive) {
            return;
        }

        let tick = AssertUnwindSafe(self.owned_tick(body, next, previous)).catch_unwind();
        if tick.await.is_err() {
            warn!(id = body.id(), "pipeline panicked; tick rolled back");
        }
    }

    async fn owned_tick(
        &self,
        body: &DynamicBody,
        next: PhysicsState,
        previous: PhysicsState,
    ) {
        let Some(_guard) = HandsOffGuard::acquire(body.life()) else {
            return;
        };

        // Detect: independent per-axis checks, so a corner yields two events.
        let mut events: Vec<BodyEvent> = self
            .settings
            .bounds
            .crossed_walls(next.x, next.y)
            .into_iter()
            .map(BodyEvent::Crossed)
            .collect();
        if let Some(weapon) = body.pilot().and_then(|pilot| pilot.active_weapon()) {
            let dt = next.timestamp.duration_since(previous.timestamp);
            if weapon.must_fire_now(dt.as_secs_f64()) {
                events.push(BodyEvent::FireIntent);
            }
        }

        // Resolve: strategy is the authority's business alone.
        let decided = match self.authority.decide_actions(body, &events).await {
            Ok(actions) => actions,
            Err(error) => {
                warn!(id = body.id(), %error, "authority failed; tick dropped");
                return;
            }
        };

        let mut actions: Vec<Action> = decided
            .into_iter()
            .filter(|action| action.kind != ActionKind::None)
            .collect();
        if actions.is_empty() {
            return;
        }
        actions.sort_by_key(|action| action.priority);

        // Apply, lowest priority first; a Die ends the sequence since the
        // remaining actions would act on a corpse.
        for action in actions {
            if body.life().is(LifeState::Dead) {
                break;
            }
            match action.executor {
                Executor::Body => self.apply_body_action(body, action.kind, &next, &previous),
                Executor::Model => self.apply_model_action(body, action.kind).await,
            }
        }
    }

    fn apply_body_action(
        &self,
        body: &DynamicBody,
        kind: ActionKind,
        next: &PhysicsState,
        previous: &PhysicsState,
    ) {
        match kind {
            ActionKind::Move => body.engine().install(*next),
            ActionKind::Rebound(wall) => {
                let bounced = body.engine().rebound(wall, previous);
                debug!(id = body.id(), ?wall, x = bounced.x, y = bounced.y, "body rebounded");
            }
            ActionKind::Die => {
                if body.entity().die() {
                    info!(id = body.id(), family = ?body.family(), "body died");
                }
            }
            other => {
                debug!(id = body.id(), action = ?other, "not a body-executed action; skipped");
            }
        }
    }

    async fn apply_model_action(&self, body: &DynamicBody, kind: ActionKind) {
        match kind {
            ActionKind::Fire => self.fire_projectile(body).await,
            ActionKind::ExplodeInFragments => self.explode_in_fragments(body).await,
            other => {
                debug!(id = body.id(), action = ?other, "not a model-executed action; skipped");
            }
        }
    }

    /// Spawns a projectile from the shooter's active weapon, through the
    /// same capacity-checked path as every other dynamic body. A refusal is
    /// a lost shot, not an error.
    async fn fire_projectile(&self, shooter: &DynamicBody) {
        let Some(config) = shooter
            .pilot()
            .and_then(|pilot| pilot.active_weapon_config())
        else {
            debug!(id = shooter.id(), "fire skipped; no weapon selected");
            return;
        };

        let state = shooter.engine().snapshot();
        let (hx, hy) = heading(state.angle);
        let start = PhysicsState {
            timestamp: Instant::now(),
            x: state.x + config.shooting_offset * hx,
            y: state.y + config.shooting_offset * hy,
            vx: state.vx + config.firing_speed * hx,
            vy: state.vy + config.firing_speed * hy,
            ax: config.acceleration * hx,
            ay: config.acceleration * hy,
            angle: state.angle,
            angular_velocity: 0.0,
            angular_accel: 0.0,
            thrust: 0.0,
            size: config.projectile_size,
        };
        let mut spec = BodySpec::new(BodyFamily::Projectile, &config.projectile_asset, start);
        if config.acceleration != 0.0 {
            spec.accel_cutoff = Some(config.acceleration_duration);
        }

        match self.spawn_body(spec).await {
            Ok(id) => debug!(shooter = shooter.id(), projectile = id, "projectile fired"),
            Err(error) => debug!(shooter = shooter.id(), ?error, "projectile refused"),
        }
    }

    /// Shatters the body into smaller asteroids fanned out evenly around its
    /// heading. Bodies below the minimum fragmenting size shatter into
    /// nothing.
    async fn explode_in_fragments(&self, body: &DynamicBody) {
        let tuning = FragmentTuning::default();
        let parent = body.engine().snapshot();
        if parent.size < tuning.min_parent_size {
            debug!(id = body.id(), size = parent.size, "too small to fragment");
            return;
        }

        let step = 360.0 / tuning.count as f64;
        let speed = parent.speed() + tuning.speed_boost;
        let mut spawned = 0;
        for index in 0..tuning.count {
            let fragment_angle = wrap_angle(parent.angle + index as f64 * step);
            let (hx, hy) = heading(fragment_angle);
            let start = PhysicsState {
                timestamp: Instant::now(),
                x: parent.x,
                y: parent.y,
                vx: speed * hx,
                vy: speed * hy,
                ax: 0.0,
                ay: 0.0,
                angle: fragment_angle,
                angular_velocity: parent.angular_velocity,
                angular_accel: 0.0,
                thrust: 0.0,
                size: parent.size * 0.5,
            };
            let spec = BodySpec::new(BodyFamily::Asteroid, body.asset(), start);
            match self.spawn_body(spec).await {
                Ok(_) => spawned += 1,
                Err(error) => {
                    debug!(id = body.id(), ?error, "fragment refused");
                    break;
                }
            }
        }
        debug!(id = body.id(), spawned, "body fragmented");
    }

    /// Fresh views of every dynamic body that is not dead. Each body's
    /// fields come from one engine snapshot, so the render layer never sees
    /// a torn state.
    pub async fn body_views(&self) -> Vec<BodyView> {
        let bodies = self.bodies.read().await;
        bodies
            .values()
            .filter(|body| !body.life().is(LifeState::Dead))
            .map(|body| BodyView::from(body.as_ref()))
            .collect()
    }

    pub async fn scenery_views(&self) -> Vec<SceneryView> {
        let scenery = self.scenery.read().await;
        scenery.values().map(SceneryView::from).collect()
    }

    /// Routes a control command to the addressed player's body. Returns
    /// false when no such player exists.
    pub async fn command_player(&self, player_id: u64, command: PlayerCommand) -> bool {
        match self.player_body(player_id).await {
            Some(body) => body.apply_command(command),
            None => {
                debug!(player_id, ?command, "command for unknown player dropped");
                false
            }
        }
    }

    pub async fn pause_body(&self, id: u64) -> bool {
        match self.body(id).await {
            Some(body) => body.entity().pause(),
            None => false,
        }
    }

    pub async fn resume_body(&self, id: u64) -> bool {
        match self.body(id).await {
            Some(body) => body.entity().resume(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::StockAuthority;

    fn settings() -> SimSettings {
        SimSettings {
            // Effectively parks body tasks between manual pipeline calls.
            tick_interval: Duration::from_secs(3600),
            ..SimSettings::default()
        }
    }

    fn ship_spec() -> BodySpec {
        BodySpec::new(
            BodyFamily::Ship,
            "ship",
            PhysicsState::at_rest(100.0, 100.0, 16.0),
        )
    }

    #[tokio::test]
    async fn activate_validates_world_bounds() {
        let simulation = Simulation::new(
            SimSettings {
                bounds: WorldBounds {
                    width: 0.0,
                    height: 800.0,
                },
                ..settings()
            },
            Arc::new(StockAuthority),
        );

        assert_eq!(simulation.activate(), Err(ActivateError::InvalidBounds));
        assert!(!simulation.is_alive());
    }

    #[tokio::test]
    async fn activate_happens_once() {
        let simulation = Simulation::new(settings(), Arc::new(StockAuthority));
        assert!(simulation.activate().is_ok());
        assert_eq!(simulation.activate(), Err(ActivateError::NotStarting));
    }

    #[tokio::test]
    async fn spawn_refuses_while_the_simulation_is_starting() {
        let simulation = Simulation::new(settings(), Arc::new(StockAuthority));
        let result = simulation.spawn_body(ship_spec()).await;
        assert_eq!(result, Err(SpawnError::NotAlive));
        assert_eq!(simulation.body_count().await, 0);
    }

    #[tokio::test]
    async fn scenery_seeds_before_activation_and_respects_its_cap() {
        let simulation = Simulation::new(
            SimSettings {
                scenery_capacity: 2,
                ..settings()
            },
            Arc::new(StockAuthority),
        );

        let station = ScenerySpec::new("station", 60.0, 300.0, 200.0);
        assert!(
            simulation
                .add_scenery(SceneryKind::Static, station.clone())
                .await
                .is_ok()
        );
        assert!(
            simulation
                .add_scenery(SceneryKind::Decor, station.clone())
                .await
                .is_ok()
        );
        assert_eq!(
            simulation.add_scenery(SceneryKind::Gravity, station).await,
            Err(SpawnError::AtCapacity)
        );
        assert_eq!(simulation.scenery_views().await.len(), 2);
    }
}
