// Shared fixtures and authority doubles for the integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use astrofray::authority::{Action, BodyEvent, DecisionAuthority};
use astrofray::body::{DynamicBody, RunProfile};
use astrofray::counters::SimCounters;
use astrofray::entity::{BodyFamily, Entity};
use astrofray::physics::PhysicsState;
use astrofray::player::Pilot;
use astrofray::simulation::{SimSettings, Simulation};

/// Settings whose tick interval parks spawned body tasks, so tests drive the
/// pipeline manually with crafted states.
pub fn parked_settings() -> SimSettings {
    SimSettings {
        tick_interval: Duration::from_secs(3600),
        ..SimSettings::default()
    }
}

pub fn live_simulation(
    settings: SimSettings,
    authority: Arc<dyn DecisionAuthority>,
) -> (Arc<Simulation>, Arc<SimCounters>) {
    let counters = Arc::new(SimCounters::new());
    let simulation = Simulation::with_counters(settings, authority, counters.clone());
    simulation.activate().expect("simulation should activate");
    (simulation, counters)
}

/// A live body with no spawned task. Tests feed crafted states straight into
/// the pipeline, so nothing races the assertions.
pub fn manual_body(
    simulation: &Arc<Simulation>,
    counters: &Arc<SimCounters>,
    family: BodyFamily,
    asset: &str,
    start: PhysicsState,
    pilot: Option<Pilot>,
) -> Arc<DynamicBody> {
    let entity = Entity::new(
        family,
        asset.to_string(),
        start,
        Arc::downgrade(simulation),
        Arc::clone(counters),
    );
    let profile = RunProfile {
        tick_interval: Duration::from_secs(3600),
        accel_cutoff: None,
    };
    let body = Arc::new(DynamicBody::new(entity, profile, pilot));
    body.entity().activate().expect("entity should activate");
    body
}

pub fn drifting(x: f64, y: f64, vx: f64, vy: f64) -> PhysicsState {
    let mut state = PhysicsState::at_rest(x, y, 28.0);
    state.vx = vx;
    state.vy = vy;
    state
}

/// Authority double that records every event batch it is shown.
///
/// The preset reply goes to the aimed body (or to everyone when no aim is
/// set); other bodies get an empty decision, which keeps bodies the
/// simulation spawns as side effects frozen in place.
pub struct RecordingAuthority {
    reply: Vec<Action>,
    fail: bool,
    aim: Mutex<Option<u64>>,
    seen: Mutex<Vec<Vec<BodyEvent>>>,
}

impl RecordingAuthority {
    pub fn replying(reply: Vec<Action>) -> Self {
        Self {
            reply,
            fail: false,
            aim: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Vec::new(),
            fail: true,
            aim: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn aim_at(&self, body_id: u64) {
        *self.aim.lock().expect("aim mutex poisoned") = Some(body_id);
    }

    pub fn seen(&self) -> Vec<Vec<BodyEvent>> {
        self.seen.lock().expect("seen mutex poisoned").clone()
    }

    pub fn last_seen(&self) -> Vec<BodyEvent> {
        self.seen().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl DecisionAuthority for RecordingAuthority {
    async fn decide_actions(
        &self,
        body: &DynamicBody,
        events: &[BodyEvent],
    ) -> Result<Vec<Action>, String> {
        self.seen
            .lock()
            .expect("seen mutex poisoned")
            .push(events.to_vec());
        if self.fail {
            return Err("decide failed".to_string());
        }
        let aimed = self.aim.lock().expect("aim mutex poisoned");
        match *aimed {
            Some(target) if target != body.id() => Ok(Vec::new()),
            _ => Ok(self.reply.clone()),
        }
    }
}

/// Panics inside the pipeline. Containment tests expect the tick to roll
/// back and the body to keep living.
pub struct PanickingAuthority;

#[async_trait]
impl DecisionAuthority for PanickingAuthority {
    async fn decide_actions(
        &self,
        _body: &DynamicBody,
        _events: &[BodyEvent],
    ) -> Result<Vec<Action>, String> {
        panic!("authority exploded");
    }
}
