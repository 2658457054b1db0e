use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::ids;

/// The four fire-decision state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    /// Ammo-limited single shots with a timed reload.
    Basic,
    /// One request triggers a fixed-size volley at the fire-rate cadence.
    Burst,
    /// Cooldown-gated single shots.
    Missile,
    /// Cooldown-gated drops; presets aim the spawn offset backwards.
    MineLauncher,
}

/// Immutable description of one weapon. Cloned out whenever a projectile is
/// spawned from it; the mutable firing state lives in [`Weapon`].
#[derive(Debug, Clone)]
pub struct WeaponConfig {
    pub kind: WeaponKind,

    /// Visual identifier for spawned projectiles.
    pub projectile_asset: String,

    /// Projectile size in world units.
    pub projectile_size: f64,

    /// Muzzle speed added to the shooter's velocity, units per second.
    pub firing_speed: f64,

    /// Projectile self-acceleration along its heading, units per second
    /// squared. Zero for unpowered shells.
    pub acceleration: f64,

    /// How long the self-acceleration lasts before it is cut off.
    pub acceleration_duration: Duration,

    /// Shots per volley. Read by Burst only.
    pub burst_size: u32,

    /// Shots per second; 1/fire_rate is the cooldown after each shot.
    pub fire_rate: f64,

    /// Magazine size. Read by Basic only.
    pub max_ammo: u32,

    /// Time to refill the magazine once it runs dry. Read by Basic only.
    pub reload_time: Duration,

    /// Distance from the shooter's center to the spawn point, along the
    /// shooter's heading. Negative values spawn behind the shooter.
    pub shooting_offset: f64,
}

/// Edge-triggered fire intent, writable from any thread.
///
/// Raising overwrites the previous stamp; requests are never queued. A
/// pending request exists iff the stamp is newer than the last one the
/// owning body observed.
#[derive(Debug, Default)]
pub struct FireSignal {
    latest: AtomicU64,
}

impl FireSignal {
    pub fn raise(&self) {
        // fetch_max keeps the stamp monotonic even if two raisers race.
        self.latest.fetch_max(ids::fresh_id(), Ordering::AcqRel);
    }

    fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct FiringState {
    ammo: u32,
    cooldown: f64,
    burst_remaining: u32,
    reloading: bool,
    last_handled: u64,
}

/// One weapon in a body's loadout.
///
/// [`Weapon::register_fire_request`] may be called from any thread; every
/// other field is read and written only by [`Weapon::must_fire_now`], which
/// the owning body's task calls exactly once per tick.
#[derive(Debug)]
pub struct Weapon {
    config: WeaponConfig,
    signal: FireSignal,
    state: Mutex<FiringState>,
}

impl Weapon {
    pub fn new(config: WeaponConfig) -> Self {
        let state = FiringState {
            ammo: config.max_ammo,
            cooldown: 0.0,
            burst_remaining: 0,
            reloading: false,
            last_handled: 0,
        };
        Self {
            config,
            signal: FireSignal::default(),
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    pub fn kind(&self) -> WeaponKind {
        self.config.kind
    }

    /// Signals fire intent. Callable from any thread; never queues.
    pub fn register_fire_request(&self) {
        self.signal.raise();
    }

    /// One fire decision for the elapsed tick. The cooldown ticks down on
    /// every call, so reloads and burst cadences advance with time rather
    /// than with requests.
    pub fn must_fire_now(&self, dt_seconds: f64) -> bool {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if state.cooldown > 0.0 {
            state.cooldown = (state.cooldown - dt_seconds).max(0.0);
        }

        match self.config.kind {
            WeaponKind::Basic => self.step_basic(&mut state),
            WeaponKind::Burst => self.step_burst(&mut state),
            WeaponKind::Missile | WeaponKind::MineLauncher => self.step_cooldown_only(&mut state),
        }
    }

    /// Consumes a pending request if there is one. Superseded requests are
    /// dropped silently: only the newest stamp matters.
    fn take_request(&self, state: &mut FiringState) -> bool {
        let latest = self.signal.latest();
        if latest > state.last_handled {
            state.last_handled = latest;
            true
        } else {
            false
        }
    }

    fn step_basic(&self, state: &mut FiringState) -> bool {
        // A reload completes on time, not on request.
        if state.reloading && state.cooldown <= 0.0 {
            state.ammo = self.config.max_ammo;
            state.reloading = false;
        }

        if !self.take_request(state) {
            return false;
        }
        // Dry magazine starts the reload; the request itself is spent.
        if state.ammo == 0 {
            if !state.reloading {
                state.reloading = true;
                state.cooldown = self.config.reload_time.as_secs_f64();
            }
            return false;
        }
        if state.cooldown > 0.0 {
            return false;
        }

        state.ammo -= 1;
        state.cooldown = 1.0 / self.config.fire_rate;
        true
    }

    fn step_burst(&self, state: &mut FiringState) -> bool {
        if state.burst_remaining > 0 {
            // Mid-volley: requests are discarded and the cadence runs on the
            // cooldown alone.
            let _ = self.take_request(state);
            if state.cooldown > 0.0 {
                return false;
            }
            state.burst_remaining -= 1;
            state.cooldown = 1.0 / self.config.fire_rate;
            return true;
        }

        if !self.take_request(state) {
            return false;
        }
        if state.cooldown > 0.0 {
            return false;
        }

        state.burst_remaining = self.config.burst_size.saturating_sub(1);
        state.cooldown = 1.0 / self.config.fire_rate;
        true
    }

    fn step_cooldown_only(&self, state: &mut FiringState) -> bool {
        if !self.take_request(state) {
            return false;
        }
        if state.cooldown > 0.0 {
            return false;
        }

        state.cooldown = 1.0 / self.config.fire_rate;
        true
    }
}
