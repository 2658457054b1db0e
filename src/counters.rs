use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::entity::BodyFamily;

// Created/alive/dead tallies for one body family. Instrumentation only;
// capacity decisions live in the simulation's own collections.
#[derive(Debug, Default)]
pub struct FamilyCounters {
    created: AtomicU64,
    alive: AtomicU64,
    dead: AtomicU64,
}

impl FamilyCounters {
    fn report(&self) -> FamilyReport {
        FamilyReport {
            created: self.created.load(Ordering::Relaxed),
            alive: self.alive.load(Ordering::Relaxed),
            dead: self.dead.load(Ordering::Relaxed),
        }
    }
}

/// Shared lifecycle counters, injected into every entity at creation so no
/// per-type static state exists. Every lifecycle transition updates exactly
/// one of these atomically.
#[derive(Debug, Default)]
pub struct SimCounters {
    ships: FamilyCounters,
    asteroids: FamilyCounters,
    projectiles: FamilyCounters,
}

impl SimCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn family(&self, family: BodyFamily) -> &FamilyCounters {
        match family {
            BodyFamily::Ship => &self.ships,
            BodyFamily::Asteroid => &self.asteroids,
            BodyFamily::Projectile => &self.projectiles,
        }
    }

    pub fn record_created(&self, family: BodyFamily) {
        self.family(family).created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_activated(&self, family: BodyFamily) {
        self.family(family).alive.fetch_add(1, Ordering::Relaxed);
    }

    // A death always follows an activation, so `alive` cannot underflow.
    pub fn record_death(&self, family: BodyFamily) {
        let counters = self.family(family);
        counters.alive.fetch_sub(1, Ordering::Relaxed);
        counters.dead.fetch_add(1, Ordering::Relaxed);
    }

    pub fn alive(&self, family: BodyFamily) -> u64 {
        self.family(family).alive.load(Ordering::Relaxed)
    }

    pub fn alive_total(&self) -> u64 {
        self.ships.alive.load(Ordering::Relaxed)
            + self.asteroids.alive.load(Ordering::Relaxed)
            + self.projectiles.alive.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all tallies for logs and tooling.
    pub fn report(&self) -> CountersReport {
        CountersReport {
            ships: self.ships.report(),
            asteroids: self.asteroids.report(),
            projectiles: self.projectiles.report(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyReport {
    pub created: u64,
    pub alive: u64,
    pub dead: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountersReport {
    pub ships: FamilyReport,
    pub asteroids: FamilyReport,
    pub projectiles: FamilyReport,
}
