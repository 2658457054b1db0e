use std::sync::atomic::{AtomicI32, Ordering};

use tracing::debug;

use crate::physics::PhysicsEngine;
use crate::tuning::player::PlayerTuning;
use crate::weapons::{Weapon, WeaponConfig};

/// Control inputs a player can send to their body. Each command mutates only
/// the addressed body, through the engine's functional updates or a weapon's
/// fire signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    ThrustOn,
    ThrustOff,
    ThrustReverse,
    RotateLeft,
    RotateRight,
    RotateOff,
    Fire,
    NextWeapon,
}

/// Player-facing half of a controlled body: identity, loadout and the
/// active-weapon selection.
///
/// The active index is atomic because selection and fire commands arrive from
/// the input layer's thread while the body's own task polls the active
/// weapon each tick. -1 means no weapon selected.
#[derive(Debug)]
pub struct Pilot {
    player_id: u64,
    tuning: PlayerTuning,
    weapons: Vec<Weapon>,
    active: AtomicI32,
}

impl Pilot {
    pub fn new(player_id: u64, tuning: PlayerTuning, loadout: Vec<WeaponConfig>) -> Self {
        let weapons = loadout.into_iter().map(Weapon::new).collect();
        Self {
            player_id,
            tuning,
            weapons,
            active: AtomicI32::new(-1),
        }
    }

    pub fn player_id(&self) -> u64 {
        self.player_id
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn active_index(&self) -> i32 {
        self.active.load(Ordering::Acquire)
    }

    pub fn active_weapon(&self) -> Option<&Weapon> {
        let index = self.active_index();
        if index < 0 {
            None
        } else {
            self.weapons.get(index as usize)
        }
    }

    /// Clone of the active weapon's config, read at the moment of use.
    pub fn active_weapon_config(&self) -> Option<WeaponConfig> {
        self.active_weapon().map(|weapon| weapon.config().clone())
    }

    /// Cycles the selection: none steps to the first weapon, afterwards the
    /// index wraps around the loadout. An empty loadout stays at none.
    pub fn next_weapon(&self) -> i32 {
        if self.weapons.is_empty() {
            return -1;
        }
        let current = self.active_index();
        let next = if current < 0 {
            0
        } else {
            (current + 1) % self.weapons.len() as i32
        };
        self.active.store(next, Ordering::Release);
        next
    }

    /// Applies one control command against the body's engine and loadout.
    pub fn apply(&self, command: PlayerCommand, engine: &PhysicsEngine) {
        match command {
            PlayerCommand::ThrustOn => engine.set_thrust(self.tuning.thrust),
            PlayerCommand::ThrustOff => engine.set_thrust(0.0),
            PlayerCommand::ThrustReverse => engine.set_thrust(-self.tuning.reverse_thrust),
            PlayerCommand::RotateLeft => engine.set_angular_accel(-self.tuning.turn_accel),
            PlayerCommand::RotateRight => engine.set_angular_accel(self.tuning.turn_accel),
            PlayerCommand::RotateOff => engine.set_angular_accel(0.0),
            PlayerCommand::Fire => match self.active_weapon() {
                Some(weapon) => weapon.register_fire_request(),
                None => debug!(player_id = self.player_id, "fire ignored; no weapon selected"),
            },
            PlayerCommand::NextWeapon => {
                let index = self.next_weapon();
                debug!(player_id = self.player_id, index, "weapon selected");
            }
        }
    }
}
