use std::sync::{PoisonError, RwLock, RwLockWriteGuard};
use std::time::Instant;

use super::state::PhysicsState;

/// Offset from zero that a rebounded body is snapped to on the crossed axis.
/// Kept strictly positive so the next boundary check does not re-trigger.
pub const REBOUND_EPSILON: f64 = 0.1;

/// One world boundary. West/east bound the x axis, north/south the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    West,
    East,
    North,
    South,
}

/// Playable area, spanning [0, width) x [0, height).
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Walls the given position lies beyond. The axis checks are independent,
    /// so overshooting a corner reports both crossed walls.
    pub fn crossed_walls(&self, x: f64, y: f64) -> Vec<Wall> {
        let mut walls = Vec::new();
        if x < 0.0 {
            walls.push(Wall::West);
        } else if x >= self.width {
            walls.push(Wall::East);
        }
        if y < 0.0 {
            walls.push(Wall::North);
        } else if y >= self.height {
            walls.push(Wall::South);
        }
        walls
    }
}

/// Single-slot holder of a body's [`PhysicsState`].
///
/// The slot only ever holds complete snapshots: every operation reads the
/// current value, builds a changed copy and replaces the whole slot. Readers
/// copy the value out, so no caller observes a half-updated state.
#[derive(Debug)]
pub struct PhysicsEngine {
    slot: RwLock<PhysicsState>,
}

impl PhysicsEngine {
    pub fn new(initial: PhysicsState) -> Self {
        Self {
            slot: RwLock::new(initial),
        }
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> PhysicsState {
        // The slot always holds a complete Copy value, so a poisoned lock
        // still carries a valid snapshot.
        *self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, PhysicsState> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the held snapshot wholesale.
    pub fn install(&self, next: PhysicsState) {
        *self.write_slot() = next;
    }

    /// Integrates the current snapshot over the real time elapsed since its
    /// timestamp and returns `(next, previous)` WITHOUT installing the
    /// result. The caller decides whether the new state takes effect; the
    /// simulation pipeline installs it through a Move action.
    pub fn calc_new_values(&self) -> (PhysicsState, PhysicsState) {
        let previous = self.snapshot();
        let next = previous.advanced(previous.timestamp.elapsed());
        (next, previous)
    }

    pub fn set_thrust(&self, thrust: f64) {
        let mut slot = self.write_slot();
        *slot = PhysicsState { thrust, ..*slot };
    }

    pub fn set_angular_accel(&self, angular_accel: f64) {
        let mut slot = self.write_slot();
        *slot = PhysicsState {
            angular_accel,
            ..*slot
        };
    }

    pub fn add_angular_accel(&self, delta: f64) {
        let mut slot = self.write_slot();
        *slot = PhysicsState {
            angular_accel: slot.angular_accel + delta,
            ..*slot
        };
    }

    pub fn reset_acceleration(&self) {
        let mut slot = self.write_slot();
        *slot = PhysicsState {
            ax: 0.0,
            ay: 0.0,
            ..*slot
        };
    }

    /// Moves the snapshot's timestamp to now without touching motion state.
    /// A body coming out of a pause restarts its integration clock here.
    pub fn restamp(&self) {
        let mut slot = self.write_slot();
        *slot = PhysicsState {
            timestamp: Instant::now(),
            ..*slot
        };
    }

    /// Bounces the current snapshot off `wall` and installs the result.
    ///
    /// The velocity component perpendicular to the wall is negated, the
    /// parallel component and both acceleration components carry over, and
    /// the crossed coordinate snaps to [`REBOUND_EPSILON`]. The angular
    /// velocity of the state from before the crossing lands in both the
    /// angular-velocity and angular-acceleration fields of the result; the
    /// original simulation did exactly that, and downstream behavior depends
    /// on it.
    pub fn rebound(&self, wall: Wall, previous: &PhysicsState) -> PhysicsState {
        let mut slot = self.write_slot();
        let current = *slot;
        let bounced = match wall {
            Wall::West | Wall::East => PhysicsState {
                x: REBOUND_EPSILON,
                vx: -current.vx,
                angular_velocity: previous.angular_velocity,
                angular_accel: previous.angular_velocity,
                ..current
            },
            Wall::North | Wall::South => PhysicsState {
                y: REBOUND_EPSILON,
                vy: -current.vy,
                angular_velocity: previous.angular_velocity,
                angular_accel: previous.angular_velocity,
                ..current
            },
        };
        *slot = bounced;
        bounced
    }
}
