use async_trait::async_trait;

use crate::body::DynamicBody;
use crate::entity::BodyFamily;
use crate::physics::Wall;

/// Something the detect step noticed about a body's freshly computed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEvent {
    /// The new position lies beyond this wall.
    Crossed(Wall),
    /// The active weapon decided to fire this tick.
    FireIntent,
}

/// What an action does once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Explicit no-op; filtered out before the apply step.
    None,
    /// Install the freshly integrated state.
    Move,
    /// Bounce the body off a wall.
    Rebound(Wall),
    /// Kill the body.
    Die,
    /// Spawn a projectile from the body's active weapon.
    Fire,
    /// Shatter the body into smaller asteroid fragments.
    ExplodeInFragments,
}

/// Who applies an action: the body itself, or the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    Body,
    Model,
}

/// One decided action. Lower priorities apply first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub executor: Executor,
    pub priority: i32,
}

impl Action {
    pub fn body(kind: ActionKind, priority: i32) -> Self {
        Self {
            kind,
            executor: Executor::Body,
            priority,
        }
    }

    pub fn model(kind: ActionKind, priority: i32) -> Self {
        Self {
            kind,
            executor: Executor::Model,
            priority,
        }
    }
}

pub const PRIORITY_MOVE: i32 = 10;
pub const PRIORITY_REBOUND: i32 = 20;
pub const PRIORITY_FIRE: i32 = 30;
pub const PRIORITY_EXPLODE: i32 = 40;
pub const PRIORITY_DIE: i32 = 90;

/// Strategy port: maps a body's detected events to prioritized actions.
///
/// The simulation only ever executes what comes back; it never decides
/// strategy itself. Implementations run inside the reporting body's tick, so
/// a stalled call stalls that one body and nothing else.
#[async_trait]
pub trait DecisionAuthority: Send + Sync {
    async fn decide_actions(
        &self,
        body: &DynamicBody,
        events: &[BodyEvent],
    ) -> Result<Vec<Action>, String>;
}

/// Default strategy: every body keeps moving, ships and asteroids bounce off
/// walls, projectiles die at them, and fire intents become Fire actions.
pub struct StockAuthority;

#[async_trait]
impl DecisionAuthority for StockAuthority {
    async fn decide_actions(
        &self,
        body: &DynamicBody,
        events: &[BodyEvent],
    ) -> Result<Vec<Action>, String> {
        let mut actions = vec![Action::body(ActionKind::Move, PRIORITY_MOVE)];
        for event in events {
            match event {
                BodyEvent::Crossed(wall) => {
                    if body.family() == BodyFamily::Projectile {
                        actions.push(Action::body(ActionKind::Die, PRIORITY_DIE));
                    } else {
                        actions.push(Action::body(ActionKind::Rebound(*wall), PRIORITY_REBOUND));
                    }
                }
                BodyEvent::FireIntent => {
                    actions.push(Action::model(ActionKind::Fire, PRIORITY_FIRE));
                }
            }
        }
        Ok(actions)
    }
}
