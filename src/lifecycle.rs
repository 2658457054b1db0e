use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a single body.
///
/// `HandsOff` marks a body whose tick is currently owned by the simulation
/// pipeline; it is a transient state and is never left standing after the
/// pipeline exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifeState {
    Starting = 0,
    Alive = 1,
    Paused = 2,
    HandsOff = 3,
    Dead = 4,
}

impl LifeState {
    fn from_raw(raw: u8) -> LifeState {
        match raw {
            0 => LifeState::Starting,
            1 => LifeState::Alive,
            2 => LifeState::Paused,
            3 => LifeState::HandsOff,
            _ => LifeState::Dead,
        }
    }
}

/// Atomic slot holding a [`LifeState`]. All transitions are compare-and-set,
/// so two racing actors can never both claim the same transition.
#[derive(Debug)]
pub struct LifeCell(AtomicU8);

impl LifeCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(LifeState::Starting as u8))
    }

    pub fn load(&self) -> LifeState {
        LifeState::from_raw(self.0.load(Ordering::Acquire))
    }

    pub fn is(&self, state: LifeState) -> bool {
        self.load() == state
    }

    /// Attempts `from` -> `to`; returns whether this call won the transition.
    pub fn transition(&self, from: LifeState, to: LifeState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for LifeCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped ownership of a body's tick by the pipeline.
///
/// Acquiring flips Alive -> HandsOff; dropping flips it back unless the body
/// moved on in between (a Die action leaves it Dead, and Dead stays). The
/// restore runs on every exit path, panics included, so a body cannot get
/// stuck in HandsOff.
pub struct HandsOffGuard<'a> {
    cell: &'a LifeCell,
    restore: LifeState,
}

impl<'a> HandsOffGuard<'a> {
    pub fn acquire(cell: &'a LifeCell) -> Option<Self> {
        if cell.transition(LifeState::Alive, LifeState::HandsOff) {
            Some(Self {
                cell,
                restore: LifeState::Alive,
            })
        } else {
            None
        }
    }
}

impl Drop for HandsOffGuard<'_> {
    fn drop(&mut self) {
        self.cell.transition(LifeState::HandsOff, self.restore);
    }
}

/// Lifecycle of the simulation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SimState {
    Starting = 0,
    Alive = 1,
    Stopped = 2,
}

impl SimState {
    fn from_raw(raw: u8) -> SimState {
        match raw {
            0 => SimState::Starting,
            1 => SimState::Alive,
            _ => SimState::Stopped,
        }
    }
}

#[derive(Debug)]
pub struct SimStateCell(AtomicU8);

impl SimStateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SimState::Starting as u8))
    }

    pub fn load(&self) -> SimState {
        SimState::from_raw(self.0.load(Ordering::Acquire))
    }

    pub fn is(&self, state: SimState) -> bool {
        self.load() == state
    }

    pub fn transition(&self, from: SimState, to: SimState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SimStateCell {
    fn default() -> Self {
        Self::new()
    }
}
