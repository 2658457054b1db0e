/// Gameplay tuning for player-controlled ships.
///
/// Keep this separate from runtime/simulation configuration (tick rates,
/// capacities, world size).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Forward thrust in world units per second squared.
    pub thrust: f64,

    /// Reverse thrust magnitude in world units per second squared.
    pub reverse_thrust: f64,

    /// Angular acceleration the turn controls apply, degrees per second
    /// squared.
    pub turn_accel: f64,

    /// Ship size in world units.
    pub size: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            thrust: 120.0,
            reverse_thrust: 60.0,
            turn_accel: 180.0,
            size: 24.0,
        }
    }
}
