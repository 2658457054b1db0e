/// Gameplay tuning for asteroid fragmentation.

#[derive(Debug, Clone, Copy)]
pub struct FragmentTuning {
    /// Fragments spawned per explosion, fanned out evenly over 360 degrees.
    pub count: u32,

    /// Speed added on top of the parent's speed, world units per second.
    pub speed_boost: f64,

    /// Parents smaller than this shatter into nothing.
    pub min_parent_size: f64,
}

impl Default for FragmentTuning {
    fn default() -> Self {
        Self {
            count: 3,
            speed_boost: 40.0,
            min_parent_size: 12.0,
        }
    }
}
