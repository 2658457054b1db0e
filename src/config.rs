use std::{env, time::Duration};

// Runtime/simulation constants (not gameplay tuning).

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(30);
pub const DEFAULT_BODY_CAPACITY: usize = 64;
pub const DEFAULT_SCENERY_CAPACITY: usize = 128;
pub const DEFAULT_WORLD_WIDTH: f64 = 1000.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 800.0;

pub fn tick_interval() -> Duration {
    let millis = env::var("SIM_TICK_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICK_INTERVAL.as_millis() as u64);
    Duration::from_millis(millis)
}

pub fn body_capacity() -> usize {
    env::var("SIM_BODY_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_BODY_CAPACITY)
}

pub fn scenery_capacity() -> usize {
    env::var("SIM_SCENERY_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SCENERY_CAPACITY)
}

pub fn world_width() -> f64 {
    env::var("SIM_WORLD_WIDTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_WORLD_WIDTH)
}

pub fn world_height() -> f64 {
    env::var("SIM_WORLD_HEIGHT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_WORLD_HEIGHT)
}
