// Loadout presets for the four weapon variants.

use std::time::Duration;

use crate::weapons::{WeaponConfig, WeaponKind};

/// The full four-slot loadout in selection order.
pub fn standard_loadout() -> Vec<WeaponConfig> {
    vec![basic_cannon(), burst_blaster(), missile_rack(), mine_layer()]
}

/// Single shots, small magazine, timed reload.
pub fn basic_cannon() -> WeaponConfig {
    WeaponConfig {
        kind: WeaponKind::Basic,
        projectile_asset: "shell".to_string(),
        projectile_size: 4.0,
        firing_speed: 320.0,
        acceleration: 0.0,
        acceleration_duration: Duration::ZERO,
        burst_size: 1,
        fire_rate: 2.0,
        max_ammo: 8,
        reload_time: Duration::from_secs(2),
        shooting_offset: 26.0,
    }
}

/// Three-round volleys per trigger pull.
pub fn burst_blaster() -> WeaponConfig {
    WeaponConfig {
        kind: WeaponKind::Burst,
        projectile_asset: "bolt".to_string(),
        projectile_size: 3.0,
        firing_speed: 280.0,
        acceleration: 0.0,
        acceleration_duration: Duration::ZERO,
        burst_size: 3,
        fire_rate: 10.0,
        max_ammo: 0,
        reload_time: Duration::ZERO,
        shooting_offset: 26.0,
    }
}

/// Slow, self-accelerating rounds that burn out after a short boost phase.
pub fn missile_rack() -> WeaponConfig {
    WeaponConfig {
        kind: WeaponKind::Missile,
        projectile_asset: "missile".to_string(),
        projectile_size: 6.0,
        firing_speed: 90.0,
        acceleration: 260.0,
        acceleration_duration: Duration::from_millis(900),
        burst_size: 1,
        fire_rate: 0.8,
        max_ammo: 0,
        reload_time: Duration::ZERO,
        shooting_offset: 28.0,
    }
}

/// Drops slow mines behind the ship; negative offset spawns them aft.
pub fn mine_layer() -> WeaponConfig {
    WeaponConfig {
        kind: WeaponKind::MineLauncher,
        projectile_asset: "mine".to_string(),
        projectile_size: 8.0,
        firing_speed: -20.0,
        acceleration: 0.0,
        acceleration_duration: Duration::ZERO,
        burst_size: 1,
        fire_rate: 0.5,
        max_ammo: 0,
        reload_time: Duration::ZERO,
        shooting_offset: -30.0,
    }
}
