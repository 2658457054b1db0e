use std::sync::Arc;
use std::time::Duration;

use astrofray::authority::StockAuthority;
use astrofray::entity::BodyFamily;
use astrofray::physics::PhysicsState;
use astrofray::player::PlayerCommand;
use astrofray::simulation::{BodySpec, SceneryKind, ScenerySpec, SimSettings, Simulation};
use astrofray::tuning::weapons::standard_loadout;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

#[tokio::main]
async fn main() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = SimSettings::from_env();
    let simulation = Simulation::new(settings, Arc::new(StockAuthority));
    if let Err(error) = simulation.activate() {
        tracing::error!(?error, "failed to activate simulation");
        return;
    }

    seed_world(&simulation).await;

    let player_id = 1;
    let spawn = BodySpec::new(
        BodyFamily::Ship,
        "ship_red",
        PhysicsState::at_rest(
            settings.bounds.width / 2.0,
            settings.bounds.height / 2.0,
            24.0,
        ),
    );
    let body_id = match simulation
        .spawn_player(player_id, spawn, standard_loadout())
        .await
    {
        Ok(id) => id,
        Err(error) => {
            tracing::error!(?error, "failed to spawn player");
            return;
        }
    };
    tracing::info!(player_id, body_id, "demo pilot ready");

    fly_a_little(&simulation, player_id).await;

    match serde_json::to_string_pretty(&simulation.body_views().await) {
        Ok(views) => println!("{views}"),
        Err(error) => tracing::error!(%error, "failed to serialize body views"),
    }
    match serde_json::to_string_pretty(&simulation.counters().report()) {
        Ok(report) => println!("{report}"),
        Err(error) => tracing::error!(%error, "failed to serialize counters"),
    }

    simulation.shutdown().await;
}

async fn seed_world(simulation: &Arc<Simulation>) {
    let station = ScenerySpec::new("station", 60.0, 250.0, 200.0);
    if let Err(error) = simulation.add_scenery(SceneryKind::Static, station).await {
        tracing::warn!(?error, "station not placed");
    }

    let drifts = [
        (150.0, 520.0, 35.0, -20.0),
        (700.0, 120.0, -35.0, 20.0),
        (820.0, 600.0, 12.0, 12.0),
    ];
    for (x, y, vx, vy) in drifts {
        let mut start = PhysicsState::at_rest(x, y, 28.0);
        start.vx = vx;
        start.vy = vy;
        let spec = BodySpec::new(BodyFamily::Asteroid, "asteroid_big", start);
        if let Err(error) = simulation.spawn_body(spec).await {
            tracing::warn!(?error, "asteroid not spawned");
        }
    }
}

// A short scripted flight: thrust, turn, pick a weapon, fire a couple of
// times, then coast.
async fn fly_a_little(simulation: &Arc<Simulation>, player_id: u64) {
    let script = [
        (PlayerCommand::ThrustOn, 400),
        (PlayerCommand::RotateRight, 300),
        (PlayerCommand::RotateOff, 200),
        (PlayerCommand::NextWeapon, 50),
        (PlayerCommand::Fire, 400),
        (PlayerCommand::Fire, 400),
        (PlayerCommand::ThrustOff, 300),
    ];
    for (command, pause_ms) in script {
        simulation.command_player(player_id, command).await;
        tokio::time::sleep(Duration::from_millis(pause_ms)).await;
    }
}
