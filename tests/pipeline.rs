mod support;

use std::sync::Arc;
use std::time::Duration;

use astrofray::authority::{Action, ActionKind, BodyEvent, PRIORITY_FIRE, PRIORITY_MOVE};
use astrofray::entity::BodyFamily;
use astrofray::lifecycle::LifeState;
use astrofray::physics::{PhysicsState, Wall};
use astrofray::player::{Pilot, PlayerCommand};
use astrofray::simulation::SimSettings;
use astrofray::tuning::player::PlayerTuning;
use astrofray::tuning::weapons::{basic_cannon, missile_rack, standard_loadout};

use support::{PanickingAuthority, RecordingAuthority};

#[tokio::test]
async fn move_installs_the_crafted_state() {
    let authority = Arc::new(RecordingAuthority::replying(vec![Action::body(
        ActionKind::Move,
        PRIORITY_MOVE,
    )]));
    let (simulation, counters) =
        support::live_simulation(support::parked_settings(), authority.clone());
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Ship,
        "ship",
        PhysicsState::at_rest(100.0, 100.0, 16.0),
        None,
    );

    let previous = body.engine().snapshot();
    let next = support::drifting(123.45, 200.0, 10.0, 0.0);
    simulation.process_events(&body, next, previous).await;

    assert_eq!(body.engine().snapshot(), next);
    assert!(body.life().is(LifeState::Alive), "hands-off must be released");
    assert_eq!(authority.seen().len(), 1);
}

#[tokio::test]
async fn corner_crossing_reports_both_walls() {
    let authority = Arc::new(RecordingAuthority::replying(Vec::new()));
    let (simulation, counters) =
        support::live_simulation(support::parked_settings(), authority.clone());
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Asteroid,
        "asteroid",
        PhysicsState::at_rest(100.0, 100.0, 28.0),
        None,
    );

    let previous = body.engine().snapshot();
    let next = support::drifting(-2.0, 900.0, -30.0, 45.0);
    simulation.process_events(&body, next, previous).await;

    assert_eq!(
        authority.last_seen(),
        vec![BodyEvent::Crossed(Wall::West), BodyEvent::Crossed(Wall::South)]
    );
}

#[tokio::test]
async fn fire_intent_flows_from_the_weapon_to_the_authority() {
    let authority = Arc::new(RecordingAuthority::replying(Vec::new()));
    let (simulation, counters) =
        support::live_simulation(support::parked_settings(), authority.clone());
    let pilot = Pilot::new(7, PlayerTuning::default(), standard_loadout());
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Ship,
        "ship",
        PhysicsState::at_rest(500.0, 400.0, 24.0),
        Some(pilot),
    );
    assert!(body.apply_command(PlayerCommand::NextWeapon));
    assert!(body.apply_command(PlayerCommand::Fire));

    let previous = body.engine().snapshot();
    let next = previous.advanced(Duration::from_millis(100));
    simulation.process_events(&body, next, previous).await;
    assert_eq!(authority.last_seen(), vec![BodyEvent::FireIntent]);

    // The request was consumed; the next tick carries no intent.
    let previous = body.engine().snapshot();
    let next = previous.advanced(Duration::from_millis(100));
    simulation.process_events(&body, next, previous).await;
    assert!(authority.last_seen().is_empty());
}

#[tokio::test]
async fn authority_failure_rolls_the_tick_back() {
    let authority = Arc::new(RecordingAuthority::failing());
    let (simulation, counters) = support::live_simulation(support::parked_settings(), authority);
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Ship,
        "ship",
        PhysicsState::at_rest(100.0, 100.0, 16.0),
        None,
    );

    let previous = body.engine().snapshot();
    let next = support::drifting(999.0, 100.0, 0.0, 0.0);
    simulation.process_events(&body, next, previous).await;

    assert_eq!(body.engine().snapshot(), previous);
    assert!(body.life().is(LifeState::Alive));
}

#[tokio::test]
async fn authority_panic_is_contained_to_one_tick() {
    let authority = Arc::new(PanickingAuthority);
    let (simulation, counters) = support::live_simulation(support::parked_settings(), authority);
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Ship,
        "ship",
        PhysicsState::at_rest(100.0, 100.0, 16.0),
        None,
    );

    let previous = body.engine().snapshot();
    let next = support::drifting(250.0, 250.0, 1.0, 1.0);
    simulation.process_events(&body, next, previous).await;

    // Rolled back, released, and the simulation keeps running.
    assert_eq!(body.engine().snapshot(), previous);
    assert!(body.life().is(LifeState::Alive));
    assert!(simulation.is_alive());

    // Later ticks run as if nothing happened.
    simulation.process_events(&body, next, previous).await;
    assert!(body.life().is(LifeState::Alive));
}

#[tokio::test]
async fn actions_after_a_die_are_dropped() {
    // Deliberately order Die first; the Move behind it must never land.
    let authority = Arc::new(RecordingAuthority::replying(vec![
        Action::body(ActionKind::Die, 10),
        Action::body(ActionKind::Move, 90),
    ]));
    let (simulation, counters) = support::live_simulation(support::parked_settings(), authority);
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Asteroid,
        "asteroid",
        PhysicsState::at_rest(100.0, 100.0, 28.0),
        None,
    );

    let previous = body.engine().snapshot();
    let next = support::drifting(777.0, 300.0, 0.0, 0.0);
    simulation.process_events(&body, next, previous).await;

    assert!(body.life().is(LifeState::Dead));
    assert_eq!(
        body.engine().snapshot(),
        previous,
        "a move after a die must not install"
    );
}

#[tokio::test]
async fn none_actions_are_filtered_out() {
    let authority = Arc::new(RecordingAuthority::replying(vec![Action::body(
        ActionKind::None,
        0,
    )]));
    let (simulation, counters) = support::live_simulation(support::parked_settings(), authority);
    let body = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Ship,
        "ship",
        PhysicsState::at_rest(100.0, 100.0, 16.0),
        None,
    );

    let previous = body.engine().snapshot();
    let next = support::drifting(640.0, 80.0, 0.0, 0.0);
    simulation.process_events(&body, next, previous).await;

    assert_eq!(body.engine().snapshot(), previous);
    assert!(body.life().is(LifeState::Alive));
}

#[tokio::test]
async fn fire_action_spawns_a_projectile_with_muzzle_kinematics() {
    let authority = Arc::new(RecordingAuthority::replying(vec![Action::model(
        ActionKind::Fire,
        PRIORITY_FIRE,
    )]));
    let (simulation, counters) =
        support::live_simulation(support::parked_settings(), authority.clone());

    let mut aimed = support::drifting(500.0, 400.0, 5.0, 0.0);
    aimed.angle = 90.0; // heading (1, 0)
    aimed.size = 24.0;
    let pilot = Pilot::new(7, PlayerTuning::default(), standard_loadout());
    let shooter =
        support::manual_body(&simulation, &counters, BodyFamily::Ship, "ship", aimed, Some(pilot));
    authority.aim_at(shooter.id());
    // Selects the first weapon, the basic cannon.
    assert!(shooter.apply_command(PlayerCommand::NextWeapon));

    let previous = shooter.engine().snapshot();
    simulation.process_events(&shooter, previous, previous).await;

    assert_eq!(simulation.body_count().await, 1);
    let views = simulation.body_views().await;
    let shell = views
        .iter()
        .find(|view| view.asset == "shell")
        .expect("projectile should exist");

    let cannon = basic_cannon();
    assert!((shell.x - (500.0 + cannon.shooting_offset)).abs() < 1e-9);
    assert!((shell.y - 400.0).abs() < 1e-9);
    assert!((shell.vx - (5.0 + cannon.firing_speed)).abs() < 1e-9);
    assert!(shell.vy.abs() < 1e-9);
    assert_eq!(shell.size, cannon.projectile_size);
    assert_eq!(counters.alive(BodyFamily::Projectile), 1);
}

#[tokio::test]
async fn fired_missiles_carry_boost_acceleration_and_its_cutoff() {
    let authority = Arc::new(RecordingAuthority::replying(vec![Action::model(
        ActionKind::Fire,
        PRIORITY_FIRE,
    )]));
    let (simulation, counters) =
        support::live_simulation(support::parked_settings(), authority.clone());

    let mut aimed = PhysicsState::at_rest(500.0, 400.0, 24.0);
    aimed.angle = 90.0; // heading (1, 0)
    let pilot = Pilot::new(7, PlayerTuning::default(), standard_loadout());
    let shooter =
        support::manual_body(&simulation, &counters, BodyFamily::Ship, "ship", aimed, Some(pilot));
    authority.aim_at(shooter.id());
    // Cycle basic -> burst -> missile.
    for _ in 0..3 {
        assert!(shooter.apply_command(PlayerCommand::NextWeapon));
    }

    let previous = shooter.engine().snapshot();
    simulation.process_events(&shooter, previous, previous).await;

    let views = simulation.body_views().await;
    let missile = views
        .iter()
        .find(|view| view.asset == "missile")
        .expect("missile should exist");

    let rack = missile_rack();
    assert!((missile.x - (500.0 + rack.shooting_offset)).abs() < 1e-9);
    assert!((missile.vx - rack.firing_speed).abs() < 1e-9);
    assert!((missile.ax - rack.acceleration).abs() < 1e-9);
    assert!(missile.ay.abs() < 1e-9);

    let body = simulation
        .body(missile.id)
        .await
        .expect("missile should be registered");
    assert_eq!(body.profile().accel_cutoff, Some(rack.acceleration_duration));
}

#[tokio::test]
async fn fire_at_capacity_loses_the_shot() {
    let authority = Arc::new(RecordingAuthority::replying(vec![Action::model(
        ActionKind::Fire,
        PRIORITY_FIRE,
    )]));
    let settings = SimSettings {
        body_capacity: 0,
        ..support::parked_settings()
    };
    let (simulation, counters) = support::live_simulation(settings, authority);

    let pilot = Pilot::new(7, PlayerTuning::default(), standard_loadout());
    let shooter = support::manual_body(
        &simulation,
        &counters,
        BodyFamily::Ship,
        "ship",
        PhysicsState::at_rest(500.0, 400.0, 24.0),
        Some(pilot),
    );
    assert!(shooter.apply_command(PlayerCommand::NextWeapon));

    let previous = shooter.engine().snapshot();
    simulation.process_events(&shooter, previous, previous).await;

    // The projectile was refused; the shooter is untouched.
    assert_eq!(simulation.body_count().await, 0);
    assert!(shooter.life().is(LifeState::Alive));
}
