//! The capture/restore boundary: health and positions survive the round
//! trip, actions in progress do not.

use game_core::{
    ActionType, AgentSpec, Alignment, CharacterClass, Command, Progression, Tuning, World,
};
use glam::Vec3;
use runtime::Session;

fn progression() -> Progression {
    Progression {
        stat_table: vec![10, 12, 15, 18],
        health_multiplier: 10.0,
        xp_reward_table: vec![10, 15, 25, 40],
        level_xp_table: vec![100, 250, 500],
        classes: Vec::new(),
    }
}

fn two_agent_world() -> World {
    let mut world = World::new(5, Tuning::new(), progression());
    let watch = world.declare_clan("TownWatch", Alignment::Lawful);
    let bandits = world.declare_clan("Bandits", Alignment::Rebel);
    world.spawn(AgentSpec::new(
        "guard",
        CharacterClass::Soldier,
        2,
        watch,
        Vec3::new(1.0, 0.0, 1.0),
    ));
    world.spawn(AgentSpec::new(
        "bandit",
        CharacterClass::Brigand,
        1,
        bandits,
        Vec3::new(5.0, 0.0, 0.0),
    ));
    world
}

#[test]
fn blob_round_trip_restores_health_and_position() {
    let mut session = Session::with_world(two_agent_world());
    let guard = session.agent_id("guard").unwrap();
    let bandit = session.agent_id("bandit").unwrap();

    // Rough the guard up a little before capturing.
    session.world_mut().strike(
        bandit,
        guard,
        &game_core::Env::new(&runtime::DirectPlanner, &game_core::PcgRng),
    );
    let captured_hp = session.world().agent(guard).unwrap().health.points();
    let blob = session.capture().unwrap();

    // Diverge: move, fight, walk away.
    session.world_mut().warp(guard, Vec3::new(40.0, 0.0, 0.0));
    session.command(guard, Command::MoveTo(Vec3::ZERO));
    assert_eq!(
        session.world().agent(guard).unwrap().scheduler.current(),
        ActionType::Move
    );

    session.restore(&blob).unwrap();

    let g = session.world().agent(guard).unwrap();
    assert_eq!(g.pos, Vec3::new(1.0, 0.0, 1.0));
    assert_eq!(g.health.points(), captured_hp);
    // Restore drops all in-progress actions.
    assert_eq!(g.scheduler.current(), ActionType::None);
    assert!(!g.mover.is_active());
}

#[test]
fn blob_survives_json_serialization() {
    let session = Session::with_world(two_agent_world());
    let blob = session.capture().unwrap();

    let text = serde_json::to_string(&blob).unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();

    let mut session2 = Session::with_world(two_agent_world());
    session2.restore(&reparsed).unwrap();
    assert_eq!(
        session2.world().agent_by_name("guard").unwrap().pos,
        Vec3::new(1.0, 0.0, 1.0)
    );
}

#[test]
fn restoring_a_dead_record_freezes_the_agent() {
    let mut session = Session::with_world(two_agent_world());
    let guard = session.agent_id("guard").unwrap();

    let mut blob = session.capture().unwrap();
    blob["records"][0]["health_points"] = serde_json::json!(0);
    session.restore(&blob).unwrap();

    let g = session.world().agent(guard).unwrap();
    assert!(g.health.is_dead());
    assert!(g.scheduler.is_frozen());
}
