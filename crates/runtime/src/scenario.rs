//! Scenario assembly: turning authored content into a live world.

use std::collections::BTreeMap;

use game_content::{ScenarioSpec, WeaponCatalog};
use game_core::{
    AgentId, AgentSpec, PatrolPath, Progression, Tuning, WeaponConfig, World,
};

use crate::error::{Result, RuntimeError};

/// Builds a [`World`] from a validated scenario spec, resolving weapon
/// and clan references through the catalog.
pub fn build_world(
    spec: &ScenarioSpec,
    catalog: &WeaponCatalog,
    progression: Progression,
    tuning: Tuning,
    seed: u64,
) -> Result<World> {
    let mut world = World::new(seed, tuning, progression);

    let mut clans = BTreeMap::new();
    for clan in &spec.clans {
        let id = world.declare_clan(clan.name.clone(), clan.alignment);
        clans.insert(clan.name.clone(), id);
    }

    let mut agents: BTreeMap<String, AgentId> = BTreeMap::new();
    for entry in &spec.agents {
        let clan = *clans
            .get(&entry.clan)
            .ok_or_else(|| RuntimeError::UnknownClan(entry.clan.clone()))?;
        let weapon = match &entry.weapon {
            Some(name) => catalog
                .get(name)
                .ok_or_else(|| RuntimeError::UnknownWeapon(name.clone()))?
                .clone(),
            None => WeaponConfig::unarmed(),
        };

        let mut agent_spec =
            AgentSpec::new(&entry.name, entry.class, entry.level, clan, entry.position)
                .with_weapon(weapon);
        agent_spec.heading = entry.heading;
        if let Some(ai) = entry.ai {
            agent_spec = match entry.patrol.as_ref().and_then(|p| PatrolPath::new(p.clone())) {
                Some(path) => agent_spec.with_patrol(ai, path),
                None => agent_spec.with_ai(ai),
            };
        }
        if let Some(formation) = entry.formation {
            agent_spec = agent_spec.with_formation(formation);
        }

        let id = world.spawn(agent_spec);
        tracing::debug!(agent = %entry.name, id = %id, clan = %entry.clan, "spawned");
        agents.insert(entry.name.clone(), id);
    }

    // Squad wiring happens after every member exists.
    for entry in &spec.agents {
        if let Some(leader_name) = &entry.leader {
            let leader = *agents
                .get(leader_name)
                .ok_or_else(|| RuntimeError::UnknownAgent(leader_name.clone()))?;
            let follower = agents[&entry.name];
            world.assign_follower(leader, follower);
        }
    }

    Ok(world)
}
