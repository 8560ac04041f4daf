//! Scenario definitions: authored worlds in one RON file.
//!
//! A scenario names the clans, the agents with their classes, posts,
//! patrols and squads, and the weapons they hold (by catalog name). The
//! loader checks the cross-references; turning a spec into a live world
//! is the runtime's job.

use std::collections::BTreeSet;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use game_core::{AiConfig, Alignment, CharacterClass, FormationConfig};

use crate::loaders::{LoadResult, read_file};

/// One clan declaration.
#[derive(Clone, Debug, Deserialize)]
pub struct ClanEntry {
    pub name: String,
    pub alignment: Alignment,
}

/// One authored agent.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    pub class: CharacterClass,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Clan name; must match a [`ClanEntry`].
    pub clan: String,
    pub position: Vec3,
    #[serde(default)]
    pub heading: f32,
    /// Weapon catalog name; unarmed when absent.
    #[serde(default)]
    pub weapon: Option<String>,
    /// Present for AI-driven agents; absent for player-controlled ones.
    #[serde(default)]
    pub ai: Option<AiConfig>,
    /// Waypoint loop for guard patrols; requires `ai`.
    #[serde(default)]
    pub patrol: Option<Vec<Vec3>>,
    /// Present for squad leaders.
    #[serde(default)]
    pub formation: Option<FormationConfig>,
    /// Leader's agent name; wires this agent into that squad.
    #[serde(default)]
    pub leader: Option<String>,
}

fn default_level() -> u32 {
    1
}

/// A parsed, cross-checked scenario.
#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub seed: u64,
    pub clans: Vec<ClanEntry>,
    pub agents: Vec<AgentEntry>,
}

impl ScenarioSpec {
    /// Cross-reference validation; every failure is a content defect.
    pub fn validate(&self) -> anyhow::Result<()> {
        let clan_names: BTreeSet<&str> = self.clans.iter().map(|c| c.name.as_str()).collect();
        let mut agent_names = BTreeSet::new();

        for agent in &self.agents {
            if !agent_names.insert(agent.name.as_str()) {
                anyhow::bail!("duplicate agent name '{}'", agent.name);
            }
            if !clan_names.contains(agent.clan.as_str()) {
                anyhow::bail!("agent '{}' references unknown clan '{}'", agent.name, agent.clan);
            }
            if agent.level < 1 {
                anyhow::bail!("agent '{}' has level 0", agent.name);
            }
            if let Some(patrol) = &agent.patrol {
                if patrol.is_empty() {
                    anyhow::bail!("agent '{}' has an empty patrol path", agent.name);
                }
                if agent.ai.is_none() {
                    anyhow::bail!("agent '{}' has a patrol but no AI", agent.name);
                }
            }
        }
        for agent in &self.agents {
            if let Some(leader) = &agent.leader {
                let found = self
                    .agents
                    .iter()
                    .any(|a| &a.name == leader && a.formation.is_some());
                if !found {
                    anyhow::bail!(
                        "agent '{}' references leader '{}' which is not a formation leader",
                        agent.name,
                        leader
                    );
                }
            }
        }
        Ok(())
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    fn parse(content: &str) -> anyhow::Result<ScenarioSpec> {
        let spec: ScenarioSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("failed to parse scenario RON: {}", e))?;
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIRMISH: &str = r#"(
    seed: 11,
    clans: [
        (name: "TownWatch", alignment: Lawful),
        (name: "Bandits", alignment: Rebel),
    ],
    agents: [
        (
            name: "captain",
            class: Captain,
            level: 3,
            clan: "TownWatch",
            position: (0.0, 0.0, 0.0),
            weapon: Some("Longsword"),
            formation: Some(()),
        ),
        (
            name: "guard-1",
            class: Soldier,
            clan: "TownWatch",
            position: (2.0, 0.0, -2.0),
            ai: Some(()),
            leader: Some("captain"),
        ),
        (
            name: "lookout",
            class: Archer,
            clan: "Bandits",
            position: (20.0, 0.0, 0.0),
            weapon: Some("Shortbow"),
            ai: Some((sight_range: 14.0)),
            patrol: Some([(20.0, 0.0, 0.0), (24.0, 0.0, 4.0)]),
        ),
    ],
)"#;

    #[test]
    fn parses_a_full_scenario() {
        let spec = ScenarioLoader::parse(SKIRMISH).unwrap();
        assert_eq!(spec.seed, 11);
        assert_eq!(spec.clans.len(), 2);
        assert_eq!(spec.agents.len(), 3);
        assert_eq!(spec.agents[1].level, 1);
        assert_eq!(spec.agents[1].leader.as_deref(), Some("captain"));
        let lookout = &spec.agents[2];
        assert!(lookout.ai.is_some());
        assert_eq!(lookout.ai.unwrap().sight_range, 14.0);
        assert_eq!(lookout.patrol.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn unknown_clan_reference_fails() {
        let broken = SKIRMISH.replace("clan: \"Bandits\"", "clan: \"Pirates\"");
        let err = ScenarioLoader::parse(&broken).unwrap_err();
        assert!(err.to_string().contains("unknown clan"));
    }

    #[test]
    fn leader_must_be_a_formation_leader() {
        let broken = SKIRMISH.replace("leader: Some(\"captain\")", "leader: Some(\"lookout\")");
        let err = ScenarioLoader::parse(&broken).unwrap_err();
        assert!(err.to_string().contains("not a formation leader"));
    }

    #[test]
    fn patrol_without_ai_fails() {
        let broken = SKIRMISH.replace("ai: Some((sight_range: 14.0)),", "");
        let err = ScenarioLoader::parse(&broken).unwrap_err();
        assert!(err.to_string().contains("no AI"));
    }
}
