//! Session driver: owns the world, the oracles, and the event fan-out.
//!
//! The session is the explicit top-level owner of simulation lifetime;
//! no globals, no spawn-once flags. It advances the world with a fixed
//! timestep, forwards command-source intents at player priority, and
//! logs the event stream through `tracing` (the one built-in consumer of
//! the presentation boundary).

use game_content::{ScenarioSpec, WeaponCatalog};
use game_core::{
    AgentId, Command, Env, GameEvent, PcgRng, Progression, Tuning, World, priority,
};

use crate::error::Result;
use crate::persistence;
use crate::planner::DirectPlanner;
use crate::scenario;

/// One running simulation.
pub struct Session {
    world: World,
    planner: DirectPlanner,
    rng: PcgRng,
}

impl Session {
    /// Assembles a session from authored content. A zero scenario seed
    /// means "pick one": the session draws it, keeping authored seeds
    /// reproducible and casual runs varied.
    pub fn from_scenario(
        spec: &ScenarioSpec,
        catalog: &WeaponCatalog,
        progression: Progression,
        tuning: Tuning,
    ) -> Result<Self> {
        let seed = if spec.seed != 0 {
            spec.seed
        } else {
            rand::random::<u64>()
        };
        tracing::info!(seed, agents = spec.agents.len(), "assembling session");
        let world = scenario::build_world(spec, catalog, progression, tuning, seed)?;
        Ok(Self {
            world,
            planner: DirectPlanner,
            rng: PcgRng,
        })
    }

    /// Wraps an already-built world (tests, tools).
    pub fn with_world(world: World) -> Self {
        Self {
            world,
            planner: DirectPlanner,
            rng: PcgRng,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn agent_id(&self, name: &str) -> Option<AgentId> {
        self.world.agent_by_name(name).map(|a| a.id)
    }

    /// Applies a player-issued intent.
    pub fn command(&mut self, agent: AgentId, command: Command) -> bool {
        let env = Env::new(&self.planner, &self.rng);
        self.world.command(agent, command, priority::PLAYER, &env)
    }

    /// Advances the simulation one step and returns the drained events.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let env = Env::new(&self.planner, &self.rng);
        self.world.tick(dt, &env);
        let events = self.world.drain_events();
        for event in &events {
            log_event(event);
        }
        events
    }

    /// Runs `seconds` of simulation at a fixed `dt`, collecting events.
    pub fn run_for(&mut self, seconds: f32, dt: f32) -> Vec<GameEvent> {
        let mut all = Vec::new();
        let steps = (seconds / dt).ceil() as usize;
        for _ in 0..steps {
            all.extend(self.tick(dt));
        }
        all
    }

    /// Captures health and positions into an opaque blob.
    pub fn capture(&self) -> Result<serde_json::Value> {
        persistence::capture(&self.world)
    }

    /// Restores a captured blob; every agent re-enters Idle.
    pub fn restore(&mut self, blob: &serde_json::Value) -> Result<()> {
        persistence::restore(&mut self.world, blob)
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ActionStarted { agent, action } => {
            tracing::debug!(%agent, %action, "action started");
        }
        GameEvent::ActionFinished { agent } => {
            tracing::debug!(%agent, "action finished");
        }
        GameEvent::HealthChanged {
            agent,
            points,
            max_points,
        } => {
            tracing::debug!(%agent, points, max_points, "health changed");
        }
        GameEvent::Attack { target, report } => {
            tracing::debug!(
                %target,
                instigator = %report.instigator,
                result = %report.result,
                damage = report.damage_dealt,
                "attack resolved"
            );
        }
        GameEvent::ClanWentRogue { clan } => {
            tracing::warn!(clan = clan.0, "clan turned rogue");
        }
        GameEvent::Died { agent } => {
            tracing::info!(%agent, "died");
        }
        GameEvent::LeveledUp { agent, level } => {
            tracing::info!(%agent, level, "leveled up");
        }
        GameEvent::Despawned { agent } => {
            tracing::debug!(%agent, "despawned");
        }
    }
}
