//! Deterministic combat and behavior core for a real-time action RPG.
//!
//! `game-core` decides, each tick, which action an agent is allowed to
//! perform, resolves melee/ranged attacks (hit, critical, mitigation),
//! and drives non-player agents' target selection and patrol behavior.
//! All state mutation flows through [`world::World`]; path planning and
//! randomness come in through the [`env`] oracles, so a fixed seed
//! replays a session exactly.
//!
//! The crate performs no I/O and emits no logs; it reports what happened
//! through the [`events::GameEvent`] stream.

pub mod action;
pub mod ai;
pub mod combat;
pub mod config;
pub mod env;
pub mod events;
pub mod faction;
pub mod movement;
pub mod stats;
pub mod world;

pub use action::{ActionScheduler, ActionType, Verdict};
pub use ai::{AiConfig, AiController, AiState, Formation, FormationConfig, PatrolPath};
pub use combat::{
    AttackKind, AttackPayload, AttackReport, AttackResult, Fighter, FighterState, Projectile,
    ProjectileConfig, WeaponConfig, WeaponError,
};
pub use config::{Tuning, priority};
pub use env::{Env, PathOracle, PcgRng, PlannedPath, RngOracle};
pub use events::GameEvent;
pub use faction::{Alignment, ClanId, FactionRegistry};
pub use movement::{MoveProgress, Mover};
pub use stats::{
    CharacterClass, ClassSpec, Progression, ProgressionError, Stat, StatMultiplier, StatSheet,
    StatSnapshot,
};
pub use world::{Agent, AgentId, AgentRecord, AgentSpec, AiSpec, Command, Health, World};
