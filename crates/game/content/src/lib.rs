//! Data-driven content definitions and loaders.
//!
//! This crate houses the authored balance and scenario data and provides
//! loaders for RON/TOML files:
//! - Progression tables (stat curves, XP rewards, level thresholds) via TOML
//! - Weapon catalogs via RON
//! - Balance tuning overrides via TOML
//! - Scenario definitions (clans, agents, patrols, squads) via RON
//!
//! Every loader validates on read: a broken data file is a content
//! defect surfaced loudly at initialization, never a runtime condition.
//!
//! All loaders use game-core types directly with serde.

pub mod loaders;
pub mod scenario;

pub use loaders::{
    LoadResult, ProgressionLoader, TuningLoader, WeaponCatalog, WeaponLoader, read_file,
};
pub use scenario::{AgentEntry, ClanEntry, ScenarioLoader, ScenarioSpec};
