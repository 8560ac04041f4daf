//! Combat domain: weapons, attack resolution, the attacker state machine,
//! and projectiles.
//!
//! The module follows one rule end to end: an attack attempt composes an
//! [`AttackPayload`] at the strike instant, the resolver turns it into an
//! [`AttackReport`], and the report is the only thing observers see.

pub mod fighter;
pub mod payload;
pub mod projectile;
pub mod resolver;
pub mod weapon;

pub use fighter::{Fighter, FighterState, FighterStep, TargetView};
pub use payload::{AttackPayload, AttackReport, AttackResult};
pub use projectile::{Projectile, ProjectileStep};
pub use resolver::{Rolls, crit_chance, hit_chance, mitigated_damage, resolve_damage};
pub use weapon::{AttackKind, ProjectileConfig, WeaponConfig, WeaponError};
