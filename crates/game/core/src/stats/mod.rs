//! Character attributes: progression tables, modifiers, snapshots.
//!
//! Stats follow a strict two-phase scheme. An agent is *configured* with a
//! class and level; at activation the world resolves a [`StatSnapshot`]
//! from the progression tables plus equipment modifiers. Nothing is
//! computed lazily on first read; re-resolving happens only on explicit
//! occasions (level-up, weapon change).

mod modifiers;
mod progression;

pub use modifiers::StatModifiers;
pub use progression::{
    CharacterClass, ClassSpec, Progression, ProgressionError, StatMultiplier,
};

/// Numeric attributes a character resolves from its class/level table.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stat {
    /// Maximum health points.
    Health,
    /// Melee attack power.
    Strength,
    /// Ranged attack power.
    Range,
    /// Hit precision contribution and evasion.
    Swiftness,
    /// Incoming damage mitigation.
    Defense,
    /// Critical strike rating.
    CritStrike,
}

/// Resolved attribute values, locked at agent activation.
///
/// The snapshot is immutable; the world replaces it wholesale when the
/// level or equipment changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatSnapshot {
    pub max_health: i32,
    pub strength: i32,
    pub range: i32,
    pub swiftness: i32,
    pub defense: i32,
    pub crit_strike: i32,
}

impl StatSnapshot {
    /// Resolves a snapshot from the tables and the aggregated modifiers.
    pub fn resolve(
        progression: &Progression,
        class: CharacterClass,
        level: u32,
        modifiers: &StatModifiers,
    ) -> Self {
        let stat = |s: Stat| modifiers.apply(s, progression.stat(class, s, level));
        Self {
            max_health: stat(Stat::Health),
            strength: stat(Stat::Strength),
            range: stat(Stat::Range),
            swiftness: stat(Stat::Swiftness),
            defense: stat(Stat::Defense),
            crit_strike: stat(Stat::CritStrike),
        }
    }
}

/// Configured identity of an agent's stats: class, level, experience.
///
/// This is the stored half of the two-phase scheme; the resolved
/// [`StatSnapshot`] is the derived half.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatSheet {
    pub class: CharacterClass,
    level: u32,
    experience: i32,
}

impl StatSheet {
    pub fn new(class: CharacterClass, level: u32) -> Self {
        Self {
            class,
            level: level.max(1),
            experience: 0,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> i32 {
        self.experience
    }

    /// Adds experience and returns the new level if the XP tables say the
    /// agent advanced. Levels never regress.
    pub fn gain_experience(&mut self, progression: &Progression, amount: i32) -> Option<u32> {
        self.experience += amount.max(0);
        let reached = progression.level_for_xp(self.experience);
        if reached > self.level {
            self.level = reached;
            return Some(reached);
        }
        None
    }
}
