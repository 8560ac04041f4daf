//! Class/level progression tables.
//!
//! A single stock stat curve drives every attribute; classes shape it with
//! per-stat multipliers. The same data also carries the experience reward
//! and level threshold tables. Everything is validated once at load time;
//! a broken table is a content defect, not a runtime condition.

use super::Stat;

/// Archetype a character's stat multipliers are keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterClass {
    Villager,
    Soldier,
    Archer,
    Brigand,
    Captain,
}

/// One class's deviation from the stock stat curve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassSpec {
    pub class: CharacterClass,
    pub multipliers: Vec<StatMultiplier>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatMultiplier {
    pub stat: Stat,
    pub multiplier: f32,
}

/// Validation failures for progression data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ProgressionError {
    #[error("stat table is empty")]
    EmptyStatTable,

    #[error("experience reward table is empty")]
    EmptyRewardTable,

    #[error("level XP table must be strictly increasing (index {index})")]
    NonMonotonicXpTable { index: usize },

    #[error("{class} has a non-positive multiplier for {stat}")]
    NonPositiveMultiplier { class: CharacterClass, stat: Stat },
}

/// Class/level stat tables plus experience rules.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progression {
    /// Stock stat value per level (level 1 at index 0). Levels past the
    /// end of the table keep the last value.
    pub stat_table: Vec<i32>,

    /// Extra scaling applied to the Health stat only.
    pub health_multiplier: f32,

    /// Experience granted for killing a character of a given level.
    pub xp_reward_table: Vec<i32>,

    /// Experience required to pass each level; length bounds the
    /// maximum reachable level.
    pub level_xp_table: Vec<i32>,

    /// Per-class stat multipliers; stats not listed default to 1.0.
    pub classes: Vec<ClassSpec>,
}

impl Progression {
    /// Checks the tables for content defects. Call once after loading.
    pub fn validate(&self) -> Result<(), ProgressionError> {
        if self.stat_table.is_empty() {
            return Err(ProgressionError::EmptyStatTable);
        }
        if self.xp_reward_table.is_empty() {
            return Err(ProgressionError::EmptyRewardTable);
        }
        for (index, pair) in self.level_xp_table.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ProgressionError::NonMonotonicXpTable { index: index + 1 });
            }
        }
        for spec in &self.classes {
            for m in &spec.multipliers {
                if m.multiplier <= 0.0 {
                    return Err(ProgressionError::NonPositiveMultiplier {
                        class: spec.class,
                        stat: m.stat,
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolves a base stat for (class, stat, level), before equipment
    /// modifiers.
    pub fn stat(&self, class: CharacterClass, stat: Stat, level: u32) -> i32 {
        let stock = self.stock_stat(stat, level);
        let multiplier = self.class_multiplier(class, stat);
        (stock as f32 * multiplier).round() as i32
    }

    /// Experience granted for downing a character of `level`.
    pub fn reward_xp(&self, level: u32) -> i32 {
        let index = (level.max(1) as usize - 1).min(self.xp_reward_table.len() - 1);
        self.xp_reward_table[index]
    }

    /// Level reached with `xp` accumulated experience.
    pub fn level_for_xp(&self, xp: i32) -> u32 {
        let mut level = 1;
        for threshold in &self.level_xp_table {
            if xp < *threshold {
                break;
            }
            level += 1;
        }
        level
    }

    fn stock_stat(&self, stat: Stat, level: u32) -> i32 {
        let index = (level.max(1) as usize - 1).min(self.stat_table.len() - 1);
        let mut stock = self.stat_table[index];

        if stat == Stat::Health {
            stock = (self.health_multiplier * stock as f32).round() as i32;
        }

        stock
    }

    fn class_multiplier(&self, class: CharacterClass, stat: Stat) -> f32 {
        self.classes
            .iter()
            .find(|spec| spec.class == class)
            .and_then(|spec| spec.multipliers.iter().find(|m| m.stat == stat))
            .map_or(1.0, |m| m.multiplier)
    }
}
