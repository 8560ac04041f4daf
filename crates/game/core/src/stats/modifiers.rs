//! Additive and percentage stat modifiers.
//!
//! Equipment (currently: the equipped weapon) contributes flat points and
//! percentage bonuses per stat. Modifiers are aggregated into one set and
//! applied when the stat snapshot is resolved, never on read.

use strum::EnumCount;

use super::Stat;

/// Aggregated equipment modifiers, indexed by [`Stat`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatModifiers {
    additive: [i32; Stat::COUNT],
    percentage: [i32; Stat::COUNT],
}

impl StatModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds flat bonus points to a stat.
    pub fn add_flat(&mut self, stat: Stat, points: i32) {
        self.additive[stat as usize] += points;
    }

    /// Adds a percentage bonus (whole percent, 10 = +10%) to a stat.
    pub fn add_percentage(&mut self, stat: Stat, percent: i32) {
        self.percentage[stat as usize] += percent;
    }

    /// Applies this set to a base value:
    /// `(base + flat) × (1 + percent / 100)`, rounded.
    pub fn apply(&self, stat: Stat, base: i32) -> i32 {
        let flat = base + self.additive[stat as usize];
        let scale = 1.0 + self.percentage[stat as usize] as f32 / 100.0;
        (flat as f32 * scale).round() as i32
    }
}
