//! Weapon configuration.
//!
//! A weapon decides the attack kind (melee or ranged), scales damage and
//! cooldown through its weight, and contributes stat modifiers while
//! equipped. Configurations come from content files; a bad one is a
//! content defect caught by [`WeaponConfig::validate`] at load time.

use crate::config::Tuning;
use crate::stats::{Stat, StatModifiers};

/// Delivery mechanism of an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum AttackKind {
    Melee,
    Ranged,
}

/// Flight parameters for a ranged weapon's projectile.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileConfig {
    /// Flight speed in m/s.
    pub speed: f32,
    /// Homing projectiles steer toward the target every tick; straight
    /// ones keep their launch direction.
    pub homing: bool,
    /// Straight projectiles may aim at where the target will be rather
    /// than where it is.
    pub lead_aim: bool,
    /// Lateral aim scatter amplitude in meters.
    pub spread: f32,
}

/// Validation failures for weapon content.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum WeaponError {
    #[error("weapon '{name}' has non-positive weight {weight}")]
    NonPositiveWeight { name: String, weight: f32 },

    #[error("weapon '{name}' has non-positive range {range}")]
    NonPositiveRange { name: String, range: f32 },

    #[error("weapon '{name}' has non-positive projectile speed {speed}")]
    NonPositiveProjectileSpeed { name: String, speed: f32 },
}

/// Authored parameters of one weapon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponConfig {
    pub name: String,
    /// Maximum attack distance in meters.
    pub range: f32,
    /// Scales both damage (`stat × weight`) and the strike cooldown
    /// (`base interval × weight`).
    pub weight: f32,
    /// Flat bonus to the weapon's attack stat while equipped.
    pub bonus_damage_points: i32,
    /// Percentage bonus to the weapon's attack stat while equipped.
    pub bonus_damage_percentage: i32,
    /// Present for ranged weapons.
    pub projectile: Option<ProjectileConfig>,
}

impl WeaponConfig {
    /// Bare fists: short range, neutral weight, no bonuses.
    pub fn unarmed() -> Self {
        Self {
            name: "Unarmed".into(),
            range: 2.0,
            weight: 1.0,
            bonus_damage_points: 0,
            bonus_damage_percentage: 0,
            projectile: None,
        }
    }

    pub fn attack_kind(&self) -> AttackKind {
        if self.projectile.is_some() {
            AttackKind::Ranged
        } else {
            AttackKind::Melee
        }
    }

    /// The stat this weapon attacks with.
    pub fn attack_stat(&self) -> Stat {
        match self.attack_kind() {
            AttackKind::Melee => Stat::Strength,
            AttackKind::Ranged => Stat::Range,
        }
    }

    /// Seconds between strikes, before per-strike jitter.
    pub fn cooldown(&self, tuning: &Tuning) -> f32 {
        tuning.base_attack_interval * self.weight
    }

    /// Stat modifiers contributed while this weapon is equipped. The
    /// bonuses land on the weapon's own attack stat.
    pub fn modifiers(&self) -> StatModifiers {
        let mut mods = StatModifiers::new();
        let stat = self.attack_stat();
        mods.add_flat(stat, self.bonus_damage_points);
        mods.add_percentage(stat, self.bonus_damage_percentage);
        mods
    }

    /// Content-load validation; a failure here is fatal at authoring
    /// time, never a runtime condition.
    pub fn validate(&self) -> Result<(), WeaponError> {
        if self.weight <= 0.0 {
            return Err(WeaponError::NonPositiveWeight {
                name: self.name.clone(),
                weight: self.weight,
            });
        }
        if self.range <= 0.0 {
            return Err(WeaponError::NonPositiveRange {
                name: self.name.clone(),
                range: self.range,
            });
        }
        if let Some(projectile) = &self.projectile {
            if projectile.speed <= 0.0 {
                return Err(WeaponError::NonPositiveProjectileSpeed {
                    name: self.name.clone(),
                    speed: projectile.speed,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bow() -> WeaponConfig {
        WeaponConfig {
            name: "Shortbow".into(),
            range: 10.0,
            weight: 1.2,
            bonus_damage_points: 5,
            bonus_damage_percentage: 10,
            projectile: Some(ProjectileConfig {
                speed: 12.0,
                homing: false,
                lead_aim: true,
                spread: 0.25,
            }),
        }
    }

    #[test]
    fn projectile_makes_a_weapon_ranged() {
        assert_eq!(bow().attack_kind(), AttackKind::Ranged);
        assert_eq!(bow().attack_stat(), Stat::Range);
        assert_eq!(WeaponConfig::unarmed().attack_kind(), AttackKind::Melee);
    }

    #[test]
    fn weight_scales_cooldown() {
        let tuning = Tuning::new();
        assert!((bow().cooldown(&tuning) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn bonuses_target_the_attack_stat() {
        let mods = bow().modifiers();
        // (20 + 5) × 1.1 = 27.5 → 28
        assert_eq!(mods.apply(Stat::Range, 20), 28);
        assert_eq!(mods.apply(Stat::Strength, 20), 20);
    }

    #[test]
    fn zero_weight_is_a_content_defect() {
        let mut w = WeaponConfig::unarmed();
        w.weight = 0.0;
        assert!(matches!(
            w.validate(),
            Err(WeaponError::NonPositiveWeight { .. })
        ));
    }
}
