//! Hit, critical, and mitigation math for one attack attempt.
//!
//! These are the pure pieces of the resolution pipeline; the world glues
//! them to health application, faction reclassification, and experience
//! in [`World::resolve_attack`](crate::world::World::resolve_attack).
//!
//! All formulas share the `x / (x + y)` shape, so every chance lives in
//! `[0, 1)` for positive inputs. Degenerate zero/zero denominators are
//! clamped (hit → certain, crit → never) instead of propagating NaN.

use crate::config::Tuning;
use crate::stats::StatSnapshot;

use super::payload::{AttackPayload, AttackResult};
use super::weapon::AttackKind;

/// Melee hit chance from the attacker's precision and the defender's
/// swiftness.
///
/// ```text
/// chance = precision / (precision + evasion_multiplier × swiftness)
/// ```
pub fn hit_chance(precision: i32, swiftness: i32, evasion_multiplier: f32) -> f32 {
    let precision = precision.max(0) as f32;
    let evasion = evasion_multiplier * swiftness.max(0) as f32;
    let denominator = precision + evasion;
    if denominator <= 0.0 {
        return 1.0;
    }
    precision / denominator
}

/// Defense mitigation applied to raw damage.
///
/// ```text
/// damage = round(raw × attack / (attack + defense))
/// ```
pub fn mitigated_damage(raw: i32, attack_points: i32, defense: i32) -> i32 {
    let attack = attack_points.max(0) as f32;
    let denominator = attack + defense.max(0) as f32;
    if denominator <= 0.0 {
        return 0;
    }
    (raw.max(0) as f32 * (attack / denominator)).round() as i32
}

/// Critical strike chance against the target's protection (its own
/// attack-kind stat plus defense).
///
/// ```text
/// chance = crit / (crit + protection)
/// ```
pub fn crit_chance(crit_strike: i32, protection: i32) -> f32 {
    let crit = crit_strike.max(0) as f32;
    let denominator = crit + protection.max(0) as f32;
    if denominator <= 0.0 {
        return 0.0;
    }
    crit / denominator
}

/// The two independent uniform draws one resolution consumes.
#[derive(Clone, Copy, Debug)]
pub struct Rolls {
    /// Melee to-hit draw, `[0, 1)`. Ignored for ranged payloads.
    pub hit: f32,
    /// Critical strike draw, `[0, 1)`.
    pub crit: f32,
}

/// Resolves one attempt down to (result, damage), without touching any
/// state. Ranged payloads skip the miss roll; a connected projectile
/// always lands.
pub fn resolve_damage(
    payload: &AttackPayload,
    target: &StatSnapshot,
    rolls: Rolls,
    tuning: &Tuning,
) -> (AttackResult, i32) {
    if payload.kind == AttackKind::Melee {
        let chance = hit_chance(payload.hit_precision, target.swiftness, tuning.evasion_multiplier);
        if rolls.hit >= chance {
            return (AttackResult::Miss, 0);
        }
    }

    let damage = mitigated_damage(payload.damage, payload.attack_points, target.defense);

    let target_attack_stat = match payload.kind {
        AttackKind::Melee => target.strength,
        AttackKind::Ranged => target.range,
    };
    let chance = crit_chance(payload.crit_strike, target_attack_stat + target.defense);
    if rolls.crit < chance {
        (AttackResult::CriticalHit, damage * tuning.crit_multiplier)
    } else {
        (AttackResult::Hit, damage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::ClanId;
    use crate::world::AgentId;

    fn payload(kind: AttackKind, attack: i32, damage: i32, precision: i32, crit: i32) -> AttackPayload {
        AttackPayload {
            instigator: AgentId(0),
            instigator_clan: ClanId(0),
            kind,
            attack_points: attack,
            damage,
            hit_precision: precision,
            crit_strike: crit,
        }
    }

    #[test]
    fn zero_precision_always_misses_an_evasive_target() {
        assert_eq!(hit_chance(0, 5, 2.0), 0.0);
    }

    #[test]
    fn zero_swiftness_target_is_always_hit() {
        assert_eq!(hit_chance(10, 0, 2.0), 1.0);
    }

    #[test]
    fn degenerate_denominators_clamp() {
        assert_eq!(hit_chance(0, 0, 2.0), 1.0);
        assert_eq!(crit_chance(0, 0), 0.0);
        assert_eq!(mitigated_damage(10, 0, 0), 0);
    }

    #[test]
    fn evasion_multiplier_halves_chance_at_parity() {
        // precision 10 vs swiftness 5 doubled: 10 / (10 + 10) = 0.5
        assert!((hit_chance(10, 5, 2.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reference_mitigation_scenario() {
        // attack 20 vs defense 20 → reduction 0.5, raw 20 → 10.
        assert_eq!(mitigated_damage(20, 20, 20), 10);
    }

    #[test]
    fn forced_rolls_produce_a_critical_double() {
        // Spec reference: attack stat 20, weight 1.0, target defense 20,
        // swiftness 0, crit 5, target attack stat 0. Forced zero rolls
        // always hit and always crit: 10 × 2 = 20.
        let p = payload(AttackKind::Melee, 20, 20, 20, 5);
        let target = StatSnapshot {
            defense: 20,
            ..StatSnapshot::default()
        };
        let tuning = Tuning::new();
        let (result, damage) =
            resolve_damage(&p, &target, Rolls { hit: 0.0, crit: 0.0 }, &tuning);
        assert_eq!(result, AttackResult::CriticalHit);
        assert_eq!(damage, 20);
    }

    #[test]
    fn non_crit_hit_keeps_mitigated_damage() {
        let p = payload(AttackKind::Melee, 20, 20, 20, 5);
        let target = StatSnapshot {
            defense: 20,
            ..StatSnapshot::default()
        };
        let tuning = Tuning::new();
        // crit chance is 5/25 = 0.2; a 0.9 draw stays a plain hit.
        let (result, damage) =
            resolve_damage(&p, &target, Rolls { hit: 0.0, crit: 0.9 }, &tuning);
        assert_eq!(result, AttackResult::Hit);
        assert_eq!(damage, 10);
    }

    #[test]
    fn melee_miss_deals_nothing() {
        // precision 10 vs doubled swiftness 10 → chance 1/3; roll 0.5 misses.
        let p = payload(AttackKind::Melee, 10, 10, 10, 0);
        let target = StatSnapshot {
            swiftness: 10,
            ..StatSnapshot::default()
        };
        let (result, damage) =
            resolve_damage(&p, &target, Rolls { hit: 0.5, crit: 0.0 }, &Tuning::new());
        assert_eq!(result, AttackResult::Miss);
        assert_eq!(damage, 0);
    }

    #[test]
    fn ranged_payloads_skip_the_miss_roll() {
        let p = payload(AttackKind::Ranged, 10, 10, 10, 0);
        let target = StatSnapshot {
            swiftness: 100,
            ..StatSnapshot::default()
        };
        // Even a hopeless hit roll connects once the projectile did.
        let (result, _) =
            resolve_damage(&p, &target, Rolls { hit: 0.999, crit: 0.9 }, &Tuning::new());
        assert_eq!(result, AttackResult::Hit);
    }
}
