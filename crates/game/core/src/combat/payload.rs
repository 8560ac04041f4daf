//! Ephemeral attack request/result values.
//!
//! An [`AttackPayload`] freezes everything the resolver needs at the
//! strike instant. For projectiles that matters: the numbers are locked
//! at launch, not at impact. The [`AttackReport`] is the only channel
//! observers learn a combat outcome through; nothing polls health.

use crate::faction::ClanId;
use crate::stats::StatSnapshot;
use crate::world::AgentId;

use super::weapon::{AttackKind, WeaponConfig};

/// Outcome class of one attack attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum AttackResult {
    /// Nothing happened (target already down).
    #[default]
    None,
    Hit,
    Miss,
    CriticalHit,
    /// The hit dropped the target.
    TargetDown,
}

/// Result of one attack attempt, produced by the resolver and discarded
/// after observers have seen it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackReport {
    pub result: AttackResult,
    pub damage_dealt: i32,
    pub instigator: AgentId,
}

impl AttackReport {
    pub fn none(instigator: AgentId) -> Self {
        Self {
            result: AttackResult::None,
            damage_dealt: 0,
            instigator,
        }
    }
}

/// Frozen attack numbers for one strike, computed once per attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackPayload {
    pub instigator: AgentId,
    /// The instigator's clan at the strike instant; the friendly-fire
    /// check uses this even if the instigator dies before a projectile
    /// lands.
    pub instigator_clan: ClanId,
    pub kind: AttackKind,
    /// The instigator's attack-kind stat, used for mitigation.
    pub attack_points: i32,
    /// Raw damage before mitigation: `attack stat × weapon weight`.
    pub damage: i32,
    /// Attack-kind stat + swiftness; the melee to-hit term.
    pub hit_precision: i32,
    /// Critical strike rating.
    pub crit_strike: i32,
}

impl AttackPayload {
    /// Composes a payload from the instigator's snapshot and weapon.
    pub fn compose(
        instigator: AgentId,
        instigator_clan: ClanId,
        snapshot: &StatSnapshot,
        weapon: &WeaponConfig,
    ) -> Self {
        let kind = weapon.attack_kind();
        let attack_points = match kind {
            AttackKind::Melee => snapshot.strength,
            AttackKind::Ranged => snapshot.range,
        };
        Self {
            instigator,
            instigator_clan,
            kind,
            attack_points,
            damage: (attack_points as f32 * weapon.weight).round() as i32,
            hit_precision: attack_points + snapshot.swiftness,
            crit_strike: snapshot.crit_strike,
        }
    }
}
