//! Tunable balance constants and action priorities.

/// Action priorities used by the single-slot scheduler.
///
/// A request preempts the active one when its priority is greater or
/// equal; the constants keep the three command sources ordered without
/// scattering magic numbers.
pub mod priority {
    /// The empty slot. Never used for a live request.
    pub const IDLE: i32 = 0;
    /// Requests issued by the AI behavior loop.
    pub const AI: i32 = 1;
    /// Requests issued by the player command source.
    pub const PLAYER: i32 = 2;
    /// Requests propagated by a formation leader.
    pub const LEADER: i32 = 3;
}

/// Collected numeric knobs of the combat and behavior systems.
///
/// Everything here is a balance decision, not an invariant: tests pin the
/// defaults, content may override them per session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tuning {
    /// Multiplier applied to the defender's swiftness in the melee hit
    /// formula (`precision / (precision + mult × swiftness)`).
    pub evasion_multiplier: f32,

    /// Damage multiplier on a critical strike.
    pub crit_multiplier: i32,

    /// Base seconds between strikes before weapon weight scaling.
    pub base_attack_interval: f32,

    /// Cooldown jitter: the next cooldown is drawn uniformly from
    /// `base × [1−variance, 1+variance]`.
    pub cooldown_variance: f32,

    /// Fraction of maximum weapon range a ranged attacker closes to
    /// before standing to fire.
    pub comfortable_range_fraction: f32,

    /// Turn rate toward the target while in range, radians per second.
    pub facing_turn_speed: f32,

    /// Default movement speed in m/s at speed fraction 1.0.
    pub max_speed: f32,

    /// Distance at which a move-to-point action counts as arrived.
    pub arrival_tolerance: f32,

    /// Contact distance for a projectile to connect with its target.
    pub projectile_hit_radius: f32,

    /// Seconds a projectile flies before despawning without contact.
    pub projectile_lifetime: f32,

    /// Seconds a dead agent lingers before it is freed.
    pub despawn_grace: f32,
}

impl Tuning {
    pub const DEFAULT_EVASION_MULTIPLIER: f32 = 2.0;
    pub const DEFAULT_CRIT_MULTIPLIER: i32 = 2;
    pub const DEFAULT_BASE_ATTACK_INTERVAL: f32 = 1.0;
    pub const DEFAULT_COOLDOWN_VARIANCE: f32 = 0.15;
    pub const DEFAULT_COMFORTABLE_RANGE_FRACTION: f32 = 0.75;

    pub fn new() -> Self {
        Self {
            evasion_multiplier: Self::DEFAULT_EVASION_MULTIPLIER,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            base_attack_interval: Self::DEFAULT_BASE_ATTACK_INTERVAL,
            cooldown_variance: Self::DEFAULT_COOLDOWN_VARIANCE,
            comfortable_range_fraction: Self::DEFAULT_COMFORTABLE_RANGE_FRACTION,
            facing_turn_speed: std::f32::consts::TAU,
            max_speed: 5.66,
            arrival_tolerance: 1.0,
            projectile_hit_radius: 0.5,
            projectile_lifetime: 10.0,
            despawn_grace: 5.0,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new()
    }
}
