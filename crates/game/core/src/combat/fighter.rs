//! The attacker state machine.
//!
//! A fighter drives one attack loop while the Attack action owns the
//! agent's scheduler slot: close in until the weapon reaches, hold and
//! face the target, strike when the cooldown elapses, repeat. The state
//! machine is advanced one step per world tick; the world feeds it a
//! [`TargetView`] and executes the returned [`FighterStep`].

use crate::world::AgentId;

use super::weapon::{AttackKind, WeaponConfig};

/// Resume point of the attack loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FighterState {
    /// No attack in progress.
    #[default]
    Idle,
    /// Target out of reach; a move order is active.
    Approaching,
    /// In reach, waiting out the cooldown.
    InRange,
    /// The strike's effect instant fires this tick.
    Striking,
}

/// What the world should do for the fighter this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FighterStep {
    /// Target gone, dead, or no longer hostile: exit the loop and free
    /// the scheduler slot.
    Complete,
    /// Issue/refresh a move order toward the target.
    Approach,
    /// Stand, rotate toward the target, and optionally fire the strike.
    Hold { strike: bool },
}

/// Per-tick facts about the current target, assembled by the world.
#[derive(Clone, Copy, Debug)]
pub struct TargetView {
    pub distance: f32,
    pub alive: bool,
    pub hostile: bool,
}

/// Attack loop state for one agent.
#[derive(Clone, Debug)]
pub struct Fighter {
    weapon: WeaponConfig,
    target: Option<AgentId>,
    state: FighterState,
    cooldown_remaining: f32,
    free_fire: bool,
}

impl Fighter {
    pub fn new(weapon: WeaponConfig) -> Self {
        Self {
            weapon,
            target: None,
            state: FighterState::Idle,
            cooldown_remaining: 0.0,
            free_fire: false,
        }
    }

    pub fn weapon(&self) -> &WeaponConfig {
        &self.weapon
    }

    /// Swaps the equipped weapon, returning the previous one. The caller
    /// re-resolves the stat snapshot afterwards.
    pub fn equip(&mut self, weapon: WeaponConfig) -> WeaponConfig {
        std::mem::replace(&mut self.weapon, weapon)
    }

    pub fn target(&self) -> Option<AgentId> {
        self.target
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    /// Stores the target and enters the loop. The scheduler slot must
    /// already be held.
    ///
    /// `free_fire` marks a deliberate engagement of a non-hostile target
    /// (a commanded ally attack): the loop then ignores the hostility
    /// exit, since the first strike's friendly-fire promotion is what
    /// establishes hostility.
    pub fn engage(&mut self, target: AgentId, free_fire: bool) {
        self.target = Some(target);
        self.free_fire = free_fire;
        self.state = FighterState::Approaching;
    }

    /// Whether this engagement deliberately started on a non-hostile
    /// target.
    pub fn free_fire(&self) -> bool {
        self.free_fire
    }

    /// Stops the loop. Safe in any state, including mid-wind-up; never
    /// touches the scheduler.
    pub fn cancel(&mut self) {
        self.target = None;
        self.free_fire = false;
        self.state = FighterState::Idle;
    }

    /// Advances the cooldown clock and decides this tick's step. The
    /// world applies the step (movement, facing, strike) and reports the
    /// strike back through [`Fighter::strike_fired`].
    pub fn advance(
        &mut self,
        view: Option<TargetView>,
        comfortable_range_fraction: f32,
        dt: f32,
    ) -> FighterStep {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);

        let Some(view) = view else {
            self.cancel();
            return FighterStep::Complete;
        };
        if !view.alive || !view.hostile {
            self.cancel();
            return FighterStep::Complete;
        }

        let reach = match self.weapon.attack_kind() {
            AttackKind::Melee => self.weapon.range,
            // Ranged attackers keep closing to a comfortable stand-off
            // distance inside their maximum range.
            AttackKind::Ranged => self.weapon.range * comfortable_range_fraction,
        };

        if view.distance > reach {
            self.state = FighterState::Approaching;
            return FighterStep::Approach;
        }

        let strike = self.cooldown_remaining <= 0.0;
        self.state = if strike {
            FighterState::Striking
        } else {
            FighterState::InRange
        };
        FighterStep::Hold { strike }
    }

    /// Records that the strike fired and arms the next cooldown (already
    /// jittered by the caller).
    pub fn strike_fired(&mut self, next_cooldown: f32) {
        self.cooldown_remaining = next_cooldown.max(0.0);
        self.state = FighterState::InRange;
    }
}
