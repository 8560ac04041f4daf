//! Agents and their capability set.
//!
//! An [`Agent`] is the explicit capability registry of the design: every
//! behavior it owns (scheduler, mover, fighter, optional AI, optional
//! formation lead) is a plain field resolved at construction. There are
//! no runtime capability lookups.

use glam::Vec3;

use crate::action::{ActionScheduler, ActionType};
use crate::ai::{AiConfig, AiController, Formation, FormationConfig, PatrolPath};
use crate::combat::{Fighter, WeaponConfig};
use crate::config::Tuning;
use crate::faction::ClanId;
use crate::movement::{MoveProgress, Mover};
use crate::stats::{CharacterClass, StatSheet, StatSnapshot};

/// Stable identity of an agent within one world. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Health record of one agent.
///
/// Invariants: `0 ≤ points ≤ max_points`, and `dead` never reverts within
/// a lifetime except through explicit restore. Mutation funnels through
/// the resolver path and the world's level-up/restore handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    points: i32,
    max_points: i32,
    dead: bool,
}

impl Health {
    pub fn new(max_points: i32) -> Self {
        let max_points = max_points.max(1);
        Self {
            points: max_points,
            max_points,
            dead: false,
        }
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn max_points(&self) -> i32 {
        self.max_points
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Below the death threshold but not yet transitioned.
    pub(crate) fn is_down(&self) -> bool {
        self.points < 1
    }

    /// Monotonic decrease, floored at zero.
    pub(crate) fn apply_damage(&mut self, damage: i32) {
        self.points = (self.points - damage.max(0)).max(0);
    }

    pub(crate) fn mark_dead(&mut self) {
        self.dead = true;
    }

    /// Changes the maximum (level-up, equipment) preserving the current
    /// health fraction.
    pub(crate) fn rescale(&mut self, new_max: i32) {
        let new_max = new_max.max(1);
        let fraction = self.points as f32 / self.max_points as f32;
        self.max_points = new_max;
        self.points = (new_max as f32 * fraction).round() as i32;
    }

    /// Restore-from-capture: the one path that may revive an agent.
    pub(crate) fn restore(&mut self, points: i32) {
        self.points = points.clamp(0, self.max_points);
        self.dead = self.points < 1;
    }
}

/// Configured (pre-activation) description of an agent.
///
/// This is phase one of the two-phase construction: a spec holds only
/// authored data. [`World::spawn`](super::World::spawn) resolves it into
/// a live [`Agent`] with a locked stat snapshot.
#[derive(Clone, Debug)]
pub struct AgentSpec {
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub clan: ClanId,
    pub position: Vec3,
    pub heading: f32,
    pub weapon: WeaponConfig,
    pub ai: Option<AiSpec>,
    pub formation: Option<FormationConfig>,
}

/// AI loop configuration inside an [`AgentSpec`].
#[derive(Clone, Debug)]
pub struct AiSpec {
    pub config: AiConfig,
    pub patrol: Option<PatrolPath>,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        class: CharacterClass,
        level: u32,
        clan: ClanId,
        position: Vec3,
    ) -> Self {
        Self {
            name: name.into(),
            class,
            level,
            clan,
            position,
            heading: 0.0,
            weapon: WeaponConfig::unarmed(),
            ai: None,
            formation: None,
        }
    }

    pub fn with_weapon(mut self, weapon: WeaponConfig) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn with_ai(mut self, config: AiConfig) -> Self {
        self.ai = Some(AiSpec {
            config,
            patrol: None,
        });
        self
    }

    pub fn with_patrol(mut self, config: AiConfig, path: PatrolPath) -> Self {
        self.ai = Some(AiSpec {
            config,
            patrol: Some(path),
        });
        self
    }

    pub fn with_formation(mut self, config: FormationConfig) -> Self {
        self.formation = Some(config);
        self
    }
}

/// Persistence record for one agent: health points and position only.
/// Action-in-progress state is deliberately not captured.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentRecord {
    pub name: String,
    pub position: Vec3,
    pub health_points: i32,
}

/// A live agent: identity, faction, transform, and its capability set.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub clan: ClanId,
    pub pos: Vec3,
    pub heading: f32,
    pub health: Health,
    pub sheet: StatSheet,
    pub snapshot: StatSnapshot,
    pub scheduler: ActionScheduler,
    pub mover: Mover,
    pub fighter: Fighter,
    pub ai: Option<AiController>,
    pub formation: Option<Formation>,
    /// Post-death grace timer; the agent is freed when it runs out.
    pub despawn_in: Option<f32>,
}

impl Agent {
    /// Stops the behavior that owned a displaced action slot. Behaviors
    /// reset their own state only; the scheduler slot has already been
    /// handed over, so no cancellation can recurse back into it.
    pub(crate) fn cancel_behavior(&mut self, displaced: ActionType) {
        match displaced {
            ActionType::Attack => {
                self.fighter.cancel();
                self.mover.cancel();
            }
            ActionType::Move => self.mover.cancel(),
            ActionType::Stop | ActionType::None => {}
        }
    }

    /// Advances an active move. Arrival while a Move action owns the
    /// slot is reported so the world can clear it.
    pub(crate) fn tick_movement(&mut self, tuning: &Tuning, dt: f32) -> MoveProgress {
        self.mover.advance(
            &mut self.pos,
            &mut self.heading,
            tuning.max_speed,
            tuning.arrival_tolerance,
            dt,
        )
    }

    /// Persistence capture: health points and world position only.
    pub fn capture(&self) -> AgentRecord {
        AgentRecord {
            name: self.name.clone(),
            position: self.pos,
            health_points: self.health.points(),
        }
    }
}
