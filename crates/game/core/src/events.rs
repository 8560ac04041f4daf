//! Discrete events emitted by the core.
//!
//! The world buffers events during a tick; the embedding layer drains the
//! buffer and fans out to whatever subscribes (presentation, logging,
//! tests). The core never depends on anyone consuming them.

use crate::combat::AttackReport;
use crate::action::ActionType;
use crate::faction::ClanId;
use crate::world::AgentId;

/// One observable occurrence inside the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    /// An action request was accepted and became active.
    ActionStarted { agent: AgentId, action: ActionType },
    /// The active action slot was cleared back to idle.
    ActionFinished { agent: AgentId },
    /// Health points changed (damage or level-up rescale).
    HealthChanged {
        agent: AgentId,
        points: i32,
        max_points: i32,
    },
    /// One attack attempt resolved against `target`.
    Attack {
        target: AgentId,
        report: AttackReport,
    },
    /// A clan struck its own allies and turned Rogue.
    ClanWentRogue { clan: ClanId },
    /// The agent's health reached zero.
    Died { agent: AgentId },
    /// Experience crossed a level threshold.
    LeveledUp { agent: AgentId, level: u32 },
    /// The post-death grace period expired; the agent is gone.
    Despawned { agent: AgentId },
}
