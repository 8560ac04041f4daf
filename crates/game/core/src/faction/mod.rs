//! Clan membership, alignment, and hostility rules.
//!
//! Hostility is decided by alignment, not clan identity: two clans are
//! enemies when their alignments differ, or when either has gone Rogue. A
//! clan goes Rogue (permanently hostile to everyone, former allies
//! included) the moment one of its members strikes an ally. That
//! promotion funnels through [`FactionRegistry::evaluate_attack`], the
//! single authority for the transition.

use std::collections::BTreeMap;

use crate::world::AgentId;

/// Hostility class of a clan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    Lawful,
    Rebel,
    Rogue,
}

/// Handle into the registry's clan table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClanId(pub u32);

#[derive(Clone, Debug)]
struct Clan {
    name: String,
    alignment: Alignment,
}

/// Whether two alignments are at war. Rogue is hostile to everything,
/// itself included.
fn alignments_hostile(a: Alignment, b: Alignment) -> bool {
    a != b || a == Alignment::Rogue
}

/// Set membership of agents by clan, and the alignment table.
///
/// The registry is the only cross-agent shared mutable state in the core;
/// every mutation bumps a generation counter so AI loops can refresh their
/// cached enemy/ally lists lazily instead of re-querying each tick.
#[derive(Clone, Debug, Default)]
pub struct FactionRegistry {
    clans: Vec<Clan>,
    members: BTreeMap<AgentId, ClanId>,
    generation: u64,
}

impl FactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a clan and returns its handle. Clan names are labels, not
    /// keys; declaring twice yields two distinct clans.
    pub fn declare_clan(&mut self, name: impl Into<String>, alignment: Alignment) -> ClanId {
        let id = ClanId(self.clans.len() as u32);
        self.clans.push(Clan {
            name: name.into(),
            alignment,
        });
        self.bump();
        id
    }

    pub fn clan_name(&self, clan: ClanId) -> &str {
        &self.clans[clan.0 as usize].name
    }

    pub fn alignment(&self, clan: ClanId) -> Alignment {
        self.clans[clan.0 as usize].alignment
    }

    /// Monotonic counter bumped on every mutation; cache key for
    /// dependent enemy/ally lists.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn register(&mut self, agent: AgentId, clan: ClanId) {
        self.members.insert(agent, clan);
        self.bump();
    }

    /// Removes an agent from all combat-eligible sets (death, despawn).
    pub fn remove(&mut self, agent: AgentId) {
        if self.members.remove(&agent).is_some() {
            self.bump();
        }
    }

    pub fn change_clan(&mut self, agent: AgentId, clan: ClanId) {
        self.members.insert(agent, clan);
        self.bump();
    }

    pub fn clan_of(&self, agent: AgentId) -> Option<ClanId> {
        self.members.get(&agent).copied()
    }

    /// Whether members of `a` may attack members of `b`.
    pub fn are_hostile(&self, a: ClanId, b: ClanId) -> bool {
        alignments_hostile(self.alignment(a), self.alignment(b))
    }

    /// All registered agents hostile to `agent`, excluding itself.
    pub fn enemies_of(&self, agent: AgentId) -> Vec<AgentId> {
        let Some(own) = self.clan_of(agent) else {
            return Vec::new();
        };
        self.members
            .iter()
            .filter(|(id, clan)| **id != agent && self.are_hostile(own, **clan))
            .map(|(id, _)| *id)
            .collect()
    }

    /// All registered agents allied with `agent`, excluding itself.
    pub fn allies_of(&self, agent: AgentId) -> Vec<AgentId> {
        let Some(own) = self.clan_of(agent) else {
            return Vec::new();
        };
        self.members
            .iter()
            .filter(|(id, clan)| **id != agent && !self.are_hostile(own, **clan))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Friendly-fire gate, run before damage is applied.
    ///
    /// If aggressor and receiver share a non-Rogue alignment the
    /// aggressor's clan is promoted to Rogue. Returns the promoted clan
    /// once; re-evaluating an already-Rogue aggressor is a no-op.
    pub fn evaluate_attack(&mut self, aggressor: ClanId, receiver: ClanId) -> Option<ClanId> {
        let a = self.alignment(aggressor);
        if a == Alignment::Rogue || a != self.alignment(receiver) {
            return None;
        }
        self.clans[aggressor.0 as usize].alignment = Alignment::Rogue;
        self.bump();
        Some(aggressor)
    }

    fn bump(&mut self) {
        self.generation += 1;
    }
}
