//! The AI behavior loop.
//!
//! A reactive decision cycle ticked at a fixed reaction interval, not
//! every frame. Each evaluation walks the same ladder: validate the held
//! target, acquire a new one from the faction registry, adopt an ally's
//! target, then dispatch: attack, stand suspicious, or head back to
//! post. Being struck is the one event-driven path: it may switch the
//! target between evaluations.
//!
//! The loop never outranks the scheduler: an in-flight player or leader
//! action suppresses reconsideration entirely; the loop's own actions run
//! at [`priority::AI`] and may preempt each other.

use glam::Vec3;

use crate::config::priority;
use crate::action::ActionType;
use crate::env::Env;
use crate::world::{AgentId, World};

use super::patrol::{PatrolPath, PatrolState};

/// Per-agent AI tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    /// Enemies beyond this distance are invisible to acquisition.
    pub sight_range: f32,
    /// Leash: a chased target past this distance is dropped (and
    /// remembered as lost).
    pub chase_distance: f32,
    /// Seconds after losing contact during which the agent stands alert
    /// instead of returning to post.
    pub suspicion_time: f32,
    /// Seconds between decision cycles.
    pub reaction_interval: f32,
    /// Speed fraction for patrol and return-to-post movement.
    pub patrol_speed_fraction: f32,
    /// Arrival tolerance for waypoints.
    pub waypoint_tolerance: f32,
    /// Seconds to linger at each waypoint before cycling.
    pub waypoint_dwell: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            sight_range: 8.0,
            chase_distance: 12.0,
            suspicion_time: 5.0,
            reaction_interval: 0.25,
            patrol_speed_fraction: 0.2,
            waypoint_tolerance: 1.0,
            waypoint_dwell: 4.0,
        }
    }
}

/// Current behavior of the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum AiState {
    /// Engaged on a target.
    Attacking,
    /// Lost contact recently; standing and watching.
    Suspicious,
    /// Walking back to post / patrolling.
    #[default]
    Returning,
}

/// What the agent does when there is nothing to fight. The guard
/// variant cycles an authored waypoint loop instead of holding a single
/// post.
#[derive(Clone, Debug)]
enum IdleRoutine {
    HoldPost,
    Patrol(PatrolState),
}

/// AI behavior loop state for one non-player agent.
#[derive(Clone, Debug)]
pub struct AiController {
    config: AiConfig,
    state: AiState,
    target: Option<AgentId>,
    /// Target dropped for distance, eligible for re-acquisition while
    /// the suspicion window lasts.
    lost_target: Option<AgentId>,
    time_since_contact: f32,
    since_eval: f32,
    guard_position: Vec3,
    leader: Option<AgentId>,
    routine: IdleRoutine,
    cached_enemies: Vec<AgentId>,
    cached_allies: Vec<AgentId>,
    cache_generation: Option<u64>,
}

impl AiController {
    pub fn new(config: AiConfig, guard_position: Vec3) -> Self {
        Self {
            config,
            state: AiState::Returning,
            target: None,
            lost_target: None,
            time_since_contact: f32::INFINITY,
            since_eval: 0.0,
            guard_position,
            leader: None,
            routine: IdleRoutine::HoldPost,
            cached_enemies: Vec::new(),
            cached_allies: Vec::new(),
            cache_generation: None,
        }
    }

    /// Guard specialization: patrol a waypoint loop instead of holding
    /// the spawn post.
    pub fn with_patrol(mut self, path: PatrolPath) -> Self {
        self.routine = IdleRoutine::Patrol(PatrolState::new(path));
        self
    }

    pub fn set_leader(&mut self, leader: Option<AgentId>) {
        self.leader = leader;
    }

    pub fn leader(&self) -> Option<AgentId> {
        self.leader
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn target(&self) -> Option<AgentId> {
        self.target
    }

    pub fn guard_position(&self) -> Vec3 {
        self.guard_position
    }

    /// Reassigns the post (formation slot assignment).
    pub fn set_guard_position(&mut self, position: Vec3) {
        self.guard_position = position;
    }

    /// Reactive retarget on being struck, the only event-driven
    /// transition. Switches to the aggressor when it is closer than the
    /// current target (or there is none). Returns whether it switched.
    pub fn consider_aggressor(
        &mut self,
        aggressor: AgentId,
        aggressor_distance: f32,
        current_target_distance: Option<f32>,
    ) -> bool {
        if Some(aggressor) == self.target {
            return false;
        }
        let closer = current_target_distance.is_none_or(|d| aggressor_distance < d);
        if closer {
            self.target = Some(aggressor);
            self.time_since_contact = 0.0;
            self.state = AiState::Attacking;
        }
        closer
    }

    /// Advances the loop. Runs a decision cycle once per reaction
    /// interval; between cycles only the clock moves.
    pub(crate) fn tick(&mut self, owner: AgentId, world: &mut World, env: &Env<'_>, dt: f32) {
        self.since_eval += dt;
        if self.since_eval < self.config.reaction_interval {
            return;
        }
        let elapsed = self.since_eval;
        self.since_eval = 0.0;
        self.time_since_contact += elapsed;

        let Some(agent) = world.agent(owner) else {
            return;
        };
        if agent.health.is_dead() || agent.scheduler.is_frozen() {
            return;
        }
        // Never reconsider over an in-flight higher-priority action.
        if agent.scheduler.current_priority() > priority::AI {
            return;
        }
        let own_pos = agent.pos;

        self.validate_target(owner, own_pos, world);
        if self.target.is_none() {
            self.refresh_caches(owner, world);
            self.acquire_target(own_pos, world);
        }
        if self.target.is_none() {
            self.assist_allies(own_pos, world);
        }
        self.dispatch(owner, own_pos, world, env, elapsed);
    }

    /// Step 1: drop a target that is no longer attackable or has pulled
    /// past the chase leash.
    fn validate_target(&mut self, owner: AgentId, own_pos: Vec3, world: &mut World) {
        let Some(target) = self.target else {
            return;
        };

        let verdict = world.agent(target).map(|t| {
            let hostile = world.hostile(owner, target);
            (t.health.is_dead(), hostile, own_pos.distance(t.pos))
        });

        match verdict {
            None | Some((true, _, _)) | Some((_, false, _)) => {
                self.drop_target(owner, world, None);
            }
            Some((false, true, distance)) if distance > self.config.chase_distance => {
                self.drop_target(owner, world, Some(target));
            }
            _ => {}
        }
    }

    fn drop_target(&mut self, owner: AgentId, world: &mut World, lost: Option<AgentId>) {
        self.target = None;
        self.lost_target = lost;
        // The attack this loop issued is now pointless; free the slot so
        // the rest of the cycle can redispatch.
        if world
            .agent(owner)
            .is_some_and(|a| a.scheduler.current() == ActionType::Attack)
        {
            world.cancel_current_action(owner);
        }
    }

    /// Step 2: nearest living enemy inside sight range.
    fn acquire_target(&mut self, own_pos: Vec3, world: &World) {
        let mut best: Option<(f32, AgentId)> = None;
        for id in &self.cached_enemies {
            let Some(enemy) = world.agent(*id) else {
                continue;
            };
            if enemy.health.is_dead() {
                continue;
            }
            let distance = own_pos.distance(enemy.pos);
            if distance > self.config.sight_range {
                continue;
            }
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, *id));
            }
        }
        if let Some((_, id)) = best {
            self.target = Some(id);
            self.time_since_contact = 0.0;
        }
    }

    /// Step 3: adopt the nearest sighted ally's target (pack aggro).
    /// The own leader is excluded; orders flow the other way.
    fn assist_allies(&mut self, own_pos: Vec3, world: &World) {
        let mut best: Option<(f32, AgentId)> = None;
        for id in &self.cached_allies {
            if Some(*id) == self.leader {
                continue;
            }
            let Some(ally) = world.agent(*id) else {
                continue;
            };
            let distance = own_pos.distance(ally.pos);
            if distance > self.config.sight_range {
                continue;
            }
            let adopted = ally
                .fighter
                .target()
                .or_else(|| ally.ai.as_ref().and_then(AiController::target));
            let Some(adopted) = adopted else {
                continue;
            };
            if world.agent(adopted).is_none_or(|t| t.health.is_dead()) {
                continue;
            }
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, adopted));
            }
        }
        if let Some((_, id)) = best {
            self.target = Some(id);
            self.time_since_contact = 0.0;
        }
    }

    /// Step 4: issue this cycle's action request.
    fn dispatch(
        &mut self,
        owner: AgentId,
        own_pos: Vec3,
        world: &mut World,
        env: &Env<'_>,
        elapsed: f32,
    ) {
        if let Some(target) = self.target {
            self.state = AiState::Attacking;
            self.time_since_contact = 0.0;

            let already_engaged = world.agent(owner).is_some_and(|a| {
                a.scheduler.current() == ActionType::Attack && a.fighter.target() == Some(target)
            });
            if !already_engaged && !world.start_attack_action(owner, target, priority::AI) {
                self.target = None;
            }
            return;
        }

        if self.time_since_contact <= self.config.suspicion_time {
            self.state = AiState::Suspicious;

            // Opportunistic re-acquisition of a target lost to distance.
            if let Some(lost) = self.lost_target {
                let back_in_reach = world.agent(lost).is_some_and(|t| {
                    !t.health.is_dead() && own_pos.distance(t.pos) <= self.config.chase_distance
                });
                if back_in_reach {
                    self.lost_target = None;
                    self.target = Some(lost);
                    self.dispatch(owner, own_pos, world, env, elapsed);
                    return;
                }
            }

            let standing = world
                .agent(owner)
                .is_some_and(|a| a.scheduler.current() == ActionType::Stop);
            if !standing {
                world.start_stop_action(owner, priority::AI);
            }
            return;
        }

        self.state = AiState::Returning;
        self.lost_target = None;
        let destination = match &mut self.routine {
            IdleRoutine::HoldPost => Some(self.guard_position),
            IdleRoutine::Patrol(patrol) => patrol.next_order(
                own_pos,
                self.config.waypoint_tolerance,
                self.config.waypoint_dwell,
                elapsed,
            ),
        };
        let Some(destination) = destination else {
            return;
        };

        let already_heading = world.agent(owner).is_some_and(|a| {
            a.scheduler.current() == ActionType::Move
                && a.mover
                    .destination()
                    .is_some_and(|d| d.distance(destination) < 0.1)
        });
        if !already_heading && own_pos.distance(destination) > self.config.waypoint_tolerance {
            world.start_move_action(
                owner,
                destination,
                self.config.patrol_speed_fraction,
                priority::AI,
                env,
            );
        }
    }

    fn refresh_caches(&mut self, owner: AgentId, world: &World) {
        let generation = world.registry().generation();
        if self.cache_generation == Some(generation) {
            return;
        }
        self.cached_enemies = world.registry().enemies_of(owner);
        self.cached_allies = world.registry().allies_of(owner);
        self.cache_generation = Some(generation);
    }
}
