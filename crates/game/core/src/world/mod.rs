//! The world: agent store, tick pipeline, and cross-component glue.
//!
//! Everything advances on one logical timeline through [`World::tick`]:
//! AI loops, leader orders, attack loops, movement, projectiles, despawn
//! timers, in that fixed order. There are no threads and no interior
//! mutability; the faction registry is the only cross-agent shared state
//! and every mutation of it completes synchronously within the calling
//! tick.

mod agent;

pub use agent::{Agent, AgentId, AgentRecord, AgentSpec, AiSpec, Health};

use glam::Vec3;

use crate::action::{ActionScheduler, ActionType, Verdict};
use crate::ai::{AiController, Formation};
use crate::combat::{
    AttackPayload, AttackReport, AttackResult, Fighter, FighterStep, Projectile, ProjectileStep,
    Rolls, TargetView, WeaponConfig, resolve_damage,
};
use crate::config::{Tuning, priority};
use crate::env::{Env, compute_seed, roll};
use crate::events::GameEvent;
use crate::faction::{Alignment, ClanId, FactionRegistry};
use crate::movement::{MoveProgress, Mover};
use crate::stats::{Progression, StatSnapshot};

/// An abstract intent from a command source (player input, scripted
/// scenario). The scheduler does not care who issued it beyond the
/// attached priority.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Attack(AgentId),
    MoveTo(Vec3),
    Stop,
}

/// The simulation: agents, factions, projectiles, and the event buffer.
pub struct World {
    seed: u64,
    clock: f32,
    nonce: u64,
    tuning: Tuning,
    progression: Progression,
    registry: FactionRegistry,
    agents: Vec<Agent>,
    next_agent: u32,
    projectiles: Vec<Projectile>,
    next_projectile: u32,
    events: Vec<GameEvent>,
}

impl World {
    pub fn new(seed: u64, tuning: Tuning, progression: Progression) -> Self {
        Self {
            seed,
            clock: 0.0,
            nonce: 0,
            tuning,
            progression,
            registry: FactionRegistry::new(),
            agents: Vec::new(),
            next_agent: 0,
            projectiles: Vec::new(),
            next_projectile: 0,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn registry(&self) -> &FactionRegistry {
        &self.registry
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn agent_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Drains the events buffered since the last drain. The buffer is
    /// the presentation boundary; the core does not care whether anyone
    /// consumes it.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Factions
    // ------------------------------------------------------------------

    pub fn declare_clan(&mut self, name: impl Into<String>, alignment: Alignment) -> ClanId {
        self.registry.declare_clan(name, alignment)
    }

    /// Whether the two agents' clans are at war.
    pub fn hostile(&self, a: AgentId, b: AgentId) -> bool {
        match (self.agent(a), self.agent(b)) {
            (Some(x), Some(y)) => self.registry.are_hostile(x.clan, y.clan),
            _ => false,
        }
    }

    /// Moves an agent to another clan, keeping the registry and the
    /// agent's own record in sync.
    pub fn change_clan(&mut self, id: AgentId, clan: ClanId) {
        let Some(a) = self.agent_mut(id) else {
            return;
        };
        a.clan = clan;
        let dead = a.health.is_dead();
        if !dead {
            self.registry.change_clan(id, clan);
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Activates an agent: resolves the stat snapshot from the
    /// progression tables plus weapon modifiers, registers the clan
    /// membership, and installs the capability set.
    pub fn spawn(&mut self, spec: AgentSpec) -> AgentId {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;

        let sheet = crate::stats::StatSheet::new(spec.class, spec.level);
        let modifiers = spec.weapon.modifiers();
        let snapshot =
            StatSnapshot::resolve(&self.progression, spec.class, sheet.level(), &modifiers);

        let ai = spec.ai.map(|s| {
            let controller = AiController::new(s.config, spec.position);
            match s.patrol {
                Some(path) => controller.with_patrol(path),
                None => controller,
            }
        });

        self.registry.register(id, spec.clan);
        self.agents.push(Agent {
            id,
            name: spec.name,
            clan: spec.clan,
            pos: spec.position,
            heading: spec.heading,
            health: Health::new(snapshot.max_health),
            sheet,
            snapshot,
            scheduler: ActionScheduler::new(),
            mover: Mover::new(),
            fighter: Fighter::new(spec.weapon),
            ai,
            formation: spec.formation.map(Formation::new),
            despawn_in: None,
        });
        id
    }

    /// Wires a follower under a leader: the leader's formation gains the
    /// follower, the follower's AI recognizes the leader.
    pub fn assign_follower(&mut self, leader: AgentId, follower: AgentId) {
        if leader == follower {
            return;
        }
        if let Some(l) = self.agent_mut(leader)
            && let Some(formation) = l.formation.as_mut()
        {
            formation.add_follower(follower);
        }
        if let Some(f) = self.agent_mut(follower)
            && let Some(ai) = f.ai.as_mut()
        {
            ai.set_leader(Some(leader));
        }
    }

    /// Toggles leader control. Releasing control cancels every
    /// follower's current orders so they return to independent behavior.
    pub fn set_commanding(&mut self, leader: AgentId, commanding: bool) {
        let followers = match self.agent_mut(leader).and_then(|l| l.formation.as_mut()) {
            Some(formation) => {
                formation.set_commanding(commanding);
                formation.followers().to_vec()
            }
            None => return,
        };
        if !commanding {
            for follower in followers {
                self.cancel_current_action(follower);
            }
        }
    }

    /// Instantaneous relocation (respawn, restore). Drops any path.
    pub fn warp(&mut self, id: AgentId, position: Vec3) {
        if let Some(a) = self.agent_mut(id) {
            a.pos = position;
            a.mover.cancel();
        }
    }

    /// Swaps the equipped weapon and re-resolves the stat snapshot.
    pub fn equip(&mut self, id: AgentId, weapon: WeaponConfig) {
        if let Some(a) = self.agent_mut(id) {
            a.fighter.equip(weapon);
        }
        self.refresh_snapshot(id);
    }

    // ------------------------------------------------------------------
    // Command source boundary
    // ------------------------------------------------------------------

    /// Applies one intent at the given priority. Returns whether it was
    /// accepted; a denied command silently leaves the prior action
    /// running.
    pub fn command(
        &mut self,
        agent: AgentId,
        command: Command,
        request_priority: i32,
        env: &Env<'_>,
    ) -> bool {
        match command {
            Command::Attack(target) => self.start_attack_action(agent, target, request_priority),
            Command::MoveTo(point) => {
                self.start_move_action(agent, point, 1.0, request_priority, env)
            }
            Command::Stop => self.start_stop_action(agent, request_priority),
        }
    }

    // ------------------------------------------------------------------
    // Action glue
    // ------------------------------------------------------------------

    /// Gate for attack requests: both parties exist and live, no
    /// self-target, and the attacker is not frozen. Hostility is *not*
    /// part of the gate; a deliberate ally attack is what triggers the
    /// friendly-fire promotion.
    pub fn can_attack(&self, attacker: AgentId, target: AgentId) -> bool {
        if attacker == target {
            return false;
        }
        let (Some(a), Some(t)) = (self.agent(attacker), self.agent(target)) else {
            return false;
        };
        !a.health.is_dead() && !a.scheduler.is_frozen() && !t.health.is_dead()
    }

    pub fn start_attack_action(
        &mut self,
        agent: AgentId,
        target: AgentId,
        request_priority: i32,
    ) -> bool {
        if !self.can_attack(agent, target) {
            return false;
        }
        let free_fire = !self.hostile(agent, target);
        let accepted = {
            let Some(a) = self.agent_mut(agent) else {
                return false;
            };
            match a.scheduler.request(ActionType::Attack, request_priority) {
                Verdict::Rejected => false,
                Verdict::Accepted { displaced } => {
                    if let Some(d) = displaced {
                        a.cancel_behavior(d);
                    }
                    a.fighter.engage(target, free_fire);
                    true
                }
            }
        };
        if accepted {
            self.events.push(GameEvent::ActionStarted {
                agent,
                action: ActionType::Attack,
            });
        }
        accepted
    }

    pub fn start_move_action(
        &mut self,
        agent: AgentId,
        destination: Vec3,
        speed_fraction: f32,
        request_priority: i32,
        env: &Env<'_>,
    ) -> bool {
        let Some(a) = self.agent(agent) else {
            return false;
        };
        if a.health.is_dead() || !a.scheduler.would_accept(request_priority) {
            return false;
        }
        // Plan before committing the slot: a failed plan is "cannot
        // move" and must leave the prior action running.
        let Some(path) = env.path().plan(a.pos, destination) else {
            return false;
        };

        let accepted = {
            let Some(a) = self.agent_mut(agent) else {
                return false;
            };
            match a.scheduler.request(ActionType::Move, request_priority) {
                Verdict::Rejected => false,
                Verdict::Accepted { displaced } => {
                    if let Some(d) = displaced {
                        a.cancel_behavior(d);
                    }
                    a.mover.adopt(path, speed_fraction);
                    true
                }
            }
        };
        if accepted {
            self.events.push(GameEvent::ActionStarted {
                agent,
                action: ActionType::Move,
            });
        }
        accepted
    }

    /// Stand and hold: cancels movement and occupies the slot.
    pub fn start_stop_action(&mut self, agent: AgentId, request_priority: i32) -> bool {
        let accepted = {
            let Some(a) = self.agent_mut(agent) else {
                return false;
            };
            if a.health.is_dead() {
                return false;
            }
            match a.scheduler.request(ActionType::Stop, request_priority) {
                Verdict::Rejected => false,
                Verdict::Accepted { displaced } => {
                    if let Some(d) = displaced {
                        a.cancel_behavior(d);
                    }
                    a.mover.cancel();
                    true
                }
            }
        };
        if accepted {
            self.events.push(GameEvent::ActionStarted {
                agent,
                action: ActionType::Stop,
            });
        }
        accepted
    }

    /// Unconditionally clears the agent's slot back to idle and fires
    /// the finished notification exactly once.
    pub fn cancel_current_action(&mut self, agent: AgentId) {
        let Some(a) = self.agent_mut(agent) else {
            return;
        };
        if let Some(displaced) = a.scheduler.clear() {
            a.cancel_behavior(displaced);
        }
        self.events.push(GameEvent::ActionFinished { agent });
    }

    // ------------------------------------------------------------------
    // Combat resolution
    // ------------------------------------------------------------------

    /// Composes a payload from the attacker's equipped weapon and
    /// resolves it immediately (the melee effect instant).
    pub fn strike(&mut self, attacker: AgentId, target: AgentId, env: &Env<'_>) -> AttackReport {
        let Some(a) = self.agent(attacker) else {
            return AttackReport::none(attacker);
        };
        let payload = AttackPayload::compose(attacker, a.clan, &a.snapshot, a.fighter.weapon());
        self.resolve_attack(payload, target, env)
    }

    /// Resolves one attack attempt against `target`, applying every step
    /// of the pipeline: dead-target guard, friendly-fire
    /// reclassification, hit/crit/mitigation rolls, health application,
    /// death transition, and experience grant. The returned report is
    /// also pushed to the event buffer.
    pub fn resolve_attack(
        &mut self,
        payload: AttackPayload,
        target: AgentId,
        env: &Env<'_>,
    ) -> AttackReport {
        // A target killed earlier in the same tick is a silent no-op.
        let Some(t) = self.agent(target) else {
            return AttackReport::none(payload.instigator);
        };
        if t.health.is_dead() {
            return AttackReport::none(payload.instigator);
        }
        let target_clan = t.clan;
        let target_snapshot = t.snapshot;

        // Reclassify before damage so a friendly kill still flags
        // hostility.
        if let Some(clan) = self
            .registry
            .evaluate_attack(payload.instigator_clan, target_clan)
        {
            self.events.push(GameEvent::ClanWentRogue { clan });
        }

        let nonce = self.next_nonce();
        let rolls = Rolls {
            hit: env
                .rng()
                .unit(compute_seed(self.seed, nonce, target.0, roll::HIT)),
            crit: env
                .rng()
                .unit(compute_seed(self.seed, nonce, target.0, roll::CRIT)),
        };
        let (result, damage) = resolve_damage(&payload, &target_snapshot, rolls, &self.tuning);

        let mut report = AttackReport {
            result,
            damage_dealt: damage,
            instigator: payload.instigator,
        };

        if result != AttackResult::Miss {
            let Some((points, max_points)) = self.agent_mut(target).map(|a| {
                a.health.apply_damage(damage);
                (a.health.points(), a.health.max_points())
            }) else {
                return report;
            };
            self.events.push(GameEvent::HealthChanged {
                agent: target,
                points,
                max_points,
            });

            let downed = self.agent(target).is_some_and(|a| a.health.is_down());
            if downed {
                self.kill(target);
                report.result = AttackResult::TargetDown;

                let reward = self
                    .agent(target)
                    .map(|a| self.progression.reward_xp(a.sheet.level()))
                    .unwrap_or(0);
                self.grant_experience(payload.instigator, reward);
            }
        }

        self.events.push(GameEvent::Attack { target, report });
        self.notify_attacked(target, payload.instigator);
        report
    }

    /// Death transition: mark dead, freeze the scheduler, leave the
    /// combat-eligible sets, start the despawn grace timer.
    fn kill(&mut self, id: AgentId) {
        let grace = self.tuning.despawn_grace;
        let Some(a) = self.agent_mut(id) else {
            return;
        };
        a.health.mark_dead();
        if let Some(displaced) = a.scheduler.freeze() {
            a.cancel_behavior(displaced);
        }
        a.despawn_in = Some(grace);
        self.registry.remove(id);
        self.events.push(GameEvent::ActionFinished { agent: id });
        self.events.push(GameEvent::Died { agent: id });
    }

    /// Reactive retarget: lets a struck AI immediately switch to a
    /// closer aggressor, independent of its periodic cycle.
    fn notify_attacked(&mut self, victim: AgentId, aggressor: AgentId) {
        let Some(v) = self.agent(victim) else {
            return;
        };
        if v.health.is_dead() || v.ai.is_none() {
            return;
        }
        let own_pos = v.pos;
        let current = v.ai.as_ref().and_then(AiController::target);

        let Some(a) = self.agent(aggressor) else {
            return;
        };
        if a.health.is_dead() {
            return;
        }
        let aggressor_distance = own_pos.distance(a.pos);
        let current_distance = current
            .and_then(|t| self.agent(t))
            .map(|t| own_pos.distance(t.pos));

        let switched = self
            .agent_mut(victim)
            .and_then(|v| v.ai.as_mut())
            .is_some_and(|ai| ai.consider_aggressor(aggressor, aggressor_distance, current_distance));
        if switched {
            self.start_attack_action(victim, aggressor, priority::AI);
        }
    }

    fn grant_experience(&mut self, id: AgentId, amount: i32) {
        let leveled = {
            let Self {
                agents,
                progression,
                ..
            } = self;
            let Some(a) = agents.iter_mut().find(|a| a.id == id) else {
                return;
            };
            a.sheet.gain_experience(progression, amount)
        };
        if let Some(level) = leveled {
            self.events.push(GameEvent::LeveledUp { agent: id, level });
            self.refresh_snapshot(id);
        }
    }

    /// Re-resolves the stat snapshot (level-up, weapon change) and
    /// rescales health to a changed maximum, preserving the fraction.
    fn refresh_snapshot(&mut self, id: AgentId) {
        let Self {
            agents,
            progression,
            events,
            ..
        } = self;
        let Some(a) = agents.iter_mut().find(|a| a.id == id) else {
            return;
        };
        let modifiers = a.fighter.weapon().modifiers();
        let snapshot = StatSnapshot::resolve(progression, a.sheet.class, a.sheet.level(), &modifiers);
        if snapshot.max_health != a.snapshot.max_health && !a.health.is_dead() {
            a.health.rescale(snapshot.max_health);
            events.push(GameEvent::HealthChanged {
                agent: a.id,
                points: a.health.points(),
                max_points: a.health.max_points(),
            });
        }
        a.snapshot = snapshot;
    }

    // ------------------------------------------------------------------
    // Tick pipeline
    // ------------------------------------------------------------------

    /// Advances the whole world by `dt` seconds.
    pub fn tick(&mut self, dt: f32, env: &Env<'_>) {
        self.clock += dt;
        let ids: Vec<AgentId> = self.agents.iter().map(|a| a.id).collect();

        // AI decision loops. Controllers are temporarily lifted out of
        // their agents so they can freely inspect and command the world.
        for id in &ids {
            let Some(mut ai) = self.agent_mut(*id).and_then(|a| a.ai.take()) else {
                continue;
            };
            ai.tick(*id, self, env, dt);
            if let Some(a) = self.agent_mut(*id) {
                a.ai = Some(ai);
            }
        }

        self.tick_formations(env);

        for id in &ids {
            self.tick_fighter(*id, env, dt);
        }

        self.tick_movement(&ids, dt);
        self.tick_projectiles(env, dt);
        self.tick_despawns(dt);
    }

    /// Leader order propagation: attacking leaders put their followers
    /// on the same target; moving leaders keep followers in formation
    /// slots (which also become their new guard posts).
    fn tick_formations(&mut self, env: &Env<'_>) {
        let leaders: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|a| {
                !a.health.is_dead() && a.formation.as_ref().is_some_and(Formation::is_commanding)
            })
            .map(|a| a.id)
            .collect();

        for leader in leaders {
            let Some(l) = self.agent(leader) else {
                continue;
            };
            match l.scheduler.current() {
                ActionType::Attack => {
                    let Some(target) = l.fighter.target() else {
                        continue;
                    };
                    let followers = l
                        .formation
                        .as_ref()
                        .map(|f| f.followers().to_vec())
                        .unwrap_or_default();
                    for follower in followers {
                        let engaged = self.agent(follower).is_some_and(|a| {
                            a.scheduler.current() == ActionType::Attack
                                && a.fighter.target() == Some(target)
                        });
                        if !engaged {
                            self.start_attack_action(follower, target, priority::LEADER);
                        }
                    }
                }
                ActionType::Move => {
                    let anchor = l.pos;
                    let heading = l.heading;
                    let plan = l.formation.as_ref().and_then(|f| {
                        f.needs_refresh(anchor, 1.0)
                            .then(|| (f.followers().to_vec(), f.slots(anchor, heading)))
                    });
                    let Some((followers, slots)) = plan else {
                        continue;
                    };
                    if let Some(f) = self
                        .agent_mut(leader)
                        .and_then(|a| a.formation.as_mut())
                    {
                        f.mark_refreshed(anchor);
                    }
                    for (follower, slot) in followers.into_iter().zip(slots) {
                        self.start_move_action(follower, slot, 1.0, priority::LEADER, env);
                        if let Some(fa) = self.agent_mut(follower)
                            && let Some(ai) = fa.ai.as_mut()
                        {
                            ai.set_guard_position(slot);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// One step of an agent's attack loop, while the Attack action owns
    /// its slot.
    fn tick_fighter(&mut self, id: AgentId, env: &Env<'_>, dt: f32) {
        let Some(a) = self.agent(id) else {
            return;
        };
        if a.health.is_dead() || a.scheduler.current() != ActionType::Attack {
            return;
        }
        let own_pos = a.pos;
        let target = a.fighter.target();
        let free_fire = a.fighter.free_fire();

        let view = target.and_then(|t| self.agent(t)).map(|t| TargetView {
            distance: own_pos.distance(t.pos),
            alive: !t.health.is_dead(),
            hostile: free_fire || target.is_some_and(|tid| self.hostile(id, tid)),
        });

        let comfortable = self.tuning.comfortable_range_fraction;
        let Some(step) = self
            .agent_mut(id)
            .map(|a| a.fighter.advance(view, comfortable, dt))
        else {
            return;
        };

        match step {
            FighterStep::Complete => self.cancel_current_action(id),
            FighterStep::Approach => {
                let Some(target_pos) = target.and_then(|t| self.agent(t)).map(|t| t.pos) else {
                    return;
                };
                let needs_plan = self.agent(id).is_some_and(|a| {
                    !a.mover.is_active()
                        || a.mover
                            .destination()
                            .is_none_or(|d| d.distance(target_pos) > 0.5)
                });
                if needs_plan
                    && let Some(path) = env.path().plan(own_pos, target_pos)
                    && let Some(a) = self.agent_mut(id)
                {
                    a.mover.adopt(path, 1.0);
                }
            }
            FighterStep::Hold { strike } => {
                let Some(target_id) = target else {
                    return;
                };
                let Some(target_pos) = self.agent(target_id).map(|t| t.pos) else {
                    return;
                };
                let turn_step = self.tuning.facing_turn_speed * dt;
                if let Some(a) = self.agent_mut(id) {
                    a.mover.cancel();
                    let dir = target_pos - a.pos;
                    if dir.length_squared() > 1e-6 {
                        let desired = dir.x.atan2(dir.z);
                        a.heading = rotate_toward(a.heading, desired, turn_step);
                    }
                }
                if strike {
                    self.fire_strike(id, target_id, env);
                }
            }
        }
    }

    /// The strike's effect instant: melee resolves immediately, ranged
    /// launches a projectile carrying the frozen payload. Either way the
    /// next cooldown is redrawn with jitter so agents sharing a weapon
    /// type do not synchronize their cadence.
    fn fire_strike(&mut self, attacker: AgentId, target: AgentId, env: &Env<'_>) {
        let Some(a) = self.agent(attacker) else {
            return;
        };
        let weapon = a.fighter.weapon().clone();
        let payload = AttackPayload::compose(attacker, a.clan, &a.snapshot, &weapon);
        let origin = a.pos;

        let nonce = self.next_nonce();
        let variance = self.tuning.cooldown_variance;
        let jitter = env.rng().range(
            compute_seed(self.seed, nonce, attacker.0, roll::COOLDOWN),
            1.0 - variance,
            1.0 + variance,
        );
        let next_cooldown = weapon.cooldown(&self.tuning) * jitter;

        match &weapon.projectile {
            None => {
                self.resolve_attack(payload, target, env);
            }
            Some(p) => {
                let Some(t) = self.agent(target) else {
                    return;
                };
                let target_pos = t.pos;
                let mut aim = target_pos;
                if p.lead_aim && !p.homing && t.mover.is_active() {
                    let velocity = Vec3::new(t.heading.sin(), 0.0, t.heading.cos())
                        * self.tuning.max_speed
                        * t.mover.speed_fraction();
                    let flight_time = origin.distance(target_pos) / p.speed;
                    aim += velocity * flight_time;
                }
                if p.spread > 0.0 {
                    let sx = env
                        .rng()
                        .unit(compute_seed(self.seed, nonce, attacker.0, roll::AIM_X))
                        - 0.5;
                    let sz = env
                        .rng()
                        .unit(compute_seed(self.seed, nonce, attacker.0, roll::AIM_Z))
                        - 0.5;
                    aim += Vec3::new(sx, 0.0, sz) * (2.0 * p.spread);
                }

                let pid = self.next_projectile;
                self.next_projectile += 1;
                self.projectiles.push(Projectile::new(
                    pid,
                    payload,
                    target,
                    origin,
                    aim,
                    p.speed,
                    p.homing,
                    self.tuning.projectile_lifetime,
                ));
            }
        }

        if let Some(a) = self.agent_mut(attacker) {
            a.fighter.strike_fired(next_cooldown);
        }
    }

    fn tick_movement(&mut self, ids: &[AgentId], dt: f32) {
        let tuning = self.tuning.clone();
        for id in ids {
            let outcome = self
                .agent_mut(*id)
                .map(|a| (a.tick_movement(&tuning, dt), a.scheduler.current()));
            if let Some((MoveProgress::Arrived, ActionType::Move)) = outcome {
                // Arrival completes the Move action; a mover running
                // under an Attack action is the fighter's business.
                self.cancel_current_action(*id);
            }
        }
    }

    fn tick_projectiles(&mut self, env: &Env<'_>, dt: f32) {
        let hit_radius = self.tuning.projectile_hit_radius;
        let mut in_flight = std::mem::take(&mut self.projectiles);
        let mut survivors = Vec::with_capacity(in_flight.len());

        for mut p in in_flight.drain(..) {
            let target_pos = self.agent(p.target).map(|t| t.pos);
            match p.advance(target_pos, hit_radius, dt) {
                ProjectileStep::Flying => survivors.push(p),
                ProjectileStep::Contact => {
                    self.resolve_attack(p.payload, p.target, env);
                }
                ProjectileStep::Expired => {}
            }
        }

        // Strikes resolved above never launch projectiles, but keep the
        // merge order deterministic anyway.
        survivors.append(&mut self.projectiles);
        self.projectiles = survivors;
    }

    /// Post-death grace: when the timer runs out the agent is freed and
    /// every reference to it (formations, leaders) is dropped.
    fn tick_despawns(&mut self, dt: f32) {
        let mut despawned = Vec::new();
        for a in &mut self.agents {
            if let Some(timer) = a.despawn_in.as_mut() {
                *timer -= dt;
                if *timer <= 0.0 {
                    despawned.push(a.id);
                }
            }
        }
        for id in despawned {
            self.registry.remove(id);
            self.agents.retain(|a| a.id != id);
            for a in &mut self.agents {
                if let Some(formation) = a.formation.as_mut() {
                    formation.remove_follower(id);
                }
                if let Some(ai) = a.ai.as_mut()
                    && ai.leader() == Some(id)
                {
                    ai.set_leader(None);
                }
            }
            self.events.push(GameEvent::Despawned { agent: id });
        }
    }

    // ------------------------------------------------------------------
    // Persistence boundary
    // ------------------------------------------------------------------

    /// Captures health points and positions. Action-in-progress state is
    /// deliberately not part of the records.
    pub fn capture(&self) -> Vec<AgentRecord> {
        self.agents.iter().map(Agent::capture).collect()
    }

    /// Restores captured records, matching agents by name. Every
    /// restored agent re-enters Idle; health below the death threshold
    /// re-runs the death transition (without experience grants).
    pub fn restore(&mut self, records: &[AgentRecord]) {
        for record in records {
            let Some(id) = self.agent_by_name(&record.name).map(|a| a.id) else {
                continue;
            };
            let (clan, dead) = {
                let Some(a) = self.agent_mut(id) else {
                    continue;
                };
                a.pos = record.position;
                a.scheduler = ActionScheduler::new();
                a.mover.cancel();
                a.fighter.cancel();
                a.despawn_in = None;
                a.health.restore(record.health_points);
                (a.clan, a.health.is_dead())
            };
            if dead {
                if let Some(a) = self.agent_mut(id) {
                    a.scheduler.freeze();
                }
                self.registry.remove(id);
                self.events.push(GameEvent::Died { agent: id });
            } else {
                self.registry.register(id, clan);
            }
            let Some(a) = self.agent(id) else { continue };
            self.events.push(GameEvent::HealthChanged {
                agent: id,
                points: a.health.points(),
                max_points: a.health.max_points(),
            });
        }
    }

    fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}

/// Rotates `current` toward `desired` by at most `max_step` radians,
/// taking the short way around.
fn rotate_toward(current: f32, desired: f32, max_step: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut delta = (desired - current) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    current + delta.clamp(-max_step.abs(), max_step.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiConfig;
    use crate::env::{PathOracle, PcgRng, PlannedPath};
    use crate::stats::{CharacterClass, ClassSpec, Stat, StatMultiplier};

    /// Straight-line planner used across the world tests.
    struct Line;
    impl PathOracle for Line {
        fn plan(&self, _from: Vec3, to: Vec3) -> Option<PlannedPath> {
            PlannedPath::new(vec![to])
        }
    }

    fn progression() -> Progression {
        Progression {
            stat_table: vec![10, 12, 14, 16],
            health_multiplier: 2.0,
            xp_reward_table: vec![5, 10, 20, 40],
            level_xp_table: vec![10, 30, 70],
            classes: vec![ClassSpec {
                class: CharacterClass::Soldier,
                multipliers: vec![StatMultiplier {
                    stat: Stat::Strength,
                    multiplier: 2.0,
                }],
            }],
        }
    }

    fn world() -> World {
        World::new(7, Tuning::new(), progression())
    }

    fn melee_payload(instigator: AgentId, clan: ClanId, damage: i32) -> AttackPayload {
        AttackPayload {
            instigator,
            instigator_clan: clan,
            kind: crate::combat::AttackKind::Melee,
            attack_points: 100,
            damage,
            // Overwhelming precision: the hit roll cannot miss a
            // zero-swiftness stock target.
            hit_precision: i32::MAX / 2,
            crit_strike: 0,
        }
    }

    #[test]
    fn overkill_floors_health_and_downs_the_target() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let attacker = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        let victim = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(1.0, 0.0, 0.0),
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        // Raw damage far above the victim's 20 max health; mitigation
        // cannot save it.
        let report = w.resolve_attack(melee_payload(attacker, watch, 100_000), victim, &env);

        assert_eq!(report.result, AttackResult::TargetDown);
        let v = w.agent(victim).unwrap();
        assert_eq!(v.health.points(), 0);
        assert!(v.health.is_dead());
        assert!(v.scheduler.is_frozen());
        // Dead agents leave every clan's enemy lists.
        assert!(w.registry().enemies_of(attacker).is_empty());
    }

    #[test]
    fn dead_target_is_a_silent_no_op() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let attacker = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        let victim = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::ONE,
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        w.resolve_attack(melee_payload(attacker, watch, 100_000), victim, &env);
        w.drain_events();

        let report = w.resolve_attack(melee_payload(attacker, watch, 100_000), victim, &env);
        assert_eq!(report.result, AttackResult::None);
        assert_eq!(report.damage_dealt, 0);
        assert!(w.drain_events().is_empty());
    }

    #[test]
    fn friendly_fire_promotes_before_damage_lands() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let caravan = w.declare_clan("Caravan", Alignment::Lawful);
        let a = w.spawn(AgentSpec::new(
            "watchman",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        let b = w.spawn(AgentSpec::new(
            "merchant",
            CharacterClass::Villager,
            1,
            caravan,
            Vec3::ONE,
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        w.resolve_attack(melee_payload(a, watch, 100_000), b, &env);

        assert_eq!(w.registry().alignment(watch), Alignment::Rogue);
        let events = w.drain_events();
        let rogue_index = events
            .iter()
            .position(|e| matches!(e, GameEvent::ClanWentRogue { .. }))
            .expect("promotion event");
        let health_index = events
            .iter()
            .position(|e| matches!(e, GameEvent::HealthChanged { .. }))
            .expect("damage event");
        assert!(rogue_index < health_index);
        // The dead merchant is out of everyone's lists, but live members
        // of the rogue clan are now enemies of their former allies.
        assert!(w.agent(b).unwrap().health.is_dead());
    }

    #[test]
    fn rogue_clan_members_appear_in_former_ally_enemy_lists() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let caravan = w.declare_clan("Caravan", Alignment::Lawful);
        let a = w.spawn(AgentSpec::new(
            "watchman",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        let b = w.spawn(AgentSpec::new(
            "merchant",
            CharacterClass::Villager,
            5,
            caravan,
            Vec3::ONE,
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        // Weak strike: promotion happens even though the merchant lives.
        w.resolve_attack(melee_payload(a, watch, 1), b, &env);

        assert!(!w.agent(b).unwrap().health.is_dead());
        assert_eq!(w.registry().enemies_of(b), vec![a]);
    }

    #[test]
    fn kill_grants_experience_to_the_instigator() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let attacker = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        // Level 3 victim: reward table grants 20 XP, enough for level 2.
        let victim = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Brigand,
            3,
            bandits,
            Vec3::ONE,
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        w.resolve_attack(melee_payload(attacker, watch, 100_000), victim, &env);

        let a = w.agent(attacker).unwrap();
        assert_eq!(a.sheet.experience(), 20);
        assert_eq!(a.sheet.level(), 2);
        assert!(
            w.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::LeveledUp { level: 2, .. }))
        );
    }

    #[test]
    fn denied_move_leaves_prior_action_running() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let guard = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        let bandit = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(5.0, 0.0, 0.0),
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        assert!(w.command(guard, Command::Attack(bandit), priority::PLAYER, &env));
        // An AI-priority move must not displace the player's attack.
        assert!(!w.command(guard, Command::MoveTo(Vec3::ONE), priority::AI, &env));
        let g = w.agent(guard).unwrap();
        assert_eq!(g.scheduler.current(), ActionType::Attack);
        assert_eq!(g.fighter.target(), Some(bandit));
    }

    #[test]
    fn fighter_chases_then_strikes_to_the_kill() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let guard = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            4,
            watch,
            Vec3::ZERO,
        ));
        let bandit = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Villager,
            1,
            bandits,
            Vec3::new(8.0, 0.0, 0.0),
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        assert!(w.command(guard, Command::Attack(bandit), priority::PLAYER, &env));

        // Soldier strength at level 4 is 32 against defense 10; every
        // landed strike deals at least 20 of the villager's 20 health.
        let mut finished = false;
        for _ in 0..200 {
            w.tick(0.1, &env);
            if w.agent(bandit).is_some_and(|b| b.health.is_dead()) {
                finished = true;
                break;
            }
        }
        assert!(finished, "guard never brought the bandit down");
        // The loop exits and frees the slot on the next tick.
        w.tick(0.1, &env);
        assert_eq!(w.agent(guard).unwrap().scheduler.current(), ActionType::None);
    }

    #[test]
    fn idle_ai_returns_to_guard_post() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let guard_post = Vec3::new(3.0, 0.0, 0.0);
        let guard = w.spawn(
            AgentSpec::new("guard", CharacterClass::Soldier, 1, watch, guard_post)
                .with_ai(AiConfig::default()),
        );

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        // Drag the guard off its post, then let the loop take over.
        w.warp(guard, Vec3::new(9.0, 0.0, 0.0));
        w.tick(0.3, &env);

        let g = w.agent(guard).unwrap();
        assert_eq!(g.scheduler.current(), ActionType::Move);
        assert_eq!(g.mover.destination(), Some(guard_post));

        // And it actually walks home.
        for _ in 0..600 {
            w.tick(0.1, &env);
        }
        assert!(w.agent(guard).unwrap().pos.distance(guard_post) <= 1.0);
    }

    #[test]
    fn ai_acquires_nearest_enemy_and_engages() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let guard = w.spawn(
            AgentSpec::new("guard", CharacterClass::Soldier, 1, watch, Vec3::ZERO)
                .with_ai(AiConfig::default()),
        );
        let near = w.spawn(AgentSpec::new(
            "near-bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(3.0, 0.0, 0.0),
        ));
        let _far = w.spawn(AgentSpec::new(
            "far-bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(6.0, 0.0, 0.0),
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        w.tick(0.3, &env);

        let g = w.agent(guard).unwrap();
        assert_eq!(g.scheduler.current(), ActionType::Attack);
        assert_eq!(g.fighter.target(), Some(near));
    }

    #[test]
    fn struck_ai_switches_to_a_closer_aggressor() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let guard = w.spawn(
            AgentSpec::new("guard", CharacterClass::Soldier, 1, watch, Vec3::ZERO)
                .with_ai(AiConfig::default()),
        );
        let far = w.spawn(AgentSpec::new(
            "far-bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(7.0, 0.0, 0.0),
        ));
        let near = w.spawn(AgentSpec::new(
            "near-bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(2.0, 0.0, 0.0),
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        // Pin the guard on the far bandit, then have the near one strike
        // it: the event-driven path must retarget immediately.
        assert!(w.start_attack_action(guard, far, priority::AI));
        w.strike(near, guard, &env);

        let g = w.agent(guard).unwrap();
        assert_eq!(g.fighter.target(), Some(near));
        assert_eq!(g.ai.as_ref().unwrap().target(), Some(near));
    }

    #[test]
    fn capture_restore_round_trip_resets_to_idle() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let guard = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::new(2.0, 0.0, 2.0),
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        let records = w.capture();

        w.warp(guard, Vec3::new(50.0, 0.0, 0.0));
        w.command(guard, Command::MoveTo(Vec3::ZERO), priority::PLAYER, &env);
        w.restore(&records);

        let g = w.agent(guard).unwrap();
        assert_eq!(g.pos, Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(g.scheduler.current(), ActionType::None);
        assert!(!g.mover.is_active());
    }

    #[test]
    fn restore_below_threshold_runs_the_death_path() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let guard = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));

        let mut records = w.capture();
        records[0].health_points = 0;
        w.restore(&records);

        let g = w.agent(guard).unwrap();
        assert!(g.health.is_dead());
        assert!(g.scheduler.is_frozen());
        assert!(w.registry().clan_of(guard).is_none());
    }

    #[test]
    fn despawn_grace_frees_the_agent() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let attacker = w.spawn(AgentSpec::new(
            "guard",
            CharacterClass::Soldier,
            1,
            watch,
            Vec3::ZERO,
        ));
        let victim = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::ONE,
        ));

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        w.resolve_attack(melee_payload(attacker, watch, 100_000), victim, &env);
        assert!(w.agent(victim).is_some());

        let grace = w.tuning().despawn_grace;
        let steps = (grace / 0.5).ceil() as usize + 2;
        for _ in 0..steps {
            w.tick(0.5, &env);
        }
        assert!(w.agent(victim).is_none());
        assert!(
            w.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Despawned { agent } if *agent == victim))
        );
    }

    #[test]
    fn commanding_leader_propagates_its_attack() {
        let mut w = world();
        let watch = w.declare_clan("TownWatch", Alignment::Lawful);
        let bandits = w.declare_clan("Bandits", Alignment::Rebel);
        let leader = w.spawn(
            AgentSpec::new("captain", CharacterClass::Captain, 2, watch, Vec3::ZERO)
                .with_formation(crate::ai::FormationConfig::default()),
        );
        let follower = w.spawn(
            AgentSpec::new(
                "soldier",
                CharacterClass::Soldier,
                1,
                watch,
                Vec3::new(0.0, 0.0, -2.0),
            )
            .with_ai(AiConfig {
                sight_range: 0.5,
                ..AiConfig::default()
            }),
        );
        let bandit = w.spawn(AgentSpec::new(
            "bandit",
            CharacterClass::Brigand,
            1,
            bandits,
            Vec3::new(20.0, 0.0, 0.0),
        ));
        w.assign_follower(leader, follower);

        let rng = PcgRng;
        let env = Env::new(&Line, &rng);
        assert!(w.command(leader, Command::Attack(bandit), priority::PLAYER, &env));
        w.tick(0.05, &env);

        let f = w.agent(follower).unwrap();
        assert_eq!(f.scheduler.current(), ActionType::Attack);
        assert_eq!(f.fighter.target(), Some(bandit));
        assert_eq!(f.scheduler.current_priority(), priority::LEADER);
    }

    #[test]
    fn rotate_toward_takes_the_short_way() {
        use std::f32::consts::PI;
        let turned = rotate_toward(0.1, -0.1, 0.05);
        assert!((turned - 0.05).abs() < 1e-6);
        // Across the ±π seam.
        let turned = rotate_toward(PI - 0.05, -PI + 0.05, 1.0);
        assert!(turned > PI - 0.06);
    }
}
