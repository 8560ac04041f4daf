//! In-flight ranged attacks.
//!
//! A projectile carries the payload frozen at launch. Homing projectiles
//! steer toward the target's current position; straight ones fly their
//! launch direction (optionally aimed with target lead and a deterministic
//! scatter, both computed by the world at launch). Contact hands the
//! payload to the resolver under the no-miss ranged rule.

use glam::Vec3;

use crate::world::AgentId;

use super::payload::AttackPayload;

/// What a projectile did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileStep {
    Flying,
    /// Close enough to the target: resolve the payload.
    Contact,
    /// Target gone or lifetime exceeded: despawn without effect.
    Expired,
}

/// One airborne attack.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: u32,
    pub payload: AttackPayload,
    pub target: AgentId,
    pub pos: Vec3,
    speed: f32,
    homing: bool,
    /// Flight direction for straight projectiles; unused when homing.
    direction: Vec3,
    age: f32,
    lifetime: f32,
}

impl Projectile {
    pub fn new(
        id: u32,
        payload: AttackPayload,
        target: AgentId,
        origin: Vec3,
        aim_point: Vec3,
        speed: f32,
        homing: bool,
        lifetime: f32,
    ) -> Self {
        Self {
            id,
            payload,
            target,
            pos: origin,
            speed,
            homing,
            direction: (aim_point - origin).normalize_or_zero(),
            age: 0.0,
            lifetime,
        }
    }

    /// Advances the flight. `target_pos` is `None` once the target has
    /// despawned; the resolver's own dead-target guard handles targets
    /// that died but still stand.
    pub fn advance(&mut self, target_pos: Option<Vec3>, hit_radius: f32, dt: f32) -> ProjectileStep {
        self.age += dt;
        if self.age > self.lifetime {
            return ProjectileStep::Expired;
        }

        let Some(target_pos) = target_pos else {
            return ProjectileStep::Expired;
        };

        if self.homing {
            self.direction = (target_pos - self.pos).normalize_or_zero();
        }
        self.pos += self.direction * self.speed * dt;

        if self.pos.distance(target_pos) <= hit_radius {
            ProjectileStep::Contact
        } else {
            ProjectileStep::Flying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::AttackKind;
    use crate::faction::ClanId;

    fn arrow(origin: Vec3, aim: Vec3, homing: bool) -> Projectile {
        let payload = AttackPayload {
            instigator: AgentId(0),
            instigator_clan: ClanId(0),
            kind: AttackKind::Ranged,
            attack_points: 10,
            damage: 10,
            hit_precision: 10,
            crit_strike: 0,
        };
        Projectile::new(1, payload, AgentId(2), origin, aim, 10.0, homing, 5.0)
    }

    #[test]
    fn homing_projectile_tracks_a_moving_target() {
        let mut p = arrow(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), true);
        // Target sidesteps; the homing arrow still closes in.
        let target = Vec3::new(3.0, 0.0, 2.0);
        let mut steps = 0;
        loop {
            match p.advance(Some(target), 0.5, 0.1) {
                ProjectileStep::Contact => break,
                ProjectileStep::Flying => steps += 1,
                ProjectileStep::Expired => panic!("expired before contact"),
            }
            assert!(steps < 100);
        }
    }

    #[test]
    fn straight_projectile_can_fly_past() {
        let mut p = arrow(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), false);
        // Target far off the flight line: never contacts, expires.
        let target = Vec3::new(5.0, 0.0, 8.0);
        let mut last = ProjectileStep::Flying;
        for _ in 0..100 {
            last = p.advance(Some(target), 0.5, 0.1);
            if last != ProjectileStep::Flying {
                break;
            }
        }
        assert_eq!(last, ProjectileStep::Expired);
    }

    #[test]
    fn despawned_target_expires_the_projectile() {
        let mut p = arrow(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), true);
        assert_eq!(p.advance(None, 0.5, 0.1), ProjectileStep::Expired);
    }
}
