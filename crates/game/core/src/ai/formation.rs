//! Formation coordination for a leader and its followers.
//!
//! A commanding leader propagates its own action to its followers (attack
//! the leader's target, or fall into formation behind a moving leader)
//! and computes the spatial slots: spaced rows behind the leader, each
//! row centered on the leader's axis.

use glam::Vec3;

use crate::world::AgentId;

/// Authored formation shape parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormationConfig {
    /// Units-per-row grows by this factor per added row.
    pub row_growth: u32,
    /// Meters between neighbouring slots.
    pub spacing: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            row_growth: 1,
            spacing: 2.0,
        }
    }
}

/// Leadership state attached to a commanding agent.
#[derive(Clone, Debug)]
pub struct Formation {
    config: FormationConfig,
    followers: Vec<AgentId>,
    /// Orders propagate only while the leader is commanding; releasing
    /// control returns followers to independent behavior.
    commanding: bool,
    /// Anchor the last slot assignment was computed from; slots are
    /// refreshed when the leader has moved away from it.
    last_anchor: Option<Vec3>,
}

impl Formation {
    pub fn new(config: FormationConfig) -> Self {
        Self {
            config,
            followers: Vec::new(),
            commanding: true,
            last_anchor: None,
        }
    }

    pub fn followers(&self) -> &[AgentId] {
        &self.followers
    }

    pub fn add_follower(&mut self, follower: AgentId) {
        if !self.followers.contains(&follower) {
            self.followers.push(follower);
        }
    }

    pub fn remove_follower(&mut self, follower: AgentId) {
        self.followers.retain(|f| *f != follower);
    }

    pub fn is_commanding(&self) -> bool {
        self.commanding
    }

    pub fn set_commanding(&mut self, commanding: bool) {
        self.commanding = commanding;
        self.last_anchor = None;
    }

    /// Whether slots need recomputing for this anchor.
    pub fn needs_refresh(&self, anchor: Vec3, threshold: f32) -> bool {
        self.last_anchor
            .map_or(true, |last| last.distance(anchor) > threshold)
    }

    pub fn mark_refreshed(&mut self, anchor: Vec3) {
        self.last_anchor = Some(anchor);
    }

    /// Computes one slot per follower: rows behind the leader, spaced by
    /// `spacing`, each row centered on the leader's forward axis.
    pub fn slots(&self, anchor: Vec3, heading: f32) -> Vec<Vec3> {
        let count = self.followers.len();
        if count == 0 {
            return Vec::new();
        }

        let (rows, per_row) = self.dimensions(count);
        let forward = Vec3::new(heading.sin(), 0.0, heading.cos());
        let right = Vec3::new(heading.cos(), 0.0, -heading.sin());

        let mut slots = Vec::with_capacity(count);
        let mut remaining = count;
        for row in 0..rows {
            let row_offset = anchor - forward * ((row + 1) as f32 * self.config.spacing);
            let width = remaining.min(per_row);
            let centering = right * (self.config.spacing * (width as f32 - 1.0) / 2.0);

            let mut cursor = row_offset - centering;
            for _ in 0..per_row {
                if remaining == 0 {
                    return slots;
                }
                slots.push(cursor);
                cursor += right * self.config.spacing;
                remaining -= 1;
            }
        }
        slots
    }

    /// Smallest row layout whose capacity covers `count`:
    /// `per_row = row_growth × rows`, capacity `rows × per_row`.
    fn dimensions(&self, count: usize) -> (usize, usize) {
        let mut rows = 0usize;
        let mut per_row = 0usize;
        let mut capacity = 0usize;
        while count > capacity {
            rows += 1;
            per_row = self.config.row_growth as usize * rows;
            capacity = rows * per_row;
        }
        (rows, per_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formation_with(count: u32) -> Formation {
        let mut f = Formation::new(FormationConfig::default());
        for i in 0..count {
            f.add_follower(AgentId(i + 1));
        }
        f
    }

    #[test]
    fn one_follower_stands_behind_the_leader() {
        let f = formation_with(1);
        // Heading 0 = facing +Z, so "behind" is −Z.
        let slots = f.slots(Vec3::ZERO, 0.0);
        assert_eq!(slots.len(), 1);
        assert!((slots[0].z - -2.0).abs() < 1e-5);
        assert!(slots[0].x.abs() < 1e-5);
    }

    #[test]
    fn rows_grow_with_follower_count() {
        let f = formation_with(5);
        // Growth 1 capacities: 1, 4, 9. Five units need the 3×3 layout,
        // filling three slots in the first row and two in the second.
        let slots = f.slots(Vec3::ZERO, 0.0);
        assert_eq!(slots.len(), 5);
        // First row holds three slots at z = −2.
        assert!(slots[..3].iter().all(|s| (s.z - -2.0).abs() < 1e-5));
        assert!(slots[3..].iter().all(|s| (s.z - -4.0).abs() < 1e-5));
    }

    #[test]
    fn rows_are_centered_on_the_leader_axis() {
        let f = formation_with(3);
        let slots = f.slots(Vec3::ZERO, 0.0);
        let mean_x: f32 = slots.iter().map(|s| s.x).sum::<f32>() / slots.len() as f32;
        assert!(mean_x.abs() < 1e-4);
    }

    #[test]
    fn duplicate_followers_are_ignored() {
        let mut f = formation_with(2);
        f.add_follower(AgentId(1));
        assert_eq!(f.followers().len(), 2);
        f.remove_follower(AgentId(1));
        assert_eq!(f.followers().len(), 1);
    }

    #[test]
    fn refresh_tracks_leader_movement() {
        let mut f = formation_with(1);
        assert!(f.needs_refresh(Vec3::ZERO, 1.0));
        f.mark_refreshed(Vec3::ZERO);
        assert!(!f.needs_refresh(Vec3::new(0.5, 0.0, 0.0), 1.0));
        assert!(f.needs_refresh(Vec3::new(2.0, 0.0, 0.0), 1.0));
    }
}
