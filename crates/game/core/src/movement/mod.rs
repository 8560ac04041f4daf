//! The movement actor.
//!
//! Wraps the opaque path-planning service behind a cancellable
//! "move to point" action. The mover never touches the action scheduler;
//! whether a move owns the slot (a Move action) or rides under another
//! action (a fighter closing in on its target) is the agent glue's
//! concern.

use glam::Vec3;

use crate::env::{PathOracle, PlannedPath};

/// Per-tick movement outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveProgress {
    /// No move in progress.
    Idle,
    /// Still walking the path.
    Moving,
    /// Reached the destination this tick; the mover is idle again.
    Arrived,
}

/// Cancellable move-to-point actor for one agent.
#[derive(Clone, Debug, Default)]
pub struct Mover {
    path: Option<PlannedPath>,
    next_corner: usize,
    speed_fraction: f32,
}

impl Mover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans and starts a move. Returns `false` when the planner finds no
    /// path: "cannot move", not an error.
    pub fn begin(
        &mut self,
        from: Vec3,
        destination: Vec3,
        speed_fraction: f32,
        planner: &dyn PathOracle,
    ) -> bool {
        match planner.plan(from, destination) {
            Some(path) => {
                self.path = Some(path);
                self.next_corner = 0;
                self.speed_fraction = speed_fraction.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Starts walking a path planned by the caller (used when planning
    /// must succeed before an action slot is committed).
    pub fn adopt(&mut self, path: PlannedPath, speed_fraction: f32) {
        self.path = Some(path);
        self.next_corner = 0;
        self.speed_fraction = speed_fraction.clamp(0.0, 1.0);
    }

    /// Stops in place and drops the path. Safe to call at any time.
    pub fn cancel(&mut self) {
        self.path = None;
        self.next_corner = 0;
    }

    /// Current speed fraction; meaningful while a move is active.
    pub fn speed_fraction(&self) -> f32 {
        self.speed_fraction
    }

    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.path.as_ref().map(PlannedPath::destination)
    }

    /// Walking distance left to the destination.
    pub fn remaining_distance(&self, from: Vec3) -> f32 {
        self.path
            .as_ref()
            .map_or(0.0, |p| p.remaining_distance(from, self.next_corner))
    }

    /// Advances along the path, updating position and heading in place.
    pub fn advance(
        &mut self,
        pos: &mut Vec3,
        heading: &mut f32,
        max_speed: f32,
        tolerance: f32,
        dt: f32,
    ) -> MoveProgress {
        let Some(path) = &self.path else {
            return MoveProgress::Idle;
        };

        let mut travel = max_speed * self.speed_fraction * dt;
        let corners = path.points();

        while travel > 0.0 && self.next_corner < corners.len() {
            let corner = corners[self.next_corner];
            let to_corner = corner - *pos;
            let dist = to_corner.length();

            if dist <= travel {
                *pos = corner;
                travel -= dist;
                self.next_corner += 1;
            } else {
                let dir = to_corner / dist;
                *pos += dir * travel;
                *heading = dir.x.atan2(dir.z);
                travel = 0.0;
            }
        }

        if self.remaining_distance(*pos) <= tolerance {
            self.cancel();
            MoveProgress::Arrived
        } else {
            MoveProgress::Moving
        }
    }
}
