//! Authored patrol routes.
//!
//! A patrol path is an ordered waypoint loop set at authoring time; the
//! guard specialization of the AI loop cycles it with a dwell pause at
//! each stop.

use glam::Vec3;

/// Ordered waypoint loop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatrolPath {
    waypoints: Vec<Vec3>,
}

impl PatrolPath {
    /// Builds a path; `None` for an empty waypoint list (a content
    /// defect callers surface at load).
    pub fn new(waypoints: Vec<Vec3>) -> Option<Self> {
        if waypoints.is_empty() {
            return None;
        }
        Some(Self { waypoints })
    }

    pub fn waypoint(&self, index: usize) -> Vec3 {
        self.waypoints[index % self.waypoints.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Progress along a patrol path.
#[derive(Clone, Debug)]
pub struct PatrolState {
    path: PatrolPath,
    current: usize,
    time_at_waypoint: f32,
}

impl PatrolState {
    pub fn new(path: PatrolPath) -> Self {
        Self {
            path,
            current: 0,
            time_at_waypoint: 0.0,
        }
    }

    pub fn current_waypoint(&self) -> Vec3 {
        self.path.waypoint(self.current)
    }

    /// One idle-routine evaluation: returns the waypoint to walk to, or
    /// `None` while dwelling at the current stop.
    pub fn next_order(&mut self, pos: Vec3, tolerance: f32, dwell: f32, elapsed: f32) -> Option<Vec3> {
        let at_waypoint = pos.distance(self.current_waypoint()) <= tolerance;
        if !at_waypoint {
            self.time_at_waypoint = 0.0;
            return Some(self.current_waypoint());
        }

        self.time_at_waypoint += elapsed;
        if self.time_at_waypoint > dwell {
            self.current = self.path.next_index(self.current);
            self.time_at_waypoint = 0.0;
            return Some(self.current_waypoint());
        }
        None
    }
}
