//! Path-planning oracle.
//!
//! Navigation is an external service as far as the core is concerned: the
//! [`Mover`](crate::movement::Mover) asks for a path and walks it, nothing
//! more. A failed plan means "cannot move", never an error.

use glam::Vec3;

/// An ordered list of points leading to a destination.
///
/// The first point is the next corner to walk toward, the last one is the
/// destination itself.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedPath {
    points: Vec<Vec3>,
}

impl PlannedPath {
    /// Builds a path from waypoints. Returns `None` for an empty list.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { points })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn destination(&self) -> Vec3 {
        // new() rejects empty point lists
        *self.points.last().expect("planned path is never empty")
    }

    /// Walking distance from `from` through all remaining corners,
    /// starting at `next_index`.
    pub fn remaining_distance(&self, from: Vec3, next_index: usize) -> f32 {
        let mut total = 0.0;
        let mut cursor = from;
        for p in &self.points[next_index.min(self.points.len())..] {
            total += cursor.distance(*p);
            cursor = *p;
        }
        total
    }
}

/// Read-only path-planning service consumed by the movement actor.
pub trait PathOracle: Send + Sync {
    /// Plan a path between two points. `None` means the destination is
    /// unreachable and the move request should be treated as a no-op.
    fn plan(&self, from: Vec3, to: Vec3) -> Option<PlannedPath>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_rejected() {
        assert!(PlannedPath::new(Vec::new()).is_none());
    }

    #[test]
    fn remaining_distance_sums_corners() {
        let path = PlannedPath::new(vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 2.0),
        ])
        .unwrap();
        let d = path.remaining_distance(Vec3::ZERO, 0);
        assert!((d - 3.0).abs() < 1e-5);
    }

    #[test]
    fn remaining_distance_skips_passed_corners() {
        let path = PlannedPath::new(vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 2.0),
        ])
        .unwrap();
        let d = path.remaining_distance(Vec3::new(1.0, 0.0, 1.0), 1);
        assert!((d - 1.0).abs() < 1e-5);
    }
}
