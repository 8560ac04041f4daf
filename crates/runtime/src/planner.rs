//! Built-in path planner.
//!
//! The core treats navigation as an opaque service; this is the simplest
//! honest implementation of it: straight lines over open ground. A real
//! embedding swaps in its navigation mesh behind the same trait.

use game_core::{PathOracle, PlannedPath};
use glam::Vec3;

/// Straight-line planner for open terrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectPlanner;

impl PathOracle for DirectPlanner {
    fn plan(&self, _from: Vec3, to: Vec3) -> Option<PlannedPath> {
        PlannedPath::new(vec![to])
    }
}
