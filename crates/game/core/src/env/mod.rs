//! Traits describing services external to the core.
//!
//! Oracles expose path planning and random number generation. The [`Env`]
//! aggregate bundles them so the world tick can access everything it needs
//! without hard coupling to concrete implementations.

mod path;
mod rng;

pub use path::{PathOracle, PlannedPath};
pub use rng::{PcgRng, RngOracle, compute_seed, roll};

/// Aggregates the external services required by [`World::tick`].
///
/// [`World::tick`]: crate::world::World::tick
#[derive(Clone, Copy)]
pub struct Env<'a> {
    path: &'a dyn PathOracle,
    rng: &'a dyn RngOracle,
}

impl<'a> Env<'a> {
    pub fn new(path: &'a dyn PathOracle, rng: &'a dyn RngOracle) -> Self {
        Self { path, rng }
    }

    pub fn path(&self) -> &'a dyn PathOracle {
        self.path
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}
