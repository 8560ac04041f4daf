//! Session orchestration over the pure core.
//!
//! `runtime` owns everything the decision/resolution engine deliberately
//! does not: content loading, the tick driver, path planning, event
//! logging, and the persistence boundary. The core stays deterministic
//! and silent; this crate is where the outside world plugs in.

pub mod error;
pub mod persistence;
pub mod planner;
pub mod scenario;
pub mod session;

pub use error::{Result, RuntimeError};
pub use planner::DirectPlanner;
pub use scenario::build_world;
pub use session::Session;
