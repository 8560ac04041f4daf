//! Non-player behavior: the AI decision loop, patrol routes, and
//! formation coordination.

pub mod controller;
pub mod formation;
pub mod patrol;

pub use controller::{AiConfig, AiController, AiState};
pub use formation::{Formation, FormationConfig};
pub use patrol::{PatrolPath, PatrolState};
