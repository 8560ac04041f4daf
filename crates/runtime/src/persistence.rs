//! The capture/restore boundary.
//!
//! Only health points and positions survive a round trip; actions in
//! progress deliberately do not; every agent re-enters Idle on restore.
//! The blob is opaque to callers; this module owns no file format, just
//! the serialization of the records.

use game_core::{AgentRecord, World};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Serialize, Deserialize)]
struct SaveState {
    records: Vec<AgentRecord>,
}

/// Captures the world into an opaque blob.
pub fn capture(world: &World) -> Result<serde_json::Value> {
    let state = SaveState {
        records: world.capture(),
    };
    Ok(serde_json::to_value(state)?)
}

/// Restores a previously captured blob into the world.
pub fn restore(world: &mut World, blob: &serde_json::Value) -> Result<()> {
    let state: SaveState = serde_json::from_value(blob.clone())?;
    world.restore(&state.records);
    Ok(())
}
