//! Headless demo: load the authored skirmish and let it play out.
//!
//! Run with `RUST_LOG=debug` to watch the full event stream.

use std::path::PathBuf;

use game_content::{ProgressionLoader, ScenarioLoader, WeaponLoader};
use game_core::{Command, Tuning};
use runtime::Session;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    let progression = ProgressionLoader::load(&data.join("progression.toml"))?;
    let catalog = WeaponLoader::load(&data.join("weapons.ron"))?;
    let spec = ScenarioLoader::load(&data.join("skirmish.ron"))?;

    let mut session = Session::from_scenario(&spec, &catalog, progression, Tuning::new())?;

    // The captain marches the squad toward the east road; the raiders'
    // own AI does the rest.
    if let Some(captain) = session.agent_id("captain") {
        let accepted = session.command(captain, Command::MoveTo(glam::Vec3::new(16.0, 0.0, 0.0)));
        anyhow::ensure!(accepted, "captain refused the march order");
    }

    let events = session.run_for(60.0, 0.05);
    tracing::info!(events = events.len(), "skirmish finished");

    for agent in session.world().agents() {
        tracing::info!(
            name = %agent.name,
            hp = agent.health.points(),
            max = agent.health.max_points(),
            dead = agent.health.is_dead(),
            "survivor"
        );
    }
    Ok(())
}
