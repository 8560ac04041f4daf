//! Progression table loader.

use std::path::Path;

use game_core::Progression;

use super::{LoadResult, read_file};

/// Loader for class/level progression tables from TOML files.
pub struct ProgressionLoader;

impl ProgressionLoader {
    /// Load and validate progression data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<Progression> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    fn parse(content: &str) -> anyhow::Result<Progression> {
        let progression: Progression = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("failed to parse progression TOML: {}", e))?;
        progression
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid progression tables: {}", e))?;
        Ok(progression)
    }
}
