//! Balance tuning loader.

use std::path::Path;

use game_core::Tuning;

use super::{LoadResult, read_file};

/// Loader for [`Tuning`] overrides from TOML files. Fields left out of
/// the file keep their defaults.
pub struct TuningLoader;

impl TuningLoader {
    pub fn load(path: &Path) -> LoadResult<Tuning> {
        let content = read_file(path)?;
        let tuning: Tuning = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: failed to parse tuning TOML: {}", path.display(), e))?;
        Ok(tuning)
    }
}
