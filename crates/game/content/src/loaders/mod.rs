//! File loaders for balance data.

mod progression;
mod tuning;
mod weapons;

pub use progression::ProgressionLoader;
pub use tuning::TuningLoader;
pub use weapons::{WeaponCatalog, WeaponLoader};

use std::path::Path;

/// Result alias shared by all loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Reads a content file into memory with a path-carrying error.
pub fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))
}
