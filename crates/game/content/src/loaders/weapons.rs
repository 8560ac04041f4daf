//! Weapon catalog loader.

use std::path::Path;

use game_core::WeaponConfig;

use super::{LoadResult, read_file};

/// A validated, name-addressable set of weapon configurations.
#[derive(Clone, Debug)]
pub struct WeaponCatalog {
    weapons: Vec<WeaponConfig>,
}

impl WeaponCatalog {
    /// Builds a catalog, validating every entry and rejecting duplicate
    /// names.
    pub fn new(weapons: Vec<WeaponConfig>) -> anyhow::Result<Self> {
        for weapon in &weapons {
            weapon
                .validate()
                .map_err(|e| anyhow::anyhow!("invalid weapon config: {}", e))?;
        }
        if let Some(duplicate) = weapons
            .iter()
            .enumerate()
            .find(|(i, w)| weapons[..*i].iter().any(|seen| seen.name == w.name))
        {
            anyhow::bail!("duplicate weapon name '{}'", duplicate.1.name);
        }
        Ok(Self { weapons })
    }

    pub fn get(&self, name: &str) -> Option<&WeaponConfig> {
        self.weapons.iter().find(|w| w.name == name)
    }

    pub fn weapons(&self) -> &[WeaponConfig] {
        &self.weapons
    }
}

/// Loader for weapon catalogs from RON files.
pub struct WeaponLoader;

impl WeaponLoader {
    /// Load and validate a weapon catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<WeaponCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    fn parse(content: &str) -> anyhow::Result<WeaponCatalog> {
        let weapons: Vec<WeaponConfig> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("failed to parse weapon RON: {}", e))?;
        WeaponCatalog::new(weapons)
    }
}
