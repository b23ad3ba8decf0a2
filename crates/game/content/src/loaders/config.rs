//! Game configuration loader.

use std::path::Path;

use anyhow::Context;
use game_core::{Catalog, GameConfig};

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file and check it against `catalog`.
    ///
    /// Fields missing from the file keep their [`GameConfig::default`] values.
    pub fn load(path: &Path, catalog: &Catalog) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content, catalog).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str, catalog: &Catalog) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate(catalog)?;

        tracing::debug!(
            target: "content::config",
            castes = config.caste_count,
            remedies = config.plague.remedies.len(),
            "config loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::CatalogLoader;

    fn catalog() -> Catalog {
        CatalogLoader::parse(include_str!("../../data/catalog.ron")).expect("embedded catalog")
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ConfigLoader::parse("hop_ticks = 9\n", &catalog()).expect("valid config");
        assert_eq!(config.hop_ticks, 9);
        assert_eq!(config.caste_count, GameConfig::DEFAULT_CASTE_COUNT);
        assert_eq!(config.work_resource, GameConfig::default().work_resource);
    }

    #[test]
    fn decimal_strings_stay_exact() {
        let config = ConfigLoader::parse(
            "feed_growth = \"0.15\"\n[plague]\nmortality = \"0.07\"\n",
            &catalog(),
        )
        .expect("valid config");
        assert_eq!(config.feed_growth.to_string(), "0.15");
        assert_eq!(config.plague.mortality.to_string(), "0.07");
    }

    #[test]
    fn unknown_resources_are_rejected() {
        let err = ConfigLoader::parse("work_resource = \"res-mana\"\n", &catalog()).unwrap_err();
        assert!(format!("{err:#}").contains("res-mana"), "{err:#}");
    }
}
