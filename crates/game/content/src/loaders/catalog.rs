//! Entity catalog loader.

use std::path::Path;

use anyhow::Context;
use game_core::{Catalog, RawTables};

use crate::loaders::{LoadResult, read_file};

/// Loader for the entity catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate the catalog stored at `path`.
    pub fn load(path: &Path) -> LoadResult<Catalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid catalog {}", path.display()))
    }

    /// Parse raw tables from RON text and validate them into a [`Catalog`].
    pub fn parse(content: &str) -> LoadResult<Catalog> {
        let raw: RawTables = ron::from_str(content).context("Failed to parse catalog RON")?;
        let counts = (
            raw.resources.len(),
            raw.techs.len(),
            raw.vyrobas.len(),
            raw.tiles.len(),
        );
        let catalog = Catalog::load(raw)?;

        tracing::debug!(
            target: "content::catalog",
            resources = counts.0,
            techs = counts.1,
            vyrobas = counts.2,
            tiles = counts.3,
            "catalog loaded"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLES: &str = r#"(
        resources: [
            (id: "res-work", name: "Work"),
            (id: "pro-grain", name: "Grain", food: true),
        ],
        techs: [
            (id: "tec-start", name: "Start", unlocks: ["vyr-fields"]),
        ],
        vyrobas: [
            (
                id: "vyr-fields",
                name: "Fields",
                cost: {"res-work": 3},
                reward: "pro-grain",
                amount: "2.5",
            ),
        ],
        tiles: [
            (index: 1, name: "Home", parcels: 2, neighbours: [2]),
            (index: 2, name: "Away", parcels: 1, neighbours: [1]),
        ],
    )"#;

    #[test]
    fn parses_tables_with_defaults() {
        let catalog = CatalogLoader::parse(TABLES).expect("valid tables");
        let fields = catalog.vyroba(&"vyr-fields".into());
        assert_eq!(fields.amount.to_string(), "2.5");
        assert_eq!(fields.workers, 0);
        assert!(catalog.resource(&"pro-grain".into()).food);
        assert_eq!(catalog.tiles().count(), 2);
    }

    #[test]
    fn rejects_dangling_references() {
        let broken = TABLES.replace(r#"reward: "pro-grain""#, r#"reward: "pro-rice""#);
        let err = CatalogLoader::parse(&broken).unwrap_err();
        assert!(format!("{err:#}").contains("pro-rice"), "{err:#}");
    }

    #[test]
    fn reports_the_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        std::fs::write(&path, "(resources: [").unwrap();

        let err = CatalogLoader::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("catalog.ron"), "{err:#}");
    }
}
