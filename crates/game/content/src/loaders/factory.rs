//! Content factory for building a playable game from data files.

use std::path::{Path, PathBuf};

use game_core::{Catalog, GameConfig, GameState};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, Scenario, ScenarioLoader};

const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.ron");
const EMBEDDED_CONFIG: &str = include_str!("../../data/config.toml");
const EMBEDDED_SCENARIO: &str = include_str!("../../data/scenario.ron");

/// Validated catalog together with the initial state it governs.
#[derive(Clone, Debug)]
pub struct LoadedGame {
    pub catalog: Catalog,
    pub state: GameState,
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── catalog.ron
/// ├── config.toml
/// └── scenario.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the entity catalog from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        CatalogLoader::load(&self.data_dir.join("catalog.ron"))
    }

    /// Load world tunables from `config.toml`, validated against `catalog`.
    pub fn load_config(&self, catalog: &Catalog) -> LoadResult<GameConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"), catalog)
    }

    /// Load the starting position from `scenario.ron`.
    pub fn load_scenario(&self) -> LoadResult<Scenario> {
        ScenarioLoader::load(&self.data_dir.join("scenario.ron"))
    }

    /// Load every file and build the initial state.
    pub fn load_game(&self) -> LoadResult<LoadedGame> {
        tracing::info!(
            target: "content",
            data_dir = %self.data_dir.display(),
            "loading game content"
        );
        let catalog = self.load_catalog()?;
        let config = self.load_config(&catalog)?;
        let state = self.load_scenario()?.build(&catalog, config)?;
        Ok(LoadedGame { catalog, state })
    }

    /// Build the default game bundled with this crate.
    pub fn embedded() -> LoadResult<LoadedGame> {
        tracing::info!(target: "content", "loading embedded game content");
        let catalog = CatalogLoader::parse(EMBEDDED_CATALOG)?;
        let config = ConfigLoader::parse(EMBEDDED_CONFIG, &catalog)?;
        let state = ScenarioLoader::parse(EMBEDDED_SCENARIO)?.build(&catalog, config)?;
        Ok(LoadedGame { catalog, state })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use game_core::{EntityId, TeamId};

    use super::*;

    fn write_data(dir: &Path) {
        fs::write(dir.join("catalog.ron"), EMBEDDED_CATALOG).unwrap();
        fs::write(dir.join("config.toml"), EMBEDDED_CONFIG).unwrap();
        fs::write(dir.join("scenario.ron"), EMBEDDED_SCENARIO).unwrap();
    }

    #[test]
    fn embedded_content_is_consistent() {
        let game = ContentFactory::embedded().expect("embedded content loads");
        assert_eq!(game.state.teams.len(), 2);
        assert!(game.state.check_integrity().is_ok());
        assert_eq!(game.state.world.config.plague.remedies.len(), 3);
        for team in game.state.teams.values() {
            assert!(game.catalog.try_tile(team.home_tile).is_some());
        }
    }

    #[test]
    fn loads_from_a_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_data(dir.path());

        let factory = ContentFactory::new(dir.path());
        let game = factory.load_game().expect("directory content loads");
        let red = game.state.team(&TeamId::from("red")).unwrap();
        assert!(red.researched.contains(&EntityId::from("tec-start")));
        assert_eq!(game.state.game_seed, 20240601);
    }

    #[test]
    fn missing_files_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        write_data(dir.path());
        fs::remove_file(dir.path().join("config.toml")).unwrap();

        let err = ContentFactory::new(dir.path()).load_game().unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"), "{err:#}");
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
