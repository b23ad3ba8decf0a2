//! Scenario loader.
//!
//! A scenario describes the starting position of a game: participating teams
//! with their home tiles and opening balances, buildings already standing and
//! roads already laid. Building the scenario yields the initial
//! [`GameState`]; map and clock always start fresh from the catalog.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, bail, ensure};
use game_core::{
    Catalog, EntityId, GameConfig, GameState, MapState, TeamId, TeamState, TileIndex, WorldState,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    /// Base seed for every random draw of the game.
    pub seed: u64,
    pub teams: Vec<TeamSpec>,
    #[serde(default)]
    pub buildings: Vec<PlacedBuilding>,
    #[serde(default)]
    pub roads: Vec<(TileIndex, TileIndex)>,
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TeamSpec {
    pub id: TeamId,
    pub name: String,
    pub home_tile: TileIndex,
    #[serde(default)]
    pub resources: BTreeMap<EntityId, Decimal>,
    #[serde(default)]
    pub researched: BTreeSet<EntityId>,
    /// Idle armies raised at the home tile.
    #[serde(default)]
    pub armies: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlacedBuilding {
    pub tile: TileIndex,
    pub building: EntityId,
}

impl Scenario {
    /// Builds the initial state for `catalog` under `config`.
    pub fn build(&self, catalog: &Catalog, config: GameConfig) -> LoadResult<GameState> {
        ensure!(!self.teams.is_empty(), "scenario lists no teams");

        let mut world = WorldState::new(config);
        world.counters = self.counters.clone();
        let mut state = GameState::new(self.seed, world, MapState::from_catalog(catalog));

        let mut homes = BTreeSet::new();
        for spec in &self.teams {
            let team = spec
                .build(catalog)
                .with_context(|| format!("Invalid team {}", spec.id))?;
            if !homes.insert(team.home_tile) {
                bail!("tile {} is home to more than one team", team.home_tile);
            }
            if !state.add_team(team) {
                bail!("team {} is listed twice", spec.id);
            }
            for _ in 0..spec.armies {
                state.world.raise_army(&spec.id);
            }
        }

        for placed in &self.buildings {
            ensure!(
                catalog.try_building(&placed.building).is_some(),
                "unknown building {}",
                placed.building
            );
            let Some(tile) = state.map.tile_mut(placed.tile) else {
                bail!("building {} placed on unknown tile {}", placed.building, placed.tile);
            };
            ensure!(
                tile.has_free_parcel(),
                "tile {} has no free parcel for {}",
                placed.tile,
                placed.building
            );
            tile.buildings.insert(placed.building.clone());
        }

        for &(a, b) in &self.roads {
            let adjacent = catalog
                .try_tile(a)
                .is_some_and(|tile| tile.neighbours.contains(&b));
            ensure!(adjacent, "road {a}-{b} does not join neighbouring tiles");
            state.map.add_road(a, b);
        }

        state
            .check_integrity()
            .context("scenario produced an inconsistent state")?;

        tracing::info!(
            target: "content::scenario",
            seed = self.seed,
            teams = state.teams.len(),
            armies = state.world.armies.len(),
            "initial state built"
        );
        Ok(state)
    }
}

impl TeamSpec {
    fn build(&self, catalog: &Catalog) -> LoadResult<TeamState> {
        ensure!(
            catalog.try_tile(self.home_tile).is_some(),
            "home tile {} does not exist",
            self.home_tile
        );

        let mut team = TeamState::new(self.id.clone(), self.name.clone(), self.home_tile);
        for (resource, amount) in &self.resources {
            ensure!(
                catalog.try_resource(resource).is_some(),
                "unknown resource {resource}"
            );
            team.resources
                .set(resource, *amount)
                .with_context(|| format!("opening balance of {resource}"))?;
        }
        for tech in &self.researched {
            ensure!(catalog.try_tech(tech).is_some(), "{tech} is not a technology");
            team.researched.insert(tech.clone());
        }
        Ok(team)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        ron::from_str(content).context("Failed to parse scenario RON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::CatalogLoader;

    fn catalog() -> Catalog {
        CatalogLoader::parse(include_str!("../../data/catalog.ron")).expect("embedded catalog")
    }

    fn scenario(text: &str) -> Scenario {
        ScenarioLoader::parse(text).expect("scenario parses")
    }

    #[test]
    fn builds_teams_armies_and_roads() {
        let scenario = scenario(
            r#"(
                seed: 7,
                teams: [
                    (id: "red", name: "Red", home_tile: 1, resources: {"res-work": 12}, armies: 2),
                    (id: "blue", name: "Blue", home_tile: 6, researched: ["tec-start"]),
                ],
                buildings: [(tile: 2, building: "bui-sawmill")],
                roads: [(1, 2)],
                counters: {"rounds": 1},
            )"#,
        );
        let state = scenario.build(&catalog(), GameConfig::default()).expect("valid scenario");

        assert_eq!(state.game_seed, 7);
        let red = state.team(&TeamId::from("red")).unwrap();
        assert_eq!(red.resources.get(&EntityId::from("res-work")), Decimal::from(12));
        assert_eq!(state.world.armies_of(&TeamId::from("red")).count(), 2);
        assert!(
            state
                .team(&TeamId::from("blue"))
                .unwrap()
                .researched
                .contains(&EntityId::from("tec-start"))
        );
        assert!(state.map.has_road(2, 1));
        assert!(
            state.map.tile(2).unwrap().buildings.contains(&EntityId::from("bui-sawmill"))
        );
        assert_eq!(state.world.counter("rounds"), 1);
    }

    #[test]
    fn rejects_shared_home_tiles() {
        let scenario = scenario(
            r#"(seed: 1, teams: [
                (id: "red", name: "Red", home_tile: 1),
                (id: "blue", name: "Blue", home_tile: 1),
            ])"#,
        );
        let err = scenario.build(&catalog(), GameConfig::default()).unwrap_err();
        assert!(err.to_string().contains("more than one team"), "{err:#}");
    }

    #[test]
    fn rejects_roads_between_distant_tiles() {
        let scenario = scenario(
            r#"(seed: 1, teams: [(id: "red", name: "Red", home_tile: 1)], roads: [(1, 6)])"#,
        );
        assert!(scenario.build(&catalog(), GameConfig::default()).is_err());
    }

    #[test]
    fn team_errors_name_the_team() {
        let scenario = scenario(
            r#"(seed: 1, teams: [
                (id: "red", name: "Red", home_tile: 1, resources: {"res-mana": 3}),
            ])"#,
        );
        let err = scenario.build(&catalog(), GameConfig::default()).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("red") && chain.contains("res-mana"), "{chain}");
    }
}
