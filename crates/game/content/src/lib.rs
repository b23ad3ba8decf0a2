//! Data-driven content definitions and loaders.
//!
//! This crate houses the static game content and the loaders that turn it
//! into core types:
//! - Entity catalog (`catalog.ron`, RON)
//! - World tunables (`config.toml`, TOML)
//! - Starting position (`scenario.ron`, RON)
//!
//! The default data set is embedded at compile time, so a game can start
//! without a data directory. Loaders validate everything up front; a game
//! never starts from inconsistent content.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, ConfigLoader, ContentFactory, LoadResult, LoadedGame, PlacedBuilding,
    Scenario, ScenarioLoader, TeamSpec,
};
