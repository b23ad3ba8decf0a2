//! Content loaders for reading game data from files.
//!
//! Every loader offers `load(path)` for files on disk and `parse(text)` for
//! embedded or in-memory content.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod scenario;

pub use catalog::CatalogLoader;
pub use config::ConfigLoader;
pub use factory::{ContentFactory, LoadedGame};
pub use scenario::{PlacedBuilding, Scenario, ScenarioLoader, TeamSpec};

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}
