//! Structural comparison of two state snapshots.
//!
//! A [`StateDiff`] records *which* parts changed at world / tile / team
//! granularity; the values themselves are read from the snapshots. Godmode
//! merges and external observers use it to tell what an action touched.
mod bitmask;
mod changes;
mod collection;

pub use bitmask::{TeamFields, TileFields, WorldFields};
pub use changes::{TeamChanges, TileChanges};
pub use collection::CollectionDelta;

use collection::diff_collection;

use crate::state::{GameState, TeamId, TileIndex};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDiff {
    pub world: WorldFields,
    pub tiles: CollectionDelta<TileIndex, TileChanges>,
    pub teams: CollectionDelta<TeamId, TeamChanges>,
    /// Pending effects were added or consumed.
    pub scheduler: bool,
}

impl StateDiff {
    pub fn between(before: &GameState, after: &GameState) -> Self {
        Self {
            world: changes::world_fields(&before.world, &after.world),
            tiles: diff_collection(&before.map.tiles, &after.map.tiles, |_, a, b| {
                TileChanges::from_states(a, b)
            }),
            teams: diff_collection(&before.teams, &after.teams, |_, a, b| {
                TeamChanges::from_states(a, b)
            }),
            scheduler: before.scheduler != after.scheduler,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty() && self.tiles.is_empty() && self.teams.is_empty() && !self.scheduler
    }

    /// Teams added, removed or updated.
    pub fn touched_teams(&self) -> impl Iterator<Item = &TeamId> {
        self.teams
            .added
            .iter()
            .chain(self.teams.removed.iter())
            .chain(self.teams.updated.iter().map(|change| &change.id))
    }
}
