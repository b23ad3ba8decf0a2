use std::collections::{BTreeMap, BTreeSet};

use super::{ArmyId, TeamId, TileIndex};
use crate::catalog::Catalog;
use crate::state::EntityId;

/// Mutable per-tile state layered over the catalog's tile templates.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileState {
    pub index: TileIndex,
    pub parcels: u32,
    pub buildings: BTreeSet<EntityId>,
    /// Buildings under construction, by the team that started them.
    pub unfinished: BTreeMap<TeamId, BTreeSet<EntityId>>,
    /// Neighbour tiles connected by a road. Kept symmetric.
    pub roads: BTreeSet<TileIndex>,
    pub occupant: Option<ArmyId>,
}

impl TileState {
    pub fn new(index: TileIndex, parcels: u32) -> Self {
        Self {
            index,
            parcels,
            ..Self::default()
        }
    }

    pub fn used_parcels(&self) -> u32 {
        let unfinished: usize = self.unfinished.values().map(BTreeSet::len).sum();
        u32::try_from(self.buildings.len() + unfinished).unwrap_or(u32::MAX)
    }

    pub fn has_free_parcel(&self) -> bool {
        self.used_parcels() < self.parcels
    }

    pub fn is_over_capacity(&self) -> bool {
        self.used_parcels() > self.parcels
    }

    pub fn is_unfinished(&self, team: &TeamId, building: &EntityId) -> bool {
        self.unfinished
            .get(team)
            .is_some_and(|set| set.contains(building))
    }

    /// Removes an unfinished building, dropping the team entry once empty.
    pub fn take_unfinished(&mut self, team: &TeamId, building: &EntityId) -> bool {
        let Some(set) = self.unfinished.get_mut(team) else {
            return false;
        };
        let removed = set.remove(building);
        if set.is_empty() {
            self.unfinished.remove(team);
        }
        removed
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapState {
    pub tiles: BTreeMap<TileIndex, TileState>,
}

impl MapState {
    /// One empty tile state per catalog template.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            tiles: catalog
                .tiles()
                .map(|template| {
                    (
                        template.index,
                        TileState::new(template.index, template.parcels),
                    )
                })
                .collect(),
        }
    }

    pub fn tile(&self, index: TileIndex) -> Option<&TileState> {
        self.tiles.get(&index)
    }

    pub fn tile_mut(&mut self, index: TileIndex) -> Option<&mut TileState> {
        self.tiles.get_mut(&index)
    }

    pub fn has_road(&self, a: TileIndex, b: TileIndex) -> bool {
        self.tile(a).is_some_and(|tile| tile.roads.contains(&b))
    }

    /// Connects two tiles in both directions. Returns false if a tile is missing.
    pub fn add_road(&mut self, a: TileIndex, b: TileIndex) -> bool {
        if !self.tiles.contains_key(&a) || !self.tiles.contains_key(&b) {
            return false;
        }
        if let Some(tile) = self.tile_mut(a) {
            tile.roads.insert(b);
        }
        if let Some(tile) = self.tile_mut(b) {
            tile.roads.insert(a);
        }
        true
    }

    pub fn occupant_of(&self, index: TileIndex) -> Option<&ArmyId> {
        self.tile(index).and_then(|tile| tile.occupant.as_ref())
    }
}
