use crate::state::types::{TeamState, TileState, WorldState};
use crate::state::{TeamId, TileIndex};

use super::bitmask::{TeamFields, TileFields, WorldFields};

/// Which fields of one team changed. Values stay in the snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamChanges {
    pub id: TeamId,
    pub fields: TeamFields,
}

impl TeamChanges {
    /// Returns `None` if no fields changed.
    pub(super) fn from_states(before: &TeamState, after: &TeamState) -> Option<Self> {
        let mut fields = TeamFields::empty();

        if before.resources != after.resources {
            fields |= TeamFields::RESOURCES;
        }
        if before.researched != after.researched || before.researching != after.researching {
            fields |= TeamFields::RESEARCH;
        }
        if before.granary != after.granary {
            fields |= TeamFields::GRANARY;
        }
        if before.storage != after.storage {
            fields |= TeamFields::STORAGE;
        }
        if before.attributes != after.attributes {
            fields |= TeamFields::ATTRIBUTES;
        }
        if before.employees != after.employees {
            fields |= TeamFields::EMPLOYEES;
        }
        if before.last_fed_turn != after.last_fed_turn {
            fields |= TeamFields::FED;
        }
        if before.plague != after.plague {
            fields |= TeamFields::PLAGUE;
        }
        if before.name != after.name || before.home_tile != after.home_tile {
            fields |= TeamFields::PROFILE;
        }

        (!fields.is_empty()).then(|| Self {
            id: after.id.clone(),
            fields,
        })
    }
}

/// Which fields of one tile changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileChanges {
    pub index: TileIndex,
    pub fields: TileFields,
}

impl TileChanges {
    pub(super) fn from_states(before: &TileState, after: &TileState) -> Option<Self> {
        let mut fields = TileFields::empty();

        if before.buildings != after.buildings {
            fields |= TileFields::BUILDINGS;
        }
        if before.unfinished != after.unfinished {
            fields |= TileFields::UNFINISHED;
        }
        if before.roads != after.roads {
            fields |= TileFields::ROADS;
        }
        if before.occupant != after.occupant {
            fields |= TileFields::OCCUPANT;
        }
        if before.parcels != after.parcels {
            fields |= TileFields::PARCELS;
        }

        (!fields.is_empty()).then_some(Self {
            index: after.index,
            fields,
        })
    }
}

pub(super) fn world_fields(before: &WorldState, after: &WorldState) -> WorldFields {
    let mut fields = WorldFields::empty();
    if before.turn != after.turn {
        fields |= WorldFields::TURN;
    }
    if before.clock != after.clock {
        fields |= WorldFields::CLOCK;
    }
    if before.counters != after.counters {
        fields |= WorldFields::COUNTERS;
    }
    if before.config != after.config {
        fields |= WorldFields::CONFIG;
    }
    if before.armies != after.armies {
        fields |= WorldFields::ARMIES;
    }
    fields
}
