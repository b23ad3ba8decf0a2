use bitflags::bitflags;

bitflags! {
    /// Tracks which fields of a [`TeamState`](crate::state::TeamState) changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TeamFields: u16 {
        const RESOURCES   = 1 << 0;
        const RESEARCH    = 1 << 1;
        const GRANARY     = 1 << 2;
        const STORAGE     = 1 << 3;
        const ATTRIBUTES  = 1 << 4;
        const EMPLOYEES   = 1 << 5;
        const FED         = 1 << 6;
        const PLAGUE      = 1 << 7;
        const PROFILE     = 1 << 8;
    }
}

bitflags! {
    /// Tracks which fields of a [`TileState`](crate::state::TileState) changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFields: u8 {
        const BUILDINGS  = 1 << 0;
        const UNFINISHED = 1 << 1;
        const ROADS      = 1 << 2;
        const OCCUPANT   = 1 << 3;
        const PARCELS    = 1 << 4;
    }
}

bitflags! {
    /// Tracks which fields of [`WorldState`](crate::state::WorldState) changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WorldFields: u8 {
        const TURN     = 1 << 0;
        const CLOCK    = 1 << 1;
        const COUNTERS = 1 << 2;
        const CONFIG   = 1 << 3;
        const ARMIES   = 1 << 4;
    }
}
