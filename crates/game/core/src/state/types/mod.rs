pub mod army;
pub mod common;
pub mod ledger;
pub mod map;
pub mod team;
pub mod world;

pub use army::{Army, ArmyGoal, ArmyId, ArmyMode, ParseArmyIdError};
pub use common::{EntityId, TeamId, Tick, TileIndex};
pub use ledger::{LedgerError, ResourceLedger};
pub use map::{MapState, TileState};
pub use team::TeamState;
pub use world::WorldState;
