//! Deterministic rules of the live strategy game.
//!
//! `game-core` defines the canonical rules (catalog, action kinds, engine,
//! world state) and exposes pure APIs reused by the runtime and the content
//! loaders. All state mutation flows through [`engine::GameEngine`], and
//! supporting crates depend on the types re-exported here.
pub mod action;
pub mod catalog;
pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod plague;
pub mod rng;
pub mod scheduler;
pub mod state;

pub use action::{
    ActionArgs, ActionKind, ActionRegistry, ActionRejected, ActionResult, ActionStatus,
    ActionTransition, Capabilities, Message, MessageLevel,
};
pub use catalog::{Catalog, CatalogError, RawTables, ResourceClass};
pub use config::{GameConfig, PlagueConfig, RemedySpec};
pub use cost::{AmountOverflow, DicePairingError, DiceRequirement, DiceRoll, ResourceCost};
pub use engine::{
    ActionQuote, ActionRequest, ExecuteError, GameEngine, InitiatedAction, TickReport,
    TransitionPhase, TransitionPhaseError,
};
pub use error::{ErrorSeverity, GameError};
pub use plague::PlagueStats;
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use scheduler::{PendingEffect, Scheduler};
pub use state::{
    Army, ArmyGoal, ArmyId, ArmyMode, EntityId, GameState, IntegrityViolation, LedgerError,
    MapState, ResourceLedger, StateDiff, TeamId, TeamState, Tick, TileIndex, TileState,
    WorldState,
};
