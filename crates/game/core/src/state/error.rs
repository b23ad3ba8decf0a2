//! Broken state invariants.
//!
//! An [`IntegrityViolation`] means the engine (or an operator edit) produced
//! a state that must never exist. The request that produced it is aborted as
//! a whole and the previous state stays in place.

use rust_decimal::Decimal;

use crate::action::ActionKind;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ArmyId, EntityId, TeamId, TileIndex};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IntegrityViolation {
    #[error("team {team} holds negative {ledger} balance {amount} of {resource}")]
    NegativeBalance {
        team: TeamId,
        ledger: &'static str,
        resource: EntityId,
        amount: Decimal,
    },

    #[error("army {army} is recorded on tile {tile} but the tile does not hold it")]
    OccupancyMismatch { army: ArmyId, tile: TileIndex },

    #[error("tile {tile} is held by {army}, which does not occupy it")]
    StaleOccupant { tile: TileIndex, army: ArmyId },

    #[error("army {army} is owned by unknown team {owner}")]
    UnknownOwner { army: ArmyId, owner: TeamId },

    #[error("road between {a} and {b} is one-sided")]
    AsymmetricRoad { a: TileIndex, b: TileIndex },

    #[error("{kind} computed {dots} dots with {dice} allowed dice")]
    InvalidDicePairing {
        kind: ActionKind,
        dots: u32,
        dice: usize,
    },

    #[error("pending effect {seq} belongs to unknown team {team}")]
    UnknownTeam { seq: u64, team: TeamId },

    #[error("team {team} has {sick} sick and {immune} immune out of {population} residents")]
    PlagueExceedsPopulation {
        team: TeamId,
        sick: u32,
        immune: u32,
        population: u32,
    },
}

impl GameError for IntegrityViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeBalance { .. } => "INTEGRITY_NEGATIVE_BALANCE",
            Self::OccupancyMismatch { .. } => "INTEGRITY_OCCUPANCY_MISMATCH",
            Self::StaleOccupant { .. } => "INTEGRITY_STALE_OCCUPANT",
            Self::UnknownOwner { .. } => "INTEGRITY_UNKNOWN_OWNER",
            Self::AsymmetricRoad { .. } => "INTEGRITY_ASYMMETRIC_ROAD",
            Self::InvalidDicePairing { .. } => "INTEGRITY_INVALID_DICE_PAIRING",
            Self::UnknownTeam { .. } => "INTEGRITY_UNKNOWN_TEAM",
            Self::PlagueExceedsPopulation { .. } => "INTEGRITY_PLAGUE_EXCEEDS_POPULATION",
        }
    }
}
