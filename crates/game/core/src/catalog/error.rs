use crate::action::ActionKind;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, TileIndex};

/// Malformed reference data or action registration.
///
/// Raised only while a game instance is being set up; a game never starts
/// with a catalog that produced one of these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate entity id {id}")]
    DuplicateId { id: EntityId },

    #[error("duplicate tile index {index}")]
    DuplicateTile { index: TileIndex },

    #[error("{owner} references unknown entity {target}")]
    MissingReference { owner: EntityId, target: EntityId },

    #[error("{owner} references {target}, which has the wrong kind (expected {expected})")]
    WrongReferenceKind {
        owner: EntityId,
        target: EntityId,
        expected: &'static str,
    },

    #[error("tile {tile} lists unknown neighbour {neighbour}")]
    MissingNeighbour { tile: TileIndex, neighbour: TileIndex },

    #[error("tiles {a} and {b} disagree about being neighbours")]
    AsymmetricNeighbours { a: TileIndex, b: TileIndex },

    #[error("tile {index} has no parcels")]
    EmptyTile { index: TileIndex },

    #[error("{owner} requires {dots} dots with {dice} allowed dice")]
    DicePairing {
        owner: EntityId,
        dots: u32,
        dice: usize,
    },

    #[error("recipe {vyroba} must yield a positive amount")]
    InvalidReward { vyroba: EntityId },

    #[error("{owner} lists a negative cost for {resource}")]
    NegativeCost { owner: EntityId, resource: EntityId },

    #[error("config field {field} references unknown resource {id}")]
    MissingConfigResource { field: &'static str, id: EntityId },

    #[error("config field {field} is invalid: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("action kind {kind} is registered more than once")]
    DuplicateBehavior { kind: ActionKind },

    #[error("action kind {kind} has no registered behavior")]
    MissingBehavior { kind: ActionKind },

    #[error("action kind {kind} has inconsistent capabilities: {reason}")]
    InconsistentCapabilities {
        kind: ActionKind,
        reason: &'static str,
    },
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "CATALOG_DUPLICATE_ID",
            Self::DuplicateTile { .. } => "CATALOG_DUPLICATE_TILE",
            Self::MissingReference { .. } => "CATALOG_MISSING_REFERENCE",
            Self::WrongReferenceKind { .. } => "CATALOG_WRONG_REFERENCE_KIND",
            Self::MissingNeighbour { .. } => "CATALOG_MISSING_NEIGHBOUR",
            Self::AsymmetricNeighbours { .. } => "CATALOG_ASYMMETRIC_NEIGHBOURS",
            Self::EmptyTile { .. } => "CATALOG_EMPTY_TILE",
            Self::DicePairing { .. } => "CATALOG_DICE_PAIRING",
            Self::InvalidReward { .. } => "CATALOG_INVALID_REWARD",
            Self::NegativeCost { .. } => "CATALOG_NEGATIVE_COST",
            Self::MissingConfigResource { .. } => "CONFIG_MISSING_RESOURCE",
            Self::InvalidConfig { .. } => "CONFIG_INVALID",
            Self::DuplicateBehavior { .. } => "REGISTRY_DUPLICATE_BEHAVIOR",
            Self::MissingBehavior { .. } => "REGISTRY_MISSING_BEHAVIOR",
            Self::InconsistentCapabilities { .. } => "REGISTRY_INCONSISTENT_CAPABILITIES",
        }
    }
}
