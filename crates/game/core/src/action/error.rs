//! Recoverable action failures.
//!
//! Every variant names the teams and entities involved, so the rendered
//! message can be shown to the organizer without further lookups.

use rust_decimal::Decimal;

use super::ActionKind;
use crate::cost::AmountOverflow;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ArmyId, ArmyMode, EntityId, LedgerError, TeamId, TileIndex};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionRejected {
    // ===== request shape =====
    #[error("{kind} needs an acting team")]
    MissingTeam { kind: ActionKind },

    #[error("team {team} does not exist")]
    UnknownTeam { team: TeamId },

    #[error("arguments of {got} cannot drive {expected}")]
    ArgumentShape { expected: ActionKind, got: ActionKind },

    #[error("unknown entity {id}")]
    UnknownEntity { id: EntityId },

    #[error("unknown tile {tile}")]
    UnknownTile { tile: TileIndex },

    #[error("unknown army {army}")]
    UnknownArmy { army: ArmyId },

    #[error("{resource}: amount {amount} must be positive")]
    NonPositiveAmount { resource: EntityId, amount: Decimal },

    #[error("count must be at least one")]
    ZeroCount,

    #[error("nothing to transfer")]
    EmptyTransfer,

    #[error(transparent)]
    Overflow(#[from] AmountOverflow),

    // ===== economy =====
    #[error("team {team} cannot pay: {source}")]
    Insufficient {
        team: TeamId,
        #[source]
        source: LedgerError,
    },

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("team {team} has not unlocked {entity}")]
    NotAvailable { team: TeamId, entity: EntityId },

    #[error("team {team} owns none of the dice allowed for {kind}")]
    DiceUnavailable { team: TeamId, kind: ActionKind },

    #[error("a throw of at least {required} dots is required")]
    RollMissing { required: u32 },

    #[error("die {die} may not be thrown for this action")]
    RollNotAllowed { die: EntityId },

    #[error("team {team} does not own die {die}")]
    DieNotOwned { team: TeamId, die: EntityId },

    #[error("throw of {dots} dots does not reach the required {required}")]
    RollTooLow { dots: u32, required: u32 },

    #[error("{resource} is not tradable")]
    NotTradable { resource: EntityId },

    #[error("{resource} is not food")]
    NotFood { resource: EntityId },

    #[error("{resource} is not a material")]
    NotMaterial { resource: EntityId },

    #[error("team {team} cannot trade with itself")]
    SelfTrade { team: TeamId },

    // ===== research =====
    #[error("team {team} already researched {tech}")]
    AlreadyResearched { team: TeamId, tech: EntityId },

    #[error("team {team} is already researching {tech}")]
    AlreadyResearching { team: TeamId, tech: EntityId },

    #[error("team {team} is not researching {tech}")]
    NotResearching { team: TeamId, tech: EntityId },

    // ===== map =====
    #[error("team {team} does not control tile {tile}")]
    NotControlled { team: TeamId, tile: TileIndex },

    #[error("tile {tile} has no free parcel")]
    NoFreeParcel { tile: TileIndex },

    #[error("{building} already stands on tile {tile}")]
    BuildingPresent { tile: TileIndex, building: EntityId },

    #[error("{building} is already under construction on tile {tile}")]
    BuildingUnderConstruction { tile: TileIndex, building: EntityId },

    #[error("{building} does not stand on tile {tile}")]
    BuildingMissing { tile: TileIndex, building: EntityId },

    #[error("recipe {vyroba} must run on a tile with {building}")]
    TileRequired { vyroba: EntityId, building: EntityId },

    #[error("tiles {from} and {to} are not neighbours")]
    NotAdjacent { from: TileIndex, to: TileIndex },

    #[error("a road between {from} and {to} already exists")]
    RoadExists { from: TileIndex, to: TileIndex },

    #[error("tile {to} cannot be reached from {from}")]
    Unreachable { from: TileIndex, to: TileIndex },

    // ===== armies =====
    #[error("army {army} does not belong to team {team}")]
    NotArmyOwner { team: TeamId, army: ArmyId },

    #[error("army {army} is {mode}, expected {expected}")]
    WrongArmyMode {
        army: ArmyId,
        mode: ArmyMode,
        expected: ArmyMode,
    },

    #[error("army {army} carries at most {capacity} equipment, {requested} requested")]
    EquipmentOverCapacity {
        army: ArmyId,
        requested: u32,
        capacity: u32,
    },

    #[error("army {army} needs equipment for this goal")]
    NoEquipment { army: ArmyId },

    #[error("army {army} is on a supply run and cannot be boosted")]
    SupplyCannotBoost { army: ArmyId },

    #[error("army {army} is already boosted")]
    BoostAlreadySet { army: ArmyId },

    #[error("boost must be at least one")]
    ZeroBoost,

    #[error("army {army} is already at the top level {level}")]
    MaxLevel { army: ArmyId, level: u32 },

    #[error("army {army} already belongs to team {team}")]
    SameOwner { army: ArmyId, team: TeamId },

    // ===== population, plague, misc =====
    #[error("team {team} may not {kind} while afflicted by plague")]
    Afflicted { team: TeamId, kind: ActionKind },

    #[error("team {team} is not afflicted")]
    NotAfflicted { team: TeamId },

    #[error("team {team} is already afflicted")]
    AlreadyAfflicted { team: TeamId },

    #[error("unknown remedy {remedy}")]
    UnknownRemedy { remedy: String },

    #[error("team {team} already applied remedy {remedy}")]
    RemedyApplied { team: TeamId, remedy: String },

    #[error("team {team} was already fed in turn {turn}")]
    AlreadyFed { team: TeamId, turn: u32 },

    #[error("team {team} already has attribute {attribute}")]
    AttributeOwned { team: TeamId, attribute: EntityId },

    #[error("recipe {vyroba} cannot be automated")]
    NotAutomatable { vyroba: EntityId },

    #[error("team {team} would employ {requested} of {population} residents")]
    TooManyEmployees {
        team: TeamId,
        requested: u32,
        population: u32,
    },

    #[error("world config is invalid: {reason}")]
    InvalidConfig { reason: String },

    #[error("counter {counter} at {value} cannot change by {delta}")]
    CounterUnderflow {
        counter: String,
        value: u64,
        delta: i64,
    },
}

impl GameError for ActionRejected {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingTeam { .. }
            | Self::UnknownTeam { .. }
            | Self::ArgumentShape { .. }
            | Self::UnknownEntity { .. }
            | Self::UnknownTile { .. }
            | Self::UnknownArmy { .. }
            | Self::NonPositiveAmount { .. }
            | Self::ZeroCount
            | Self::ZeroBoost
            | Self::EmptyTransfer
            | Self::Overflow(_)
            | Self::Ledger(LedgerError::Overflow(_))
            | Self::NotTradable { .. }
            | Self::NotFood { .. }
            | Self::NotMaterial { .. }
            | Self::SelfTrade { .. }
            | Self::UnknownRemedy { .. }
            | Self::InvalidConfig { .. }
            | Self::NotAdjacent { .. } => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTeam { .. } => "ACTION_MISSING_TEAM",
            Self::UnknownTeam { .. } => "ACTION_UNKNOWN_TEAM",
            Self::ArgumentShape { .. } => "ACTION_ARGUMENT_SHAPE",
            Self::UnknownEntity { .. } => "ACTION_UNKNOWN_ENTITY",
            Self::UnknownTile { .. } => "ACTION_UNKNOWN_TILE",
            Self::UnknownArmy { .. } => "ACTION_UNKNOWN_ARMY",
            Self::NonPositiveAmount { .. } => "ACTION_NON_POSITIVE_AMOUNT",
            Self::ZeroCount => "ACTION_ZERO_COUNT",
            Self::EmptyTransfer => "ACTION_EMPTY_TRANSFER",
            Self::Overflow(_) | Self::Ledger(LedgerError::Overflow(_)) => "ACTION_AMOUNT_OVERFLOW",
            Self::Insufficient { .. } => "ACTION_INSUFFICIENT_RESOURCES",
            Self::Ledger(_) => "ACTION_LEDGER",
            Self::NotAvailable { .. } => "ACTION_NOT_AVAILABLE",
            Self::DiceUnavailable { .. } => "ACTION_DICE_UNAVAILABLE",
            Self::RollMissing { .. } => "ACTION_ROLL_MISSING",
            Self::RollNotAllowed { .. } => "ACTION_ROLL_NOT_ALLOWED",
            Self::DieNotOwned { .. } => "ACTION_DIE_NOT_OWNED",
            Self::RollTooLow { .. } => "ACTION_ROLL_TOO_LOW",
            Self::NotTradable { .. } => "ACTION_NOT_TRADABLE",
            Self::NotFood { .. } => "ACTION_NOT_FOOD",
            Self::NotMaterial { .. } => "ACTION_NOT_MATERIAL",
            Self::SelfTrade { .. } => "ACTION_SELF_TRADE",
            Self::AlreadyResearched { .. } => "ACTION_ALREADY_RESEARCHED",
            Self::AlreadyResearching { .. } => "ACTION_ALREADY_RESEARCHING",
            Self::NotResearching { .. } => "ACTION_NOT_RESEARCHING",
            Self::NotControlled { .. } => "ACTION_TILE_NOT_CONTROLLED",
            Self::NoFreeParcel { .. } => "ACTION_NO_FREE_PARCEL",
            Self::BuildingPresent { .. } => "ACTION_BUILDING_PRESENT",
            Self::BuildingUnderConstruction { .. } => "ACTION_BUILDING_UNDER_CONSTRUCTION",
            Self::BuildingMissing { .. } => "ACTION_BUILDING_MISSING",
            Self::TileRequired { .. } => "ACTION_TILE_REQUIRED",
            Self::NotAdjacent { .. } => "ACTION_NOT_ADJACENT",
            Self::RoadExists { .. } => "ACTION_ROAD_EXISTS",
            Self::Unreachable { .. } => "ACTION_UNREACHABLE",
            Self::NotArmyOwner { .. } => "ACTION_NOT_ARMY_OWNER",
            Self::WrongArmyMode { .. } => "ACTION_WRONG_ARMY_MODE",
            Self::EquipmentOverCapacity { .. } => "ACTION_EQUIPMENT_OVER_CAPACITY",
            Self::NoEquipment { .. } => "ACTION_NO_EQUIPMENT",
            Self::SupplyCannotBoost { .. } => "ACTION_SUPPLY_CANNOT_BOOST",
            Self::BoostAlreadySet { .. } => "ACTION_BOOST_ALREADY_SET",
            Self::ZeroBoost => "ACTION_ZERO_BOOST",
            Self::MaxLevel { .. } => "ACTION_MAX_LEVEL",
            Self::SameOwner { .. } => "ACTION_SAME_OWNER",
            Self::Afflicted { .. } => "ACTION_AFFLICTED",
            Self::NotAfflicted { .. } => "ACTION_NOT_AFFLICTED",
            Self::AlreadyAfflicted { .. } => "ACTION_ALREADY_AFFLICTED",
            Self::UnknownRemedy { .. } => "ACTION_UNKNOWN_REMEDY",
            Self::RemedyApplied { .. } => "ACTION_REMEDY_APPLIED",
            Self::AlreadyFed { .. } => "ACTION_ALREADY_FED",
            Self::AttributeOwned { .. } => "ACTION_ATTRIBUTE_OWNED",
            Self::NotAutomatable { .. } => "ACTION_NOT_AUTOMATABLE",
            Self::TooManyEmployees { .. } => "ACTION_TOO_MANY_EMPLOYEES",
            Self::InvalidConfig { .. } => "ACTION_INVALID_CONFIG",
            Self::CounterUnderflow { .. } => "ACTION_COUNTER_UNDERFLOW",
        }
    }
}

/// Hard validation: aborts the action when `condition` does not hold.
#[inline]
pub fn ensure(
    condition: bool,
    error: impl FnOnce() -> ActionRejected,
) -> Result<(), ActionRejected> {
    if condition { Ok(()) } else { Err(error()) }
}
