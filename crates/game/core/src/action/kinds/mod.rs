//! Argument shapes and behaviors of every built-in action kind.
//!
//! Each file pairs the argument struct players submit with the unit struct
//! implementing [`ActionTransition`](crate::action::ActionTransition) for it.

mod army;
mod building;
mod economy;
mod feeding;
mod operator;
mod plague;
mod research;
mod team;
mod vyroba;

pub use army::{
    ArmyBoost, ArmyBoostArgs, ArmyDeploy, ArmyDeployArgs, ArmyRetreat, ArmyRetreatArgs,
    ArmyUpgrade, ArmyUpgradeArgs,
};
pub use building::{
    BuildingDemolish, BuildingDemolishArgs, BuildingStart, BuildingStartArgs, RoadBuild,
    RoadBuildArgs,
};
pub use economy::{Trade, TradeArgs, Withdraw, WithdrawArgs};
pub use feeding::{Feed, FeedArgs, GranarySet, GranarySetArgs};
pub use operator::{
    ArmyTransfer, ArmyTransferArgs, CounterIncrement, CounterIncrementArgs, Godmode, GodmodeArgs,
    NextTurn, NextTurnArgs,
};
pub use plague::{
    PlagueCure, PlagueCureArgs, PlagueOnset, PlagueOnsetArgs, PlagueRemedy, PlagueRemedyArgs,
};
pub use research::{ResearchStart, ResearchStartArgs};
pub use team::{AttributeAdd, AttributeAddArgs, EmployeesAssign, EmployeesAssignArgs};
pub use vyroba::{Vyroba, VyrobaArgs};

use super::registry::ActionDescriptor;

/// One descriptor per [`ActionKind`](crate::action::ActionKind).
pub fn standard_descriptors() -> Vec<ActionDescriptor> {
    vec![
        ActionDescriptor::of(ResearchStart),
        ActionDescriptor::of(Vyroba),
        ActionDescriptor::of(Trade),
        ActionDescriptor::of(Withdraw),
        ActionDescriptor::of(Feed),
        ActionDescriptor::of(GranarySet),
        ActionDescriptor::of(BuildingStart),
        ActionDescriptor::of(BuildingDemolish),
        ActionDescriptor::of(RoadBuild),
        ActionDescriptor::of(ArmyDeploy),
        ActionDescriptor::of(ArmyBoost),
        ActionDescriptor::of(ArmyRetreat),
        ActionDescriptor::of(ArmyUpgrade),
        ActionDescriptor::of(ArmyTransfer),
        ActionDescriptor::of(AttributeAdd),
        ActionDescriptor::of(EmployeesAssign),
        ActionDescriptor::of(CounterIncrement),
        ActionDescriptor::of(PlagueOnset),
        ActionDescriptor::of(PlagueRemedy),
        ActionDescriptor::of(PlagueCure),
        ActionDescriptor::of(NextTurn),
        ActionDescriptor::of(Godmode),
    ]
}
