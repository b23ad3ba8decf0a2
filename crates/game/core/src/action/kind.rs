//! Action kind enumeration and the matching argument shapes.
//!
//! Each kind has exactly one argument struct. The pairing is generated in one
//! place so the two enums cannot drift apart.

use super::kinds::{
    ArmyBoostArgs, ArmyDeployArgs, ArmyRetreatArgs, ArmyTransferArgs, ArmyUpgradeArgs,
    AttributeAddArgs, BuildingDemolishArgs, BuildingStartArgs, CounterIncrementArgs,
    EmployeesAssignArgs, FeedArgs, GodmodeArgs, GranarySetArgs, NextTurnArgs, PlagueCureArgs,
    PlagueOnsetArgs, PlagueRemedyArgs, ResearchStartArgs, RoadBuildArgs, TradeArgs, VyrobaArgs,
    WithdrawArgs,
};

/// Argument struct bound to exactly one [`ActionKind`].
pub trait ActionArguments: Sized {
    const KIND: ActionKind;

    /// Borrows the typed arguments out of the tagged enum.
    fn extract(args: &ActionArgs) -> Option<&Self>;
}

macro_rules! define_actions {
    ($($(#[$doc:meta])* $variant:ident($args:ty)),* $(,)?) => {
        /// Every action the engine can run.
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
            strum::Display, strum::EnumString, strum::EnumIter, strum::IntoStaticStr,
        )]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
        #[strum(serialize_all = "snake_case")]
        pub enum ActionKind {
            $($(#[$doc])* $variant,)*
        }

        /// Tagged arguments: `{"kind": "<kind>", "args": {...}}` on the wire.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(
            feature = "serde",
            serde(tag = "kind", content = "args", rename_all = "snake_case")
        )]
        pub enum ActionArgs {
            $($variant($args),)*
        }

        impl ActionArgs {
            pub fn kind(&self) -> ActionKind {
                match self {
                    $(Self::$variant(_) => ActionKind::$variant,)*
                }
            }
        }

        $(
            impl ActionArguments for $args {
                const KIND: ActionKind = ActionKind::$variant;

                fn extract(args: &ActionArgs) -> Option<&Self> {
                    match args {
                        ActionArgs::$variant(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }

            impl From<$args> for ActionArgs {
                fn from(args: $args) -> Self {
                    Self::$variant(args)
                }
            }
        )*
    };
}

define_actions! {
    /// Start researching a technology; it completes after its research time.
    ResearchStart(ResearchStartArgs),
    /// Run a production recipe; the yield lands after the production time.
    Vyroba(VyrobaArgs),
    /// Hand production resources to another team.
    Trade(TradeArgs),
    /// Take materials out of storage for physical hand-out.
    Withdraw(WithdrawArgs),
    /// Feed residents once per turn.
    Feed(FeedArgs),
    /// Set the standing granary allocation for one food resource.
    GranarySet(GranarySetArgs),
    BuildingStart(BuildingStartArgs),
    BuildingDemolish(BuildingDemolishArgs),
    RoadBuild(RoadBuildArgs),
    ArmyDeploy(ArmyDeployArgs),
    ArmyBoost(ArmyBoostArgs),
    ArmyRetreat(ArmyRetreatArgs),
    ArmyUpgrade(ArmyUpgradeArgs),
    /// Operator: hand an idle army to another team.
    ArmyTransfer(ArmyTransferArgs),
    AttributeAdd(AttributeAddArgs),
    EmployeesAssign(EmployeesAssignArgs),
    /// Operator: adjust a global counter.
    CounterIncrement(CounterIncrementArgs),
    PlagueOnset(PlagueOnsetArgs),
    PlagueRemedy(PlagueRemedyArgs),
    /// Operator: end an epidemic.
    PlagueCure(PlagueCureArgs),
    /// Operator: advance the world to the next turn.
    NextTurn(NextTurnArgs),
    /// Operator: merge a hand-edited snapshot.
    Godmode(GodmodeArgs),
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip_through_strings() {
        for kind in ActionKind::iter() {
            assert_eq!(ActionKind::from_str(kind.as_str()), Ok(kind));
        }
        assert_eq!(ActionKind::ResearchStart.as_str(), "research_start");
        assert!(ActionKind::from_str("teleport").is_err());
    }

    #[test]
    fn arguments_know_their_kind() {
        let args: ActionArgs = PlagueCureArgs::default().into();
        assert_eq!(args.kind(), ActionKind::PlagueCure);
        assert!(PlagueCureArgs::extract(&args).is_some());
        assert!(NextTurnArgs::extract(&args).is_none());
    }
}
