use rust_decimal::Decimal;

use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::catalog::{Catalog, ResourceClass, ResourceEntity};
use crate::cost::ResourceCost;
use crate::state::TeamId;

/// Every listed amount is positive and names a known resource.
fn check_amounts<'a>(
    catalog: &'a Catalog,
    resources: &ResourceCost,
) -> Result<Vec<&'a ResourceEntity>, ActionRejected> {
    ensure(!resources.is_empty(), || ActionRejected::EmptyTransfer)?;
    resources
        .iter()
        .map(|(id, amount)| {
            ensure(*amount > Decimal::ZERO, || ActionRejected::NonPositiveAmount {
                resource: id.clone(),
                amount: *amount,
            })?;
            catalog
                .try_resource(id)
                .ok_or_else(|| ActionRejected::UnknownEntity { id: id.clone() })
        })
        .collect()
}

fn describe(resources: &ResourceCost) -> String {
    resources
        .iter()
        .map(|(id, amount)| format!("{amount} {id}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradeArgs {
    pub receiver: TeamId,
    pub resources: ResourceCost,
}

/// Hands production resources to another team.
pub struct Trade;

impl ActionTransition for Trade {
    type Args = TradeArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &TradeArgs, _ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(args.resources.clone())
    }

    fn initiate_check(&self, args: &TradeArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let sender = ctx.team_id()?;
        ctx.other_team(&args.receiver)?;
        ensure(sender != &args.receiver, || ActionRejected::SelfTrade {
            team: sender.clone(),
        })?;
        for resource in check_amounts(ctx.catalog, &args.resources)? {
            ensure(resource.is_tradable(), || ActionRejected::NotTradable {
                resource: resource.id.clone(),
            })?;
        }
        Ok(())
    }

    fn commit(&self, args: &TradeArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let sender = ctx.team_id()?;
        ctx.team_named_mut(&args.receiver)?
            .resources
            .receive_all(&args.resources)?;

        let goods = describe(&args.resources);
        ctx.info(
            Message::info("trade.sent", format!("Sent {goods} to {}", args.receiver))
                .with_ref(&args.receiver),
        );
        ctx.notify(
            &args.receiver,
            Message::info("trade.received", format!("Received {goods} from {sender}"))
                .with_ref(&sender),
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WithdrawArgs {
    pub resources: ResourceCost,
}

/// Takes materials out of storage for physical hand-out.
pub struct Withdraw;

impl ActionTransition for Withdraw {
    type Args = WithdrawArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &WithdrawArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        let units = args.resources.total()?;
        Ok(ctx.config().withdraw_cost.scaled(units)?)
    }

    fn initiate_check(&self, args: &WithdrawArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        for resource in check_amounts(ctx.catalog, &args.resources)? {
            ensure(resource.class() == ResourceClass::Material, || {
                ActionRejected::NotMaterial {
                    resource: resource.id.clone(),
                }
            })?;
        }
        team.storage
            .can_afford(&args.resources)
            .map_err(|source| ActionRejected::Insufficient {
                team: team.id.clone(),
                source,
            })
    }

    fn commit(&self, args: &WithdrawArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team_mut()?;
        let id = team.id.clone();
        team.storage
            .spend(&args.resources)
            .map_err(|source| ActionRejected::Insufficient {
                team: id.clone(),
                source,
            })?;

        let message = Message::info(
            "withdraw.ready",
            format!("Hand out {} to {id}", describe(&args.resources)),
        )
        .with_ref(&id);
        ctx.info(message.clone());
        ctx.notify(&id, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionStatus;
    use crate::engine::ActionRequest;
    use crate::engine::testing::Harness;
    use crate::error::GameError;

    fn five_grain() -> TradeArgs {
        TradeArgs {
            receiver: "blue".into(),
            resources: ResourceCost::new().with("pro-grain", Decimal::from(5)),
        }
    }

    fn first_error(result: &crate::action::ActionResult) -> Option<&str> {
        result.errors().next().map(|m| m.template.as_str())
    }

    #[test]
    fn trade_moves_resources_and_notifies_receiver_once() {
        let mut harness = Harness::new();
        let result = harness.submit("red", five_grain());

        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.balance("red", "pro-grain"), Decimal::from(15));
        assert_eq!(harness.balance("blue", "pro-grain"), Decimal::from(25));
        assert_eq!(result.notifications.len(), 1);
        assert_eq!(result.notifications[&TeamId::from("blue")].len(), 1);
    }

    #[test]
    fn trade_rejects_bad_transfers() {
        let mut harness = Harness::new();
        let mut to_self = five_grain();
        to_self.receiver = "red".into();
        assert_eq!(first_error(&harness.submit("red", to_self)), Some("ACTION_SELF_TRADE"));

        let mut unknown = five_grain();
        unknown.receiver = "green".into();
        assert_eq!(first_error(&harness.submit("red", unknown)), Some("ACTION_UNKNOWN_TEAM"));

        let work = TradeArgs {
            receiver: "blue".into(),
            resources: ResourceCost::new().with("res-work", Decimal::ONE),
        };
        assert_eq!(first_error(&harness.submit("red", work)), Some("ACTION_NOT_TRADABLE"));

        let negative = TradeArgs {
            receiver: "blue".into(),
            resources: ResourceCost::new().with("pro-grain", Decimal::from(-3)),
        };
        let result = harness.submit("red", negative);
        assert_eq!(result.status, ActionStatus::Rejected);
        assert_eq!(harness.balance("blue", "pro-grain"), Decimal::from(20));
    }

    #[test]
    fn fractional_amounts_stay_exact() {
        let mut harness = Harness::new();
        let third = Decimal::new(3333, 4);
        for _ in 0..3 {
            harness.submit(
                "red",
                TradeArgs {
                    receiver: "blue".into(),
                    resources: ResourceCost::new().with("pro-fish", third),
                },
            );
        }
        assert_eq!(harness.balance("red", "pro-fish"), Decimal::new(190001, 4));
        assert_eq!(harness.balance("blue", "pro-fish"), Decimal::new(209999, 4));
    }

    #[test]
    fn withdraw_takes_from_storage_and_charges_per_unit() {
        let mut harness = Harness::new();
        harness
            .team_mut("red")
            .storage
            .set(&"mat-wood".into(), Decimal::from(6))
            .unwrap();
        let result = harness.submit(
            "red",
            WithdrawArgs {
                resources: ResourceCost::new().with("mat-wood", Decimal::from(4)),
            },
        );
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.team("red").storage.get(&"mat-wood".into()), Decimal::from(2));
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(92));

        let too_much = harness.submit(
            "red",
            WithdrawArgs {
                resources: ResourceCost::new().with("mat-wood", Decimal::from(3)),
            },
        );
        assert_eq!(first_error(&too_much), Some("ACTION_INSUFFICIENT_RESOURCES"));
    }

    #[test]
    fn withdraw_beyond_decimal_range_is_rejected() {
        let mut harness = Harness::new();
        harness
            .team_mut("red")
            .storage
            .set(&"mat-wood".into(), Decimal::MAX)
            .unwrap();
        let args = WithdrawArgs {
            resources: ResourceCost::new().with("mat-wood", Decimal::MAX),
        };
        let before = harness.state.clone();

        let quote = harness
            .engine()
            .preview(&ActionRequest::by_team("red", args.clone()))
            .unwrap_err();
        assert_eq!(quote.error_code(), "ACTION_AMOUNT_OVERFLOW");

        let result = harness.submit("red", args);
        assert_eq!(first_error(&result), Some("ACTION_AMOUNT_OVERFLOW"));
        assert_eq!(harness.state, before);
    }

    #[test]
    fn trade_receive_beyond_decimal_range_is_rejected() {
        let mut harness = Harness::new();
        harness
            .team_mut("blue")
            .resources
            .set(&"pro-grain".into(), Decimal::MAX)
            .unwrap();
        let before = harness.state.clone();
        let result = harness.submit("red", five_grain());
        assert_eq!(first_error(&result), Some("ACTION_AMOUNT_OVERFLOW"));
        assert_eq!(harness.state, before);
    }
}
