use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::catalog::{Catalog, ResourceClass, ResourceEntity};
use crate::cost::{AmountOverflow, ResourceCost};
use crate::state::{EntityId, TeamState};

fn food<'a>(catalog: &'a Catalog, id: &EntityId) -> Result<&'a ResourceEntity, ActionRejected> {
    let resource = catalog
        .try_resource(id)
        .ok_or_else(|| ActionRejected::UnknownEntity { id: id.clone() })?;
    ensure(
        resource.food && resource.class() == ResourceClass::Production,
        || ActionRejected::NotFood {
            resource: id.clone(),
        },
    )?;
    Ok(resource)
}

fn ration(team: &TeamState, provided: &ResourceCost) -> Result<ResourceCost, AmountOverflow> {
    team.granary
        .iter()
        .try_fold(provided.clone(), |mut ration, (resource, amount)| {
            ration.add(resource.clone(), *amount)?;
            Ok(ration)
        })
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedArgs {
    /// Food handed in on top of the standing granary allocation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub provided: ResourceCost,
}

/// Feeds the residents, once per turn.
///
/// Every `residents_per_food` residents eat one unit. A complete feeding with
/// at least `caste_count` distinct foods grows the population by
/// `feed_growth`, unless the team is afflicted. Each missing unit costs one
/// resident.
pub struct Feed;

impl ActionTransition for Feed {
    type Args = FeedArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &FeedArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(ration(ctx.team()?, &args.provided)?)
    }

    fn initiate_check(&self, args: &FeedArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        let turn = ctx.state.world.turn;
        ensure(!team.was_fed_in(turn), || ActionRejected::AlreadyFed {
            team: team.id.clone(),
            turn,
        })?;
        for (id, amount) in &args.provided {
            ensure(*amount > Decimal::ZERO, || ActionRejected::NonPositiveAmount {
                resource: id.clone(),
                amount: *amount,
            })?;
            food(ctx.catalog, id)?;
        }
        Ok(())
    }

    fn commit(&self, args: &FeedArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let config = ctx.state.world.config.clone();
        let turn = ctx.state.world.turn;
        let team = ctx.team_mut()?;
        let id = team.id.clone();
        let eaten = ration(team, &args.provided)?;

        let units = eaten.total()?;
        let kinds = eaten.iter().filter(|(_, amount)| !amount.is_zero()).count();
        let population = team.population(&config);
        ensure(config.residents_per_food > 0, || ActionRejected::InvalidConfig {
            reason: "residents_per_food must be positive".to_owned(),
        })?;
        let required = Decimal::from(population.div_ceil(config.residents_per_food));
        team.last_fed_turn = Some(turn);

        if units < required {
            let missing = (required - units).ceil().to_u32().unwrap_or(u32::MAX);
            let died = team.remove_residents(&config, missing)?;
            ctx.warn(
                Message::warning(
                    "feed.starvation",
                    format!("{id} provided {units} of {required} food, {died} residents starved"),
                )
                .with_ref(&id),
            );
            return Ok(());
        }

        let varied = u32::try_from(kinds).unwrap_or(u32::MAX) >= config.caste_count;
        if !varied {
            ctx.info(
                Message::info(
                    "feed.monotonous",
                    format!("{id} is fed but {kinds} kinds of food do not let it grow"),
                )
                .with_ref(&id),
            );
        } else if team.is_afflicted() {
            ctx.info(
                Message::info("feed.afflicted", format!("{id} is fed but plague stops growth"))
                    .with_ref(&id),
            );
        } else {
            let growth = Decimal::from(population)
                .checked_mul(config.feed_growth)
                .ok_or_else(|| AmountOverflow {
                    resource: config.population_resource.clone(),
                })?;
            team.resources.receive(&config.population_resource, growth)?;
            ctx.info(
                Message::info("feed.growth", format!("{id} is fed, population grows by {growth}"))
                    .with_ref(&id),
            );
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GranarySetArgs {
    pub resource: EntityId,
    /// Units spent on every feeding; zero removes the allocation.
    pub amount: Decimal,
}

/// Sets the standing granary allocation for one food.
pub struct GranarySet;

impl ActionTransition for GranarySet {
    type Args = GranarySetArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn initiate_check(
        &self,
        args: &GranarySetArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<(), ActionRejected> {
        ctx.team()?;
        food(ctx.catalog, &args.resource)?;
        ensure(!args.amount.is_sign_negative() || args.amount.is_zero(), || {
            ActionRejected::NonPositiveAmount {
                resource: args.resource.clone(),
                amount: args.amount,
            }
        })
    }

    fn commit(&self, args: &GranarySetArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team_mut()?;
        if args.amount.is_zero() {
            team.granary.remove(&args.resource);
        } else {
            team.granary.insert(args.resource.clone(), args.amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionResult;
    use crate::engine::testing::Harness;

    fn first_error(result: &ActionResult) -> Option<&str> {
        result.errors().next().map(|m| m.template.as_str())
    }

    fn meal(grain: i64, fish: i64, meat: i64) -> FeedArgs {
        FeedArgs {
            provided: ResourceCost::new()
                .with("pro-grain", Decimal::from(grain))
                .with("pro-fish", Decimal::from(fish))
                .with("pro-meat", Decimal::from(meat)),
        }
    }

    #[test]
    fn varied_complete_feeding_grows_population() {
        let mut harness = Harness::new();
        // 50 residents eat 10 units
        let result = harness.submit("red", meal(4, 3, 3));
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.balance("red", "pop-residents"), Decimal::from(55));
        assert_eq!(harness.balance("red", "pro-grain"), Decimal::from(16));
        assert_eq!(harness.team("red").last_fed_turn, Some(0));
    }

    #[test]
    fn second_feeding_in_a_turn_is_rejected() {
        let mut harness = Harness::new();
        harness.submit("red", meal(4, 3, 3));
        let result = harness.submit("red", meal(4, 3, 3));
        assert_eq!(first_error(&result), Some("ACTION_ALREADY_FED"));
        assert_eq!(harness.balance("red", "pro-grain"), Decimal::from(16));
    }

    #[test]
    fn shortfall_starves_residents() {
        let mut harness = Harness::new();
        let result = harness.submit("red", meal(2, 2, 2));
        assert!(result.is_committed());
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(harness.balance("red", "pop-residents"), Decimal::from(46));
    }

    #[test]
    fn granary_is_consumed_by_feeding() {
        let mut harness = Harness::new();
        let set = harness.submit(
            "red",
            GranarySetArgs {
                resource: "pro-grain".into(),
                amount: Decimal::from(4),
            },
        );
        assert!(set.is_committed(), "{set:?}");
        let provided = ResourceCost::new()
            .with("pro-fish", Decimal::from(3))
            .with("pro-meat", Decimal::from(3));
        let result = harness.submit("red", FeedArgs { provided });
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.balance("red", "pro-grain"), Decimal::from(16));
        assert_eq!(harness.balance("red", "pop-residents"), Decimal::from(55));
    }

    #[test]
    fn granary_accepts_only_food() {
        let mut harness = Harness::new();
        let result = harness.submit(
            "red",
            GranarySetArgs {
                resource: "pro-wood".into(),
                amount: Decimal::ONE,
            },
        );
        assert_eq!(first_error(&result), Some("ACTION_NOT_FOOD"));
    }

    #[test]
    fn zero_feeding_rate_is_rejected_not_divided() {
        let mut harness = Harness::new();
        harness.state.world.config.residents_per_food = 0;
        let before = harness.state.clone();
        let result = harness.submit("red", meal(4, 3, 3));
        assert_eq!(first_error(&result), Some("ACTION_INVALID_CONFIG"));
        assert_eq!(harness.state, before);
    }
}
