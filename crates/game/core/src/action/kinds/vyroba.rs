use rust_decimal::Decimal;

use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::catalog::{ResourceClass, VyrobaEntity};
use crate::cost::{AmountOverflow, DiceRequirement, ResourceCost};
use crate::state::{EntityId, TeamId, TileIndex};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VyrobaArgs {
    pub vyroba: EntityId,
    pub count: u32,
    /// Tile the recipe runs on; required when the recipe needs a building.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tile: Option<TileIndex>,
}

/// Runs a production recipe `count` times. The yield lands after the
/// recipe's production time.
pub struct Vyroba;

pub(super) fn recipe<'a>(
    ctx: &ActionContext<'a>,
    id: &EntityId,
) -> Result<&'a VyrobaEntity, ActionRejected> {
    ctx.catalog
        .try_vyroba(id)
        .ok_or_else(|| ActionRejected::UnknownEntity { id: id.clone() })
}

/// Reward of `batches` runs of a recipe yielding `amount` each.
pub(super) fn batch_yield(
    amount: Decimal,
    reward: &EntityId,
    batches: u32,
) -> Result<Decimal, AmountOverflow> {
    amount
        .checked_mul(Decimal::from(batches))
        .ok_or_else(|| AmountOverflow {
            resource: reward.clone(),
        })
}

/// Credits produced resources: materials go to storage up to the storage
/// limit, everything else to the resource ledger. Returns the amount kept.
pub(super) fn deliver(
    ctx: &mut EffectContext<'_>,
    team: &TeamId,
    resource: &EntityId,
    amount: Decimal,
) -> Result<Decimal, ActionRejected> {
    let limit = ctx.state.world.config.storage_limit;
    let holder = ctx.team_named_mut(team)?;

    if ResourceClass::of(resource) != ResourceClass::Material {
        holder.resources.receive(resource, amount)?;
        return Ok(amount);
    }

    let room = limit
        .saturating_sub(holder.storage.get(resource))
        .max(Decimal::ZERO);
    let stored = amount.min(room);
    holder.storage.receive(resource, stored)?;
    let overflow = amount - stored;
    ctx.warn_if(overflow > Decimal::ZERO, || {
        Message::warning(
            "storage.overflow",
            format!("Storage of {team} is full, {overflow} of {resource} was lost"),
        )
        .with_ref(team)
        .with_ref(resource)
    });
    Ok(stored)
}

impl ActionTransition for Vyroba {
    type Args = VyrobaArgs;
    const CAPABILITIES: Capabilities = Capabilities::DELAYED;

    fn cost(&self, args: &VyrobaArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(recipe(ctx, &args.vyroba)?
            .cost
            .scaled(Decimal::from(args.count))?)
    }

    fn dice(
        &self,
        args: &VyrobaArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<DiceRequirement, ActionRejected> {
        Ok(recipe(ctx, &args.vyroba)?.dice_requirement())
    }

    fn delay(&self, args: &VyrobaArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        Ok(recipe(ctx, &args.vyroba)?.production_ticks)
    }

    fn initiate_check(&self, args: &VyrobaArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let entity = recipe(ctx, &args.vyroba)?;
        ctx.require_available(&args.vyroba)?;
        ensure(args.count > 0, || ActionRejected::ZeroCount)?;

        if let Some(tile) = args.tile {
            ctx.require_control(tile)?;
        }
        if let Some(building) = &entity.building {
            let missing = || ActionRejected::TileRequired {
                vyroba: args.vyroba.clone(),
                building: building.clone(),
            };
            let tile = args.tile.ok_or_else(missing)?;
            let present = ctx
                .state
                .map
                .tile(tile)
                .is_some_and(|state| state.buildings.contains(building));
            ensure(present, missing)?;
        }
        Ok(())
    }

    fn commit(&self, args: &VyrobaArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let entity = ctx.catalog.vyroba(&args.vyroba);
        ctx.info(
            Message::info(
                "vyroba.started",
                format!("{} x{} started", entity.name, args.count),
            )
            .with_ref(&args.vyroba),
        );
        Ok(())
    }

    fn delayed(&self, args: &VyrobaArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let entity = ctx.catalog.vyroba(&args.vyroba);
        let team = ctx.team_id()?;
        let produced = batch_yield(entity.amount, &entity.reward, args.count)?;
        let kept = deliver(ctx, &team, &entity.reward, produced)?;

        let message = Message::info(
            "vyroba.finished",
            format!("{} x{} produced {kept} of {}", entity.name, args.count, entity.reward),
        )
        .with_ref(&args.vyroba)
        .with_ref(&entity.reward);
        ctx.info(message.clone());
        ctx.notify(&team, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::kinds::BuildingStartArgs;
    use crate::cost::DiceRoll;
    use crate::engine::testing::Harness;

    fn logs(tile: Option<TileIndex>) -> VyrobaArgs {
        VyrobaArgs {
            vyroba: "vyr-logs".into(),
            count: 2,
            tile,
        }
    }

    fn with_sawmill(harness: &mut Harness) {
        harness.team_mut("red").resources.set(&"pro-wood".into(), Decimal::from(10)).unwrap();
        let result = harness.submit(
            "red",
            BuildingStartArgs {
                building: "bui-sawmill".into(),
                tile: 1,
            },
        );
        assert!(result.is_committed(), "{result:?}");
        harness.tick_to(3);
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut harness = Harness::new();
        let result = harness.submit(
            "red",
            VyrobaArgs {
                vyroba: "vyr-planks".into(),
                count: 0,
                tile: None,
            },
        );
        assert_eq!(
            result.errors().next().map(|m| m.template.as_str()),
            Some("ACTION_ZERO_COUNT")
        );
    }

    #[test]
    fn recipe_needing_a_building_requires_it_on_the_tile() {
        let mut harness = Harness::new();
        let roll = DiceRoll::new("die-lesy", 6);
        let result = harness.submit_rolled("red", logs(None), roll.clone());
        assert_eq!(
            result.errors().next().map(|m| m.template.as_str()),
            Some("ACTION_TILE_REQUIRED")
        );

        with_sawmill(&mut harness);
        let result = harness.submit_rolled("red", logs(Some(1)), roll);
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.scheduled_delay, Some(0));
    }

    #[test]
    fn materials_fill_storage_up_to_the_limit() {
        let mut harness = Harness::new();
        with_sawmill(&mut harness);
        let roll = DiceRoll::new("die-lesy", 6);
        harness.submit_rolled("red", logs(Some(1)), roll.clone());
        harness.submit_rolled("red", logs(Some(1)), roll);

        let report = harness.tick_to(4);
        assert_eq!(report.effects.len(), 2);
        // 16 fit, the second batch overflows by 12
        assert_eq!(
            harness.team("red").storage.get(&"mat-wood".into()),
            Decimal::from(20)
        );
        assert_eq!(report.effects[1].warnings().count(), 1);
        assert_eq!(harness.balance("red", "mat-wood"), Decimal::ZERO);
    }
}
