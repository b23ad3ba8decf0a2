use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::catalog::BuildingEntity;
use crate::cost::{DiceRequirement, ResourceCost};
use crate::state::{EntityId, TileIndex, TileState};

fn building<'a>(
    ctx: &ActionContext<'a>,
    id: &EntityId,
) -> Result<&'a BuildingEntity, ActionRejected> {
    ctx.catalog
        .try_building(id)
        .ok_or_else(|| ActionRejected::UnknownEntity { id: id.clone() })
}

fn tile_mut<'s>(
    ctx: &'s mut EffectContext<'_>,
    tile: TileIndex,
) -> Result<&'s mut TileState, ActionRejected> {
    ctx.state
        .map
        .tile_mut(tile)
        .ok_or(ActionRejected::UnknownTile { tile })
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingStartArgs {
    pub building: EntityId,
    pub tile: TileIndex,
}

/// Lays the foundation of a building on a controlled tile. The building
/// stands once its build time has passed.
pub struct BuildingStart;

impl ActionTransition for BuildingStart {
    type Args = BuildingStartArgs;
    const CAPABILITIES: Capabilities = Capabilities::DELAYED;

    fn cost(
        &self,
        args: &BuildingStartArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<ResourceCost, ActionRejected> {
        Ok(building(ctx, &args.building)?
            .cost
            .merged(&ctx.config().build_cost)?)
    }

    fn dice(
        &self,
        args: &BuildingStartArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<DiceRequirement, ActionRejected> {
        Ok(building(ctx, &args.building)?.dice_requirement())
    }

    fn delay(&self, args: &BuildingStartArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        Ok(building(ctx, &args.building)?.build_ticks)
    }

    fn initiate_check(
        &self,
        args: &BuildingStartArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<(), ActionRejected> {
        building(ctx, &args.building)?;
        ctx.require_available(&args.building)?;
        ctx.require_control(args.tile)?;

        let tile = ctx
            .state
            .map
            .tile(args.tile)
            .ok_or(ActionRejected::UnknownTile { tile: args.tile })?;
        ensure(!tile.buildings.contains(&args.building), || {
            ActionRejected::BuildingPresent {
                tile: args.tile,
                building: args.building.clone(),
            }
        })?;
        ensure(
            !tile
                .unfinished
                .values()
                .any(|set| set.contains(&args.building)),
            || ActionRejected::BuildingUnderConstruction {
                tile: args.tile,
                building: args.building.clone(),
            },
        )?;
        ensure(tile.has_free_parcel(), || ActionRejected::NoFreeParcel {
            tile: args.tile,
        })
    }

    fn commit(&self, args: &BuildingStartArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team_id()?;
        tile_mut(ctx, args.tile)?
            .unfinished
            .entry(team)
            .or_default()
            .insert(args.building.clone());
        ctx.info(
            Message::info(
                "building.started",
                format!("Construction of {} on tile {} started", args.building, args.tile),
            )
            .with_ref(&args.building),
        );
        Ok(())
    }

    fn delayed(&self, args: &BuildingStartArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team_id()?;
        let tile = tile_mut(ctx, args.tile)?;
        ensure(tile.take_unfinished(&team, &args.building), || {
            ActionRejected::BuildingMissing {
                tile: args.tile,
                building: args.building.clone(),
            }
        })?;
        tile.buildings.insert(args.building.clone());
        let crowded = tile.is_over_capacity();

        ctx.warn_if(crowded, || {
            Message::warning(
                "tile.over_capacity",
                format!("Tile {} holds more buildings than parcels", args.tile),
            )
        });
        let message = Message::info(
            "building.finished",
            format!("{} on tile {} is finished", args.building, args.tile),
        )
        .with_ref(&args.building);
        ctx.info(message.clone());
        ctx.notify(&team, message);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingDemolishArgs {
    pub building: EntityId,
    pub tile: TileIndex,
}

/// Tears down a finished building on a controlled tile.
pub struct BuildingDemolish;

impl ActionTransition for BuildingDemolish {
    type Args = BuildingDemolishArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(
        &self,
        _args: &BuildingDemolishArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<ResourceCost, ActionRejected> {
        Ok(ctx.config().demolition_cost.clone())
    }

    fn initiate_check(
        &self,
        args: &BuildingDemolishArgs,
        ctx: &ActionContext<'_>,
    ) -> Result<(), ActionRejected> {
        ctx.require_control(args.tile)?;
        let present = ctx
            .state
            .map
            .tile(args.tile)
            .is_some_and(|tile| tile.buildings.contains(&args.building));
        ensure(present, || ActionRejected::BuildingMissing {
            tile: args.tile,
            building: args.building.clone(),
        })
    }

    fn commit(
        &self,
        args: &BuildingDemolishArgs,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), ActionRejected> {
        let removed = tile_mut(ctx, args.tile)?.buildings.remove(&args.building);
        ensure(removed, || ActionRejected::BuildingMissing {
            tile: args.tile,
            building: args.building.clone(),
        })?;
        ctx.info(
            Message::info(
                "building.demolished",
                format!("{} on tile {} was demolished", args.building, args.tile),
            )
            .with_ref(&args.building),
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadBuildArgs {
    pub from: TileIndex,
    pub to: TileIndex,
}

/// Builds a road between a controlled tile and a neighbour. Roads shorten
/// army travel over that edge in both directions.
pub struct RoadBuild;

impl ActionTransition for RoadBuild {
    type Args = RoadBuildArgs;
    const CAPABILITIES: Capabilities = Capabilities::DELAYED;

    fn cost(&self, _args: &RoadBuildArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(ctx.config().road_cost.clone())
    }

    fn delay(&self, _args: &RoadBuildArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        Ok(ctx.config().road_ticks)
    }

    fn initiate_check(&self, args: &RoadBuildArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let RoadBuildArgs { from, to } = *args;
        ctx.require_tile(to)?;
        ctx.require_control(from)?;
        let adjacent = ctx
            .catalog
            .try_tile(from)
            .is_some_and(|template| template.neighbours.contains(&to));
        ensure(adjacent, || ActionRejected::NotAdjacent { from, to })?;
        ensure(!ctx.state.map.has_road(from, to), || {
            ActionRejected::RoadExists { from, to }
        })
    }

    fn commit(&self, args: &RoadBuildArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        ctx.info(Message::info(
            "road.started",
            format!("Road between {} and {} started", args.from, args.to),
        ));
        Ok(())
    }

    fn delayed(&self, args: &RoadBuildArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let RoadBuildArgs { from, to } = *args;
        let team = ctx.team_id()?;
        ensure(!ctx.state.map.has_road(from, to), || {
            ActionRejected::RoadExists { from, to }
        })?;
        ensure(ctx.state.map.add_road(from, to), || {
            ActionRejected::UnknownTile { tile: to }
        })?;

        let message = Message::info(
            "road.finished",
            format!("Road between {from} and {to} is finished"),
        );
        ctx.info(message.clone());
        ctx.notify(&team, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::action::ActionResult;
    use crate::engine::testing::Harness;

    fn first_error(result: &ActionResult) -> Option<&str> {
        result.errors().next().map(|m| m.template.as_str())
    }

    fn sawmill(tile: TileIndex) -> BuildingStartArgs {
        BuildingStartArgs {
            building: "bui-sawmill".into(),
            tile,
        }
    }

    fn prepared() -> Harness {
        let mut harness = Harness::new();
        harness
            .team_mut("red")
            .resources
            .set(&"pro-wood".into(), Decimal::from(20))
            .unwrap();
        harness
    }

    #[test]
    fn building_stands_after_build_time() {
        let mut harness = prepared();
        let result = harness.submit("red", sawmill(1));
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.balance("red", "pro-wood"), Decimal::from(15));
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(90));
        assert!(harness.state.map.tile(1).unwrap().is_unfinished(&"red".into(), &"bui-sawmill".into()));

        harness.tick_to(3);
        let tile = harness.state.map.tile(1).unwrap();
        assert!(tile.buildings.contains(&EntityId::from("bui-sawmill")));
        assert!(tile.unfinished.is_empty());
    }

    #[test]
    fn building_requires_a_controlled_free_tile() {
        let mut harness = prepared();
        assert_eq!(
            first_error(&harness.submit("red", sawmill(2))),
            Some("ACTION_TILE_NOT_CONTROLLED")
        );

        harness.submit("red", sawmill(1));
        assert_eq!(
            first_error(&harness.submit("red", sawmill(1))),
            Some("ACTION_BUILDING_UNDER_CONSTRUCTION")
        );
    }

    #[test]
    fn overbuilt_tile_completes_with_a_warning() {
        let mut harness = prepared();
        harness.submit("red", sawmill(1));
        // an operator squeezed the tile down meanwhile
        harness.state.map.tile_mut(1).unwrap().parcels = 0;

        let report = harness.tick_to(3);
        assert!(report.effects[0].is_committed());
        assert_eq!(report.effects[0].warnings().count(), 1);
    }

    #[test]
    fn demolition_frees_the_parcel() {
        let mut harness = prepared();
        harness.submit("red", sawmill(1));
        harness.tick_to(3);
        let result = harness.submit(
            "red",
            BuildingDemolishArgs {
                building: "bui-sawmill".into(),
                tile: 1,
            },
        );
        assert!(result.is_committed(), "{result:?}");
        assert!(harness.state.map.tile(1).unwrap().buildings.is_empty());
    }

    #[test]
    fn road_connects_both_directions() {
        let mut harness = Harness::new();
        let result = harness.submit("red", RoadBuildArgs { from: 1, to: 2 });
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.scheduled_delay, Some(4));
        assert!(!harness.state.map.has_road(1, 2));

        harness.tick_to(4);
        assert!(harness.state.map.has_road(1, 2));
        assert!(harness.state.map.has_road(2, 1));

        let again = harness.submit("red", RoadBuildArgs { from: 1, to: 2 });
        assert_eq!(first_error(&again), Some("ACTION_ROAD_EXISTS"));
        let far = harness.submit("red", RoadBuildArgs { from: 1, to: 3 });
        assert_eq!(first_error(&far), Some("ACTION_NOT_ADJACENT"));
    }
}
