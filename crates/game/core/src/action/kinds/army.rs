//! Army lifecycle: deployment with arrival resolution, boosts, retreats and
//! upgrades.
//!
//! An army is idle at its team's home tile, marching toward a destination, or
//! occupying a tile. Equipment carried by an army is paid from the team's
//! `equipment_resource` on deployment and refunded when the army comes home
//! intact; equipment lost in combat is gone.

use rust_decimal::Decimal;

use crate::action::{
    ActionContext, ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure,
};
use crate::config::GameConfig;
use crate::cost::ResourceCost;
use crate::state::{Army, ArmyGoal, ArmyId, ArmyMode, TeamId, TileIndex};

fn expect_mode(army: &Army, expected: ArmyMode) -> Result<(), ActionRejected> {
    ensure(army.mode == expected, || ActionRejected::WrongArmyMode {
        army: army.id.clone(),
        mode: army.mode,
        expected,
    })
}

fn refund(ctx: &mut EffectContext<'_>, owner: &TeamId, equipment: u32) -> Result<(), ActionRejected> {
    if equipment == 0 {
        return Ok(());
    }
    let resource = ctx.state.world.config.equipment_resource.clone();
    ctx.team_named_mut(owner)?
        .resources
        .receive(&resource, Decimal::from(equipment))?;
    Ok(())
}

/// Places an army on a tile and records it as the occupant.
fn settle(ctx: &mut EffectContext<'_>, id: &ArmyId, tile: TileIndex) -> Result<(), ActionRejected> {
    ctx.army_mut(id)?.occupy(tile);
    ctx.state
        .map
        .tile_mut(tile)
        .ok_or(ActionRejected::UnknownTile { tile })?
        .occupant = Some(id.clone());
    Ok(())
}

/// Sends an army home with its equipment refunded. Frees its tile if it held one.
fn recall(ctx: &mut EffectContext<'_>, id: &ArmyId) -> Result<u32, ActionRejected> {
    let army = ctx.army_mut(id)?;
    let owner = army.owner.clone();
    let held = army.tile;
    let equipment = army.disband_to_idle();
    if let Some(tile) = held.and_then(|tile| ctx.state.map.tile_mut(tile)) {
        tile.occupant = None;
    }
    refund(ctx, &owner, equipment)?;
    Ok(equipment)
}

/// Sends a beaten army home empty-handed.
fn rout(ctx: &mut EffectContext<'_>, id: &ArmyId) -> Result<(), ActionRejected> {
    let army = ctx.army_mut(id)?;
    let held = army.tile;
    army.disband_to_idle();
    if let Some(tile) = held.and_then(|tile| ctx.state.map.tile_mut(tile)) {
        tile.occupant = None;
    }
    Ok(())
}

/// Result of one clash between a marching army and a tile's occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Battle {
    attack: u32,
    defence: u32,
    /// Equipment the winner keeps.
    remaining: u32,
}

impl Battle {
    /// Higher strength wins; a tie goes to the defender. The winner loses half
    /// of the loser's equipment, rounded down.
    fn resolve(attacker: &Army, defender: &Army, config: &GameConfig) -> Self {
        let attack = attacker.strength(config);
        let defence = defender
            .strength(config)
            .saturating_add(config.defender_bonus);
        let remaining = if attack > defence {
            attacker.equipment.saturating_sub(defender.equipment / 2)
        } else {
            defender.equipment.saturating_sub(attacker.equipment / 2)
        };
        Self {
            attack,
            defence,
            remaining,
        }
    }

    fn attacker_wins(&self) -> bool {
        self.attack > self.defence
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmyDeployArgs {
    pub army: ArmyId,
    pub tile: TileIndex,
    pub goal: ArmyGoal,
    pub equipment: u32,
}

/// Marches an idle army from the home tile toward `tile`. What happens on
/// arrival depends on the goal and on who holds the tile at that moment.
pub struct ArmyDeploy;

impl ActionTransition for ArmyDeploy {
    type Args = ArmyDeployArgs;
    const CAPABILITIES: Capabilities = Capabilities::DELAYED;

    fn cost(&self, args: &ArmyDeployArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        let config = ctx.config();
        let equipment = ResourceCost::new().with(
            config.equipment_resource.clone(),
            Decimal::from(args.equipment),
        );
        Ok(equipment.merged(&config.deploy_cost)?)
    }

    fn delay(&self, args: &ArmyDeployArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        let home = ctx.team()?.home_tile;
        ctx.catalog
            .travel_ticks(
                home,
                args.tile,
                |a, b| ctx.state.map.has_road(a, b),
                ctx.config(),
            )
            .ok_or(ActionRejected::Unreachable {
                from: home,
                to: args.tile,
            })
    }

    fn initiate_check(&self, args: &ArmyDeployArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let army = ctx.own_army(&args.army)?;
        expect_mode(army, ArmyMode::Idle)?;
        ctx.require_tile(args.tile)?;

        let capacity = army.capacity(ctx.config());
        ensure(args.equipment <= capacity, || {
            ActionRejected::EquipmentOverCapacity {
                army: army.id.clone(),
                requested: args.equipment,
                capacity,
            }
        })?;
        ensure(
            args.equipment > 0 || args.goal == ArmyGoal::Supply,
            || ActionRejected::NoEquipment {
                army: army.id.clone(),
            },
        )
    }

    fn commit(&self, args: &ArmyDeployArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let army = ctx.army_mut(&args.army)?;
        army.mode = ArmyMode::Marching;
        army.equipment = args.equipment;
        army.destination = Some(args.tile);
        army.goal = Some(args.goal);
        army.boost = None;

        ctx.info(
            Message::info(
                "army.deployed",
                format!(
                    "{} marches to tile {} to {} with {} equipment",
                    args.army, args.tile, args.goal, args.equipment
                ),
            )
            .with_ref(&args.army),
        );
        Ok(())
    }

    fn delayed(&self, args: &ArmyDeployArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let army = ctx.view().army(&args.army)?.clone();
        expect_mode(&army, ArmyMode::Marching)?;
        let tile = army.destination.unwrap_or(args.tile);
        let goal = army.goal.unwrap_or(args.goal);
        let holder = ctx
            .state
            .map
            .occupant_of(tile)
            .and_then(|id| ctx.state.world.army(id))
            .cloned();

        match (goal, holder) {
            (ArmyGoal::Occupy | ArmyGoal::Replace, None) => {
                settle(ctx, &army.id, tile)?;
                let message = Message::info(
                    "army.occupied",
                    format!("{} occupied tile {tile}", army.id),
                )
                .with_ref(&army.id);
                ctx.info(message.clone());
                ctx.notify(&army.owner, message);
            }
            (ArmyGoal::Occupy | ArmyGoal::Eliminate, Some(defender))
                if defender.owner != army.owner =>
            {
                clash(ctx, &army, &defender, goal, tile)?;
            }
            (ArmyGoal::Supply, Some(holder)) if holder.owner == army.owner => {
                let room = holder
                    .capacity(&ctx.state.world.config)
                    .saturating_sub(holder.equipment);
                let handed = army.equipment.min(room);
                ctx.army_mut(&holder.id)?.equipment += handed;
                ctx.army_mut(&army.id)?.equipment -= handed;
                let returned = recall(ctx, &army.id)?;
                let message = Message::info(
                    "army.supplied",
                    format!(
                        "{} handed {handed} equipment to {}, {returned} returned home",
                        army.id, holder.id
                    ),
                )
                .with_ref(&army.id)
                .with_ref(&holder.id);
                ctx.info(message.clone());
                ctx.notify(&army.owner, message);
            }
            (ArmyGoal::Replace, Some(holder)) if holder.owner == army.owner => {
                recall(ctx, &holder.id)?;
                settle(ctx, &army.id, tile)?;
                let message = Message::info(
                    "army.replaced",
                    format!("{} relieved {} on tile {tile}", army.id, holder.id),
                )
                .with_ref(&army.id)
                .with_ref(&holder.id);
                ctx.info(message.clone());
                ctx.notify(&army.owner, message);
            }
            _ => {
                recall(ctx, &army.id)?;
                let message = Message::warning(
                    "army.nothing_to_do",
                    format!(
                        "{} found nothing to {goal} on tile {tile} and returned home",
                        army.id
                    ),
                )
                .with_ref(&army.id);
                ctx.warn(message.clone());
                ctx.notify(&army.owner, message);
            }
        }
        Ok(())
    }
}

fn clash(
    ctx: &mut EffectContext<'_>,
    attacker: &Army,
    defender: &Army,
    goal: ArmyGoal,
    tile: TileIndex,
) -> Result<(), ActionRejected> {
    let battle = Battle::resolve(attacker, defender, &ctx.state.world.config);

    let message = (if battle.attacker_wins() {
        rout(ctx, &defender.id)?;
        ctx.army_mut(&attacker.id)?.equipment = battle.remaining;
        if goal == ArmyGoal::Occupy {
            settle(ctx, &attacker.id, tile)?;
        } else {
            recall(ctx, &attacker.id)?;
        }
        Message::info(
            "army.victory",
            format!(
                "{} ({}) defeated {} ({}) on tile {tile}",
                attacker.id, battle.attack, defender.id, battle.defence
            ),
        )
    } else {
        rout(ctx, &attacker.id)?;
        ctx.army_mut(&defender.id)?.equipment = battle.remaining;
        Message::info(
            "army.defeat",
            format!(
                "{} ({}) was repelled by {} ({}) on tile {tile}",
                attacker.id, battle.attack, defender.id, battle.defence
            ),
        )
    })
    .with_ref(&attacker.id)
    .with_ref(&defender.id);

    ctx.info(message.clone());
    ctx.notify(&attacker.owner, message.clone());
    ctx.notify(&defender.owner, message);
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmyBoostArgs {
    pub army: ArmyId,
    pub boost: u32,
}

/// Adds strength to a marching army for the coming battle.
pub struct ArmyBoost;

impl ActionTransition for ArmyBoost {
    type Args = ArmyBoostArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &ArmyBoostArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(ctx.config().boost_cost.scaled(Decimal::from(args.boost))?)
    }

    fn initiate_check(&self, args: &ArmyBoostArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let team = ctx.team()?;
        let army = ctx.own_army(&args.army)?;
        expect_mode(army, ArmyMode::Marching)?;
        ensure(army.goal != Some(ArmyGoal::Supply), || {
            ActionRejected::SupplyCannotBoost {
                army: army.id.clone(),
            }
        })?;
        ensure(army.boost.is_none(), || ActionRejected::BoostAlreadySet {
            army: army.id.clone(),
        })?;
        ensure(args.boost > 0, || ActionRejected::ZeroBoost)?;
        ensure(!team.is_afflicted(), || ActionRejected::Afflicted {
            team: team.id.clone(),
            kind: ctx.kind,
        })
    }

    fn commit(&self, args: &ArmyBoostArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        ctx.army_mut(&args.army)?.boost = Some(args.boost);
        ctx.info(
            Message::info(
                "army.boosted",
                format!("{} gains {} strength", args.army, args.boost),
            )
            .with_ref(&args.army),
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmyRetreatArgs {
    pub army: ArmyId,
}

/// Pulls an occupying army home and frees its tile.
pub struct ArmyRetreat;

impl ActionTransition for ArmyRetreat {
    type Args = ArmyRetreatArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn initiate_check(&self, args: &ArmyRetreatArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        expect_mode(ctx.own_army(&args.army)?, ArmyMode::Occupying)
    }

    fn commit(&self, args: &ArmyRetreatArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let tile = ctx.view().army(&args.army)?.tile;
        let equipment = recall(ctx, &args.army)?;
        let text = match tile {
            Some(tile) => format!("{} left tile {tile} with {equipment} equipment", args.army),
            None => format!("{} returned with {equipment} equipment", args.army),
        };
        ctx.info(Message::info("army.retreated", text).with_ref(&args.army));
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmyUpgradeArgs {
    pub army: ArmyId,
}

/// Raises an idle army by one level.
pub struct ArmyUpgrade;

impl ActionTransition for ArmyUpgrade {
    type Args = ArmyUpgradeArgs;
    const CAPABILITIES: Capabilities = Capabilities::IMMEDIATE;

    fn cost(&self, args: &ArmyUpgradeArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        let army = ctx.army(&args.army)?;
        ctx.config()
            .upgrade_cost(army.level)
            .cloned()
            .ok_or_else(|| ActionRejected::MaxLevel {
                army: army.id.clone(),
                level: army.level,
            })
    }

    fn initiate_check(&self, args: &ArmyUpgradeArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        let army = ctx.own_army(&args.army)?;
        expect_mode(army, ArmyMode::Idle)?;
        ensure(army.level < ctx.config().max_army_level, || {
            ActionRejected::MaxLevel {
                army: army.id.clone(),
                level: army.level,
            }
        })
    }

    fn commit(&self, args: &ArmyUpgradeArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let army = ctx.army_mut(&args.army)?;
        army.level += 1;
        let level = army.level;
        ctx.info(
            Message::info("army.upgraded", format!("{} reached level {level}", args.army))
                .with_ref(&args.army),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionResult;
    use crate::config::PlagueConfig;
    use crate::engine::testing::Harness;
    use crate::plague::PlagueStats;

    fn first_error(result: &ActionResult) -> Option<&str> {
        result.errors().next().map(|m| m.template.as_str())
    }

    fn raise(harness: &mut Harness, team: &str) -> ArmyId {
        harness.state.world.raise_army(&TeamId::from(team))
    }

    fn garrison(harness: &mut Harness, team: &str, tile: TileIndex, equipment: u32) -> ArmyId {
        let id = raise(harness, team);
        let army = harness.state.world.army_mut(&id).unwrap();
        army.equipment = equipment;
        army.occupy(tile);
        harness.state.map.tile_mut(tile).unwrap().occupant = Some(id.clone());
        id
    }

    fn deploy(army: &ArmyId, goal: ArmyGoal, equipment: u32) -> ArmyDeployArgs {
        ArmyDeployArgs {
            army: army.clone(),
            tile: 2,
            goal,
            equipment,
        }
    }

    #[test]
    fn army_occupies_a_free_tile_on_arrival() {
        let mut harness = Harness::new();
        let army = raise(&mut harness, "red");
        let result = harness.submit("red", deploy(&army, ArmyGoal::Occupy, 5));
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.scheduled_delay, Some(6));
        assert_eq!(harness.balance("red", "pro-equipment"), Decimal::from(45));

        harness.tick_to(6);
        assert_eq!(harness.state.map.occupant_of(2), Some(&army));
        assert!(harness.state.controls_tile(&"red".into(), 2));
    }

    #[test]
    fn stronger_attacker_takes_the_tile() {
        let mut harness = Harness::new();
        let defender = garrison(&mut harness, "blue", 2, 4);
        let attacker = raise(&mut harness, "red");
        harness.submit("red", deploy(&attacker, ArmyGoal::Occupy, 10));

        let report = harness.tick_to(6);
        assert_eq!(report.effects[0].notifications.len(), 2);
        // 15 against 11, the winner loses half of the loser's equipment
        let winner = harness.state.world.army(&attacker).unwrap();
        assert_eq!(winner.mode, ArmyMode::Occupying);
        assert_eq!(winner.equipment, 8);
        let loser = harness.state.world.army(&defender).unwrap();
        assert_eq!((loser.mode, loser.equipment), (ArmyMode::Idle, 0));
        assert_eq!(harness.state.map.occupant_of(2), Some(&attacker));
    }

    #[test]
    fn tie_goes_to_the_defender() {
        let mut harness = Harness::new();
        let defender = garrison(&mut harness, "blue", 2, 4);
        let attacker = raise(&mut harness, "red");
        harness.submit("red", deploy(&attacker, ArmyGoal::Occupy, 6));
        harness.tick_to(6);

        let loser = harness.state.world.army(&attacker).unwrap();
        assert_eq!((loser.mode, loser.equipment), (ArmyMode::Idle, 0));
        assert_eq!(harness.state.world.army(&defender).unwrap().equipment, 1);
        assert_eq!(harness.balance("red", "pro-equipment"), Decimal::from(44));
    }

    #[test]
    fn boost_tips_the_balance() {
        let mut harness = Harness::new();
        garrison(&mut harness, "blue", 2, 4);
        let attacker = raise(&mut harness, "red");
        harness.submit("red", deploy(&attacker, ArmyGoal::Eliminate, 6));
        let boost = harness.submit(
            "red",
            ArmyBoostArgs {
                army: attacker.clone(),
                boost: 2,
            },
        );
        assert!(boost.is_committed(), "{boost:?}");
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(90));

        harness.tick_to(6);
        // eliminate clears the tile and brings the survivors home
        assert_eq!(harness.state.map.occupant_of(2), None);
        let winner = harness.state.world.army(&attacker).unwrap();
        assert_eq!(winner.mode, ArmyMode::Idle);
        assert_eq!(harness.balance("red", "pro-equipment"), Decimal::from(48));
    }

    #[test]
    fn boost_is_refused_for_supply_runs_and_afflicted_teams() {
        let mut harness = Harness::new();
        garrison(&mut harness, "red", 2, 1);
        let runner = raise(&mut harness, "red");
        harness.submit("red", deploy(&runner, ArmyGoal::Supply, 3));
        let boost = ArmyBoostArgs {
            army: runner.clone(),
            boost: 1,
        };
        assert_eq!(
            first_error(&harness.submit("red", boost.clone())),
            Some("ACTION_SUPPLY_CANNOT_BOOST")
        );

        let raider = raise(&mut harness, "red");
        harness.submit("red", ArmyDeployArgs { tile: 3, ..deploy(&raider, ArmyGoal::Eliminate, 2) });
        harness.team_mut("red").plague = Some(PlagueStats::onset(&PlagueConfig::default(), 50));
        let boost = ArmyBoostArgs { army: raider, boost: 1 };
        assert_eq!(first_error(&harness.submit("red", boost)), Some("ACTION_AFFLICTED"));
    }

    #[test]
    fn supply_tops_up_the_holder_and_returns_the_rest() {
        let mut harness = Harness::new();
        let holder = garrison(&mut harness, "red", 2, 7);
        let runner = raise(&mut harness, "red");
        harness.submit("red", deploy(&runner, ArmyGoal::Supply, 5));
        harness.tick_to(6);

        assert_eq!(harness.state.world.army(&holder).unwrap().equipment, 10);
        assert_eq!(harness.state.world.army(&runner).unwrap().mode, ArmyMode::Idle);
        assert_eq!(harness.balance("red", "pro-equipment"), Decimal::from(47));
    }

    #[test]
    fn deployment_respects_capacity() {
        let mut harness = Harness::new();
        let army = raise(&mut harness, "red");
        assert_eq!(
            first_error(&harness.submit("red", deploy(&army, ArmyGoal::Occupy, 11))),
            Some("ACTION_EQUIPMENT_OVER_CAPACITY")
        );
        assert_eq!(
            first_error(&harness.submit("red", deploy(&army, ArmyGoal::Occupy, 0))),
            Some("ACTION_NO_EQUIPMENT")
        );
        let foreign = raise(&mut harness, "blue");
        assert_eq!(
            first_error(&harness.submit("red", deploy(&foreign, ArmyGoal::Occupy, 1))),
            Some("ACTION_NOT_ARMY_OWNER")
        );
    }

    #[test]
    fn retreat_frees_the_tile_and_refunds_equipment() {
        let mut harness = Harness::new();
        let army = raise(&mut harness, "red");
        harness.submit("red", deploy(&army, ArmyGoal::Occupy, 5));
        harness.tick_to(6);

        let result = harness.submit("red", ArmyRetreatArgs { army: army.clone() });
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.state.map.occupant_of(2), None);
        assert_eq!(harness.balance("red", "pro-equipment"), Decimal::from(50));

        let again = harness.submit("red", ArmyRetreatArgs { army });
        assert_eq!(first_error(&again), Some("ACTION_WRONG_ARMY_MODE"));
    }

    #[test]
    fn upgrades_stop_at_the_top_level() {
        let mut harness = Harness::new();
        let army = raise(&mut harness, "red");
        let upgrade = ArmyUpgradeArgs { army: army.clone() };
        assert!(harness.submit("red", upgrade.clone()).is_committed());
        assert!(harness.submit("red", upgrade.clone()).is_committed());
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(40));
        assert_eq!(harness.state.world.army(&army).unwrap().level, 3);
        assert_eq!(
            first_error(&harness.submit("red", upgrade)),
            Some("ACTION_MAX_LEVEL")
        );
    }
}
