//! Operator-only kinds. They skip initiate-time checks, so every guard lives
//! in `commit`, which still runs on the engine's working copy.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;

use crate::action::{ActionRejected, ActionTransition, Capabilities, EffectContext, Message, ensure};
use crate::cost::AmountOverflow;
use crate::plague;
use crate::rng::compute_seed;
use crate::state::{ArmyId, ArmyMode, EntityId, GameState, TeamId, WorldState};

use super::vyroba::{batch_yield, deliver};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmyTransferArgs {
    pub army: ArmyId,
    pub receiver: TeamId,
}

/// Hands an idle army to another team. The army keeps its id.
pub struct ArmyTransfer;

impl ActionTransition for ArmyTransfer {
    type Args = ArmyTransferArgs;
    const CAPABILITIES: Capabilities = Capabilities::OPERATOR;

    fn commit(&self, args: &ArmyTransferArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        ctx.view().other_team(&args.receiver)?;
        let army = ctx.army_mut(&args.army)?;
        ensure(army.mode == ArmyMode::Idle, || ActionRejected::WrongArmyMode {
            army: args.army.clone(),
            mode: army.mode,
            expected: ArmyMode::Idle,
        })?;
        ensure(army.owner != args.receiver, || ActionRejected::SameOwner {
            army: args.army.clone(),
            team: args.receiver.clone(),
        })?;
        let previous = std::mem::replace(&mut army.owner, args.receiver.clone());

        let message = Message::info(
            "army.transferred",
            format!("{} passed from {previous} to {}", args.army, args.receiver),
        )
        .with_ref(&args.army)
        .with_ref(&previous)
        .with_ref(&args.receiver);
        ctx.info(message.clone());
        ctx.notify(&previous, message.clone());
        ctx.notify(&args.receiver, message);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterIncrementArgs {
    pub counter: String,
    pub delta: i64,
}

/// Adjusts a named global counter. Counters never go below zero.
pub struct CounterIncrement;

impl ActionTransition for CounterIncrement {
    type Args = CounterIncrementArgs;
    const CAPABILITIES: Capabilities = Capabilities::OPERATOR;

    fn commit(
        &self,
        args: &CounterIncrementArgs,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), ActionRejected> {
        let value = ctx.state.world.counter(&args.counter);
        let next = i128::from(value) + i128::from(args.delta);
        let next = u64::try_from(next).map_err(|_| ActionRejected::CounterUnderflow {
            counter: args.counter.clone(),
            value,
            delta: args.delta,
        })?;
        ctx.state.world.counters.insert(args.counter.clone(), next);
        ctx.info(Message::info(
            "counter.changed",
            format!("{} is now {next}", args.counter),
        ));
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NextTurnArgs {}

/// Closes the current turn and opens the next one.
///
/// Every team collects work from its unemployed residents, runs its
/// automated recipes, advances its epidemic and is warned if it went unfed.
pub struct NextTurn;

impl ActionTransition for NextTurn {
    type Args = NextTurnArgs;
    const CAPABILITIES: Capabilities = Capabilities::OPERATOR;

    fn commit(&self, _args: &NextTurnArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let finished = ctx.state.world.turn;
        let turn = finished + 1;
        ctx.state.world.turn = turn;

        let teams: Vec<TeamId> = ctx.state.teams.keys().cloned().collect();
        for team in &teams {
            open_turn(ctx, team, finished, turn)?;
        }
        ctx.info(Message::info("turn.started", format!("Turn {turn} started")));
        Ok(())
    }
}

fn open_turn(
    ctx: &mut EffectContext<'_>,
    id: &TeamId,
    finished: u32,
    turn: u32,
) -> Result<(), ActionRejected> {
    let config = ctx.state.world.config.clone();
    let holder = ctx.team_named_mut(id)?;
    let population = holder.population(&config);
    let idle = population - holder.total_employees().min(population);
    let work = Decimal::from(idle)
        .checked_mul(config.work_per_resident)
        .ok_or_else(|| AmountOverflow {
            resource: config.work_resource.clone(),
        })?;
    holder.resources.receive(&config.work_resource, work)?;
    let unfed = !holder.was_fed_in(finished);
    let employees = holder.employees.clone();

    ctx.warn_if(unfed, || {
        Message::warning("feed.missed", format!("{id} went unfed in turn {finished}")).with_ref(id)
    });
    for (vyroba, workers) in &employees {
        automate(ctx, id, vyroba, *workers)?;
    }
    advance_plague(ctx, id, turn)
}

/// Runs `employees / workers` batches of an automated recipe, paid from the
/// team's resources. A batch the team cannot pay stalls with a warning.
fn automate(
    ctx: &mut EffectContext<'_>,
    team: &TeamId,
    vyroba: &EntityId,
    employees: u32,
) -> Result<(), ActionRejected> {
    let catalog = ctx.catalog;
    let Some(entity) = catalog.try_vyroba(vyroba) else {
        return Ok(());
    };
    let batches = employees.checked_div(entity.workers).unwrap_or(0);
    if batches == 0 {
        return Ok(());
    }

    let cost = entity.cost.scaled(Decimal::from(batches))?;
    let paid = ctx.team_named_mut(team)?.resources.spend(&cost);
    if let Err(shortfall) = paid {
        ctx.warn(
            Message::warning(
                "automation.stalled",
                format!("{} of {team} stalled: {shortfall}", entity.name),
            )
            .with_ref(team)
            .with_ref(vyroba),
        );
        return Ok(());
    }
    let produced = batch_yield(entity.amount, &entity.reward, batches)?;
    let kept = deliver(ctx, team, &entity.reward, produced)?;
    ctx.info(
        Message::info(
            "automation.produced",
            format!("{} of {team} produced {kept} of {}", entity.name, entity.reward),
        )
        .with_ref(team)
        .with_ref(vyroba),
    );
    Ok(())
}

fn advance_plague(ctx: &mut EffectContext<'_>, id: &TeamId, turn: u32) -> Result<(), ActionRejected> {
    let config = ctx.state.world.config.clone();
    let seed = compute_seed(
        ctx.state.game_seed,
        u64::from(turn),
        ctx.state.team_stream(id),
        0,
    );
    let rng = ctx.rng;
    let holder = ctx.team_named_mut(id)?;
    let Some(stats) = holder.plague.clone() else {
        return Ok(());
    };

    let (next, deaths) = plague::simulate(&stats, holder.population(&config), rng, seed);
    let over = next.is_over();
    holder.plague = (!over).then_some(next);
    let died = holder.remove_residents(&config, deaths)?;

    ctx.warn_if(died > 0, || {
        Message::warning("plague.deaths", format!("Plague killed {died} residents of {id}"))
            .with_ref(id)
    });
    if over {
        let message =
            Message::info("plague.over", format!("The plague in {id} has run its course")).with_ref(id);
        ctx.info(message.clone());
        ctx.notify(id, message);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GodmodeArgs {
    /// Snapshot the operator started editing from.
    pub baseline: Box<GameState>,
    pub edited: Box<GameState>,
}

/// Merges an operator's hand edit into the live state.
///
/// The world, each tile and each team are merged independently: a part the
/// operator changed is taken over only if the live part still equals the
/// baseline. Parts changed on both sides are left alone and reported. The
/// clock, the seed and pending effects are never taken from the edit, and
/// an edited configuration must still validate against the catalog.
pub struct Godmode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Merge {
    Untouched,
    Applied,
    Conflict,
}

fn merge_part<T: Clone + PartialEq>(current: &mut T, baseline: &T, edited: &T) -> Merge {
    if edited == baseline || current == edited {
        Merge::Untouched
    } else if current == baseline {
        *current = edited.clone();
        Merge::Applied
    } else {
        Merge::Conflict
    }
}

fn merge_entry<K: Ord + Clone, V: Clone + PartialEq>(
    current: &mut BTreeMap<K, V>,
    baseline: &BTreeMap<K, V>,
    edited: &BTreeMap<K, V>,
    key: &K,
) -> Merge {
    let mut slot = current.get(key).cloned();
    let merge = merge_part(&mut slot, &baseline.get(key).cloned(), &edited.get(key).cloned());
    if merge == Merge::Applied {
        match slot {
            Some(value) => current.insert(key.clone(), value),
            None => current.remove(key),
        };
    }
    merge
}

fn keys<K: Ord + Clone, V>(a: &BTreeMap<K, V>, b: &BTreeMap<K, V>) -> BTreeSet<K> {
    a.keys().chain(b.keys()).cloned().collect()
}

impl ActionTransition for Godmode {
    type Args = GodmodeArgs;
    const CAPABILITIES: Capabilities = Capabilities::OPERATOR;

    fn commit(&self, args: &GodmodeArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        let (baseline, edited) = (&*args.baseline, &*args.edited);
        let mut outcomes: Vec<(String, Merge)> = Vec::new();

        // the clock moves under any edit, so it never counts as a change
        let clock = ctx.state.world.clock;
        let pinned = |world: &WorldState| {
            let mut world = world.clone();
            world.clock = clock;
            world
        };
        let world = merge_part(
            &mut ctx.state.world,
            &pinned(&baseline.world),
            &pinned(&edited.world),
        );
        if world == Merge::Applied {
            ctx.state
                .world
                .config
                .validate(ctx.catalog)
                .map_err(|err| ActionRejected::InvalidConfig {
                    reason: err.to_string(),
                })?;
        }
        outcomes.push(("world".to_owned(), world));

        for tile in keys(&baseline.map.tiles, &edited.map.tiles) {
            let merge = merge_entry(
                &mut ctx.state.map.tiles,
                &baseline.map.tiles,
                &edited.map.tiles,
                &tile,
            );
            outcomes.push((format!("tile {tile}"), merge));
        }
        for team in keys(&baseline.teams, &edited.teams) {
            let merge = merge_entry(&mut ctx.state.teams, &baseline.teams, &edited.teams, &team);
            outcomes.push((format!("team {team}"), merge));
        }

        let applied = Listing(&outcomes, Merge::Applied);
        ctx.info(Message::info(
            "godmode.applied",
            format!("Operator edit applied to: {applied}"),
        ));
        for (part, _) in outcomes.iter().filter(|(_, merge)| *merge == Merge::Conflict) {
            ctx.warn(Message::warning(
                "godmode.conflict",
                format!("{part} changed since the edit started, edit skipped"),
            ));
        }
        Ok(())
    }
}

struct Listing<'a>(&'a [(String, Merge)], Merge);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.0.iter().filter(|(_, merge)| *merge == self.1).peekable();
        if parts.peek().is_none() {
            return f.write_str("nothing");
        }
        for (index, (part, _)) in parts.enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionResult, AttributeAddArgs, EmployeesAssignArgs, FeedArgs};
    use crate::config::PlagueConfig;
    use crate::cost::ResourceCost;
    use crate::engine::testing::Harness;
    use crate::plague::PlagueStats;
    use crate::state::Tick;

    fn first_error(result: &ActionResult) -> Option<&str> {
        result.errors().next().map(|m| m.template.as_str())
    }

    fn counter(delta: i64) -> CounterIncrementArgs {
        CounterIncrementArgs {
            counter: "beacons".into(),
            delta,
        }
    }

    #[test]
    fn counters_never_go_negative() {
        let mut harness = Harness::new();
        assert!(harness.operator(counter(3)).is_committed());
        assert_eq!(harness.state.world.counter("beacons"), 3);
        assert_eq!(
            first_error(&harness.operator(counter(-4))),
            Some("ACTION_COUNTER_UNDERFLOW")
        );
        assert!(harness.operator(counter(-3)).is_committed());
        assert_eq!(harness.state.world.counter("beacons"), 0);
    }

    #[test]
    fn idle_army_changes_owner() {
        let mut harness = Harness::new();
        let army = harness.state.world.raise_army(&"red".into());
        let transfer = ArmyTransferArgs {
            army: army.clone(),
            receiver: "blue".into(),
        };
        let result = harness.operator(transfer.clone());
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.notifications.len(), 2);
        assert_eq!(harness.state.world.army(&army).unwrap().owner, TeamId::from("blue"));

        assert_eq!(first_error(&harness.operator(transfer)), Some("ACTION_SAME_OWNER"));
    }

    #[test]
    fn next_turn_pays_work_and_runs_automation() {
        let mut harness = Harness::new();
        harness.submit(
            "red",
            EmployeesAssignArgs {
                vyroba: "vyr-planks".into(),
                count: 10,
            },
        );
        let meal = ResourceCost::new()
            .with("pro-grain", Decimal::from(4))
            .with("pro-fish", Decimal::from(3))
            .with("pro-meat", Decimal::from(3));
        assert!(harness.submit("blue", FeedArgs { provided: meal }).is_committed());

        let result = harness.operator(NextTurnArgs::default());
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(harness.state.world.turn, 1);
        // 40 idle residents work, 10 run five batches of planks
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(140));
        assert_eq!(harness.balance("red", "pro-labor"), Decimal::ZERO);
        assert_eq!(harness.balance("red", "pro-wood"), Decimal::from(15));
        // blue grew to 55 when fed
        assert_eq!(harness.balance("blue", "res-work"), Decimal::from(155));

        let missed: Vec<_> = result
            .warnings()
            .filter(|m| m.template == "feed.missed")
            .collect();
        assert_eq!(missed.len(), 1);
        assert_eq!(missed[0].refs, vec!["red".to_owned()]);
    }

    #[test]
    fn stalled_automation_only_warns() {
        let mut harness = Harness::new();
        harness.submit(
            "red",
            EmployeesAssignArgs {
                vyroba: "vyr-planks".into(),
                count: 12,
            },
        );
        let result = harness.operator(NextTurnArgs::default());
        assert!(result.is_committed());
        assert!(result.warnings().any(|m| m.template == "automation.stalled"));
        assert_eq!(harness.balance("red", "pro-labor"), Decimal::from(100));
    }

    #[test]
    fn finished_epidemic_is_cured_on_turn_change() {
        let mut harness = Harness::new();
        let mut stats = PlagueStats::onset(&PlagueConfig::default(), 50);
        stats.sick = 0;
        stats.immune = 3;
        harness.team_mut("red").plague = Some(stats);

        let result = harness.operator(NextTurnArgs::default());
        assert!(!harness.team("red").is_afflicted());
        assert_eq!(result.notifications[&TeamId::from("red")].len(), 1);
    }

    #[test]
    fn plague_step_is_reproducible() {
        let run = || {
            let mut harness = Harness::new();
            harness.team_mut("red").plague =
                Some(PlagueStats::onset(&PlagueConfig::default(), 50));
            harness.operator(NextTurnArgs::default());
            harness.team("red").clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn godmode_applies_untouched_parts() {
        let mut harness = Harness::new();
        let baseline = harness.state.clone();
        let mut edited = baseline.clone();
        edited
            .team_mut(&"red".into())
            .unwrap()
            .resources
            .set(&"res-work".into(), Decimal::from(500))
            .unwrap();
        edited.world.counters.insert("beacons".into(), 3);

        let result = harness.operator(GodmodeArgs {
            baseline: Box::new(baseline),
            edited: Box::new(edited),
        });
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.warnings().count(), 0);
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(500));
        assert_eq!(harness.state.world.counter("beacons"), 3);
    }

    #[test]
    fn godmode_skips_parts_changed_meanwhile() {
        let mut harness = Harness::new();
        let baseline = harness.state.clone();
        harness.submit(
            "red",
            AttributeAddArgs {
                attribute: "att-banner".into(),
            },
        );
        let mut edited = baseline.clone();
        edited
            .team_mut(&"red".into())
            .unwrap()
            .resources
            .set(&"res-work".into(), Decimal::from(500))
            .unwrap();

        let result = harness.operator(GodmodeArgs {
            baseline: Box::new(baseline),
            edited: Box::new(edited),
        });
        assert!(result.is_committed());
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(harness.balance("red", "res-work"), Decimal::from(95));
    }

    #[test]
    fn godmode_ignores_clock_movement_since_baseline() {
        let mut harness = Harness::new();
        let baseline = harness.state.clone();
        harness.tick_to(4);
        let mut edited = baseline.clone();
        edited.world.config.storage_limit = Decimal::from(50);

        let result = harness.operator(GodmodeArgs {
            baseline: Box::new(baseline),
            edited: Box::new(edited),
        });
        assert!(result.is_committed(), "{result:?}");
        assert_eq!(result.warnings().count(), 0);
        assert_eq!(harness.state.world.config.storage_limit, Decimal::from(50));
        assert_eq!(harness.state.world.clock, Tick(4));
    }

    #[test]
    fn godmode_refuses_an_invalid_config() {
        let mut harness = Harness::new();
        let baseline = harness.state.clone();
        let mut edited = baseline.clone();
        edited.world.config.residents_per_food = 0;

        let result = harness.operator(GodmodeArgs {
            baseline: Box::new(baseline.clone()),
            edited: Box::new(edited),
        });
        assert_eq!(first_error(&result), Some("ACTION_INVALID_CONFIG"));
        assert_eq!(harness.state, baseline);

        let meal = ResourceCost::new()
            .with("pro-grain", Decimal::from(4))
            .with("pro-fish", Decimal::from(3))
            .with("pro-meat", Decimal::from(3));
        assert!(harness.submit("red", FeedArgs { provided: meal }).is_committed());
    }
}
