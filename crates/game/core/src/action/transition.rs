use super::error::ActionRejected;
use super::kind::{ActionArgs, ActionArguments, ActionKind};
use super::registry::Capabilities;
use super::result::{Message, Report};
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::cost::{DiceRequirement, ResourceCost};
use crate::rng::RngOracle;
use crate::state::{Army, ArmyId, EntityId, GameState, TeamId, TeamState, TileIndex};

/// Defines how one action kind prices, validates and mutates the game.
///
/// `cost`, `dice`, `delay` and `initiate_check` see the state read-only and
/// must stay side-effect free; they run again at commit against the state of
/// that moment. `commit` applies the immediate effect after the engine has
/// collected payment. `delayed` runs once when the scheduled effect is due.
pub trait ActionTransition: Send + Sync + 'static {
    type Args: ActionArguments;

    const CAPABILITIES: Capabilities;

    fn cost(&self, _args: &Self::Args, _ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        Ok(ResourceCost::new())
    }

    fn dice(
        &self,
        _args: &Self::Args,
        _ctx: &ActionContext<'_>,
    ) -> Result<DiceRequirement, ActionRejected> {
        Ok(DiceRequirement::none())
    }

    /// Ticks between commit and the delayed effect.
    fn delay(&self, _args: &Self::Args, _ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        Ok(0)
    }

    /// Static preconditions checked before anything is paid.
    fn initiate_check(&self, _args: &Self::Args, _ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        Ok(())
    }

    fn commit(&self, args: &Self::Args, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected>;

    fn delayed(&self, _args: &Self::Args, _ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        Ok(())
    }
}

/// Object-safe view of an [`ActionTransition`], stored in the registry.
pub trait ActionBehavior: Send + Sync {
    fn kind(&self) -> ActionKind;
    fn capabilities(&self) -> Capabilities;
    fn cost(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected>;
    fn dice(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<DiceRequirement, ActionRejected>;
    fn delay(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected>;
    fn initiate_check(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected>;
    fn commit(&self, args: &ActionArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected>;
    fn delayed(&self, args: &ActionArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected>;
}

fn typed<A: ActionArguments>(args: &ActionArgs) -> Result<&A, ActionRejected> {
    A::extract(args).ok_or(ActionRejected::ArgumentShape {
        expected: A::KIND,
        got: args.kind(),
    })
}

impl<T: ActionTransition> ActionBehavior for T {
    fn kind(&self) -> ActionKind {
        <T::Args as ActionArguments>::KIND
    }

    fn capabilities(&self) -> Capabilities {
        T::CAPABILITIES
    }

    fn cost(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<ResourceCost, ActionRejected> {
        ActionTransition::cost(self, typed(args)?, ctx)
    }

    fn dice(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<DiceRequirement, ActionRejected> {
        ActionTransition::dice(self, typed(args)?, ctx)
    }

    fn delay(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<u64, ActionRejected> {
        ActionTransition::delay(self, typed(args)?, ctx)
    }

    fn initiate_check(&self, args: &ActionArgs, ctx: &ActionContext<'_>) -> Result<(), ActionRejected> {
        ActionTransition::initiate_check(self, typed(args)?, ctx)
    }

    fn commit(&self, args: &ActionArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        ActionTransition::commit(self, typed(args)?, ctx)
    }

    fn delayed(&self, args: &ActionArgs, ctx: &mut EffectContext<'_>) -> Result<(), ActionRejected> {
        ActionTransition::delayed(self, typed(args)?, ctx)
    }
}

/// Read-only view handed to pricing and validation.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub kind: ActionKind,
    pub catalog: &'a Catalog,
    pub state: &'a GameState,
    pub team: Option<&'a TeamId>,
}

impl<'a> ActionContext<'a> {
    pub fn config(&self) -> &'a GameConfig {
        &self.state.world.config
    }

    pub fn team_id(&self) -> Result<&'a TeamId, ActionRejected> {
        self.team
            .ok_or(ActionRejected::MissingTeam { kind: self.kind })
    }

    pub fn team(&self) -> Result<&'a TeamState, ActionRejected> {
        let id = self.team_id()?;
        self.state
            .team(id)
            .ok_or_else(|| ActionRejected::UnknownTeam { team: id.clone() })
    }

    pub fn other_team(&self, id: &TeamId) -> Result<&'a TeamState, ActionRejected> {
        self.state
            .team(id)
            .ok_or_else(|| ActionRejected::UnknownTeam { team: id.clone() })
    }

    /// The acting team has unlocked `entity` through research.
    pub fn require_available(&self, entity: &EntityId) -> Result<(), ActionRejected> {
        let team = self.team()?;
        if self.catalog.is_available(&team.researched, entity) {
            Ok(())
        } else {
            Err(ActionRejected::NotAvailable {
                team: team.id.clone(),
                entity: entity.clone(),
            })
        }
    }

    pub fn require_tile(&self, tile: TileIndex) -> Result<(), ActionRejected> {
        match self.state.map.tile(tile) {
            Some(_) => Ok(()),
            None => Err(ActionRejected::UnknownTile { tile }),
        }
    }

    pub fn require_control(&self, tile: TileIndex) -> Result<(), ActionRejected> {
        self.require_tile(tile)?;
        let team = self.team_id()?;
        if self.state.controls_tile(team, tile) {
            Ok(())
        } else {
            Err(ActionRejected::NotControlled {
                team: team.clone(),
                tile,
            })
        }
    }

    pub fn army(&self, id: &ArmyId) -> Result<&'a Army, ActionRejected> {
        self.state
            .world
            .army(id)
            .ok_or_else(|| ActionRejected::UnknownArmy { army: id.clone() })
    }

    /// Army owned by the acting team.
    pub fn own_army(&self, id: &ArmyId) -> Result<&'a Army, ActionRejected> {
        let army = self.army(id)?;
        let team = self.team_id()?;
        if &army.owner == team {
            Ok(army)
        } else {
            Err(ActionRejected::NotArmyOwner {
                team: team.clone(),
                army: id.clone(),
            })
        }
    }
}

/// Mutable access handed to `commit` and `delayed`.
///
/// Works on the engine's working copy; nothing becomes visible unless the
/// whole action succeeds.
pub struct EffectContext<'a> {
    pub kind: ActionKind,
    pub catalog: &'a Catalog,
    pub state: &'a mut GameState,
    pub team: Option<&'a TeamId>,
    pub rng: &'a dyn RngOracle,
    pub report: &'a mut Report,
}

impl EffectContext<'_> {
    /// Re-borrows a read-only context, e.g. to reuse validation helpers.
    pub fn view(&self) -> ActionContext<'_> {
        ActionContext {
            kind: self.kind,
            catalog: self.catalog,
            state: &*self.state,
            team: self.team,
        }
    }

    pub fn team_id(&self) -> Result<TeamId, ActionRejected> {
        self.team
            .cloned()
            .ok_or(ActionRejected::MissingTeam { kind: self.kind })
    }

    pub fn team_mut(&mut self) -> Result<&mut TeamState, ActionRejected> {
        let id = self.team_id()?;
        self.team_named_mut(&id)
    }

    pub fn team_named_mut(&mut self, id: &TeamId) -> Result<&mut TeamState, ActionRejected> {
        self.state
            .team_mut(id)
            .ok_or_else(|| ActionRejected::UnknownTeam { team: id.clone() })
    }

    pub fn army_mut(&mut self, id: &ArmyId) -> Result<&mut Army, ActionRejected> {
        self.state
            .world
            .army_mut(id)
            .ok_or_else(|| ActionRejected::UnknownArmy { army: id.clone() })
    }

    pub fn info(&mut self, message: Message) {
        self.report.push(message);
    }

    /// Soft validation: records a warning and lets the action continue.
    pub fn warn_if(&mut self, condition: bool, message: impl FnOnce() -> Message) {
        if condition {
            self.report.push(message());
        }
    }

    pub fn warn(&mut self, message: Message) {
        self.report.push(message);
    }

    pub fn notify(&mut self, team: &TeamId, message: Message) {
        self.report.notify(team, message);
    }
}
