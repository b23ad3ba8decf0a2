//! Action execution pipeline and delayed-effect ticking.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! mutation, whether a player action, an operator action or a due delayed
//! effect, runs against a working copy that replaces the canonical state only
//! once it has passed the integrity check. A rejected attempt leaves the
//! state exactly as it was.

mod errors;
#[cfg(test)]
pub(crate) mod testing;
mod transition;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

use crate::action::{
    ActionArgs, ActionContext, ActionKind, ActionRegistry, ActionRejected, ActionResult,
    EffectContext, Message, Report,
};
use crate::catalog::Catalog;
use crate::cost::{DiceRequirement, DiceRoll, ResourceCost};
use crate::error::GameError;
use crate::rng::{PcgRng, RngOracle};
use crate::state::{GameState, StateDiff, TeamId, Tick};

/// An action kind with its arguments and optional acting team.
///
/// Operator actions carry no team.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub team: Option<TeamId>,
    pub args: ActionArgs,
}

impl ActionRequest {
    pub fn by_team(team: impl Into<TeamId>, args: impl Into<ActionArgs>) -> Self {
        Self {
            team: Some(team.into()),
            args: args.into(),
        }
    }

    pub fn operator(args: impl Into<ActionArgs>) -> Self {
        Self {
            team: None,
            args: args.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.args.kind()
    }
}

/// Price of an action against a given state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionQuote {
    pub kind: ActionKind,
    pub team: Option<TeamId>,
    pub cost: ResourceCost,
    pub dice: DiceRequirement,
    /// Ticks between commit and the delayed effect.
    pub delay: u64,
}

/// A request that passed initiate: its preconditions held and the team could
/// pay when it was checked. Nothing has been deducted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiatedAction {
    pub request: ActionRequest,
    pub quote: ActionQuote,
}

/// Outcome of one scheduler tick.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    /// Clock after the tick.
    pub clock: Tick,
    /// One result per consumed effect, in scheduling order.
    pub effects: Vec<ActionResult>,
    pub diff: StateDiff,
}

/// Game engine that prices, validates and applies actions.
///
/// Owns no data: the caller keeps the state, catalog and registry and builds
/// an engine around them for each critical section.
pub struct GameEngine<'a> {
    state: &'a mut GameState,
    catalog: &'a Catalog,
    registry: &'a ActionRegistry,
    rng: &'a dyn RngOracle,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState, catalog: &'a Catalog, registry: &'a ActionRegistry) -> Self {
        Self {
            state,
            catalog,
            registry,
            rng: &PcgRng,
        }
    }

    #[must_use]
    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &GameState {
        &*self.state
    }

    fn context<'s>(&'s self, request: &'s ActionRequest) -> ActionContext<'s> {
        ActionContext {
            kind: request.kind(),
            catalog: self.catalog,
            state: &*self.state,
            team: request.team.as_ref(),
        }
    }

    /// Cost, dice and delay without running any precondition.
    pub fn preview(&self, request: &ActionRequest) -> Result<ActionQuote, ExecuteError> {
        let behavior = self.registry.behavior(request.kind());
        let ctx = self.context(request);
        transition::evaluate(behavior, &ctx, &request.args, TransitionPhase::Initiate, false)
    }

    /// `Created → Initiated`: checks static preconditions, dice availability
    /// and affordability. Never mutates state.
    pub fn initiate(&self, request: ActionRequest) -> Result<InitiatedAction, ExecuteError> {
        let behavior = self.registry.behavior(request.kind());
        let ctx = self.context(&request);
        let quote =
            transition::evaluate(behavior, &ctx, &request.args, TransitionPhase::Initiate, true)?;
        transition::check_payable(&quote, &ctx, TransitionPhase::Initiate)?;
        Ok(InitiatedAction { request, quote })
    }

    /// `Initiated → Committed`: re-validates against the current state,
    /// verifies the throw, pays, applies the immediate effect and schedules
    /// the delayed one. All or nothing.
    pub fn commit(
        &mut self,
        initiated: &InitiatedAction,
        roll: Option<&DiceRoll>,
    ) -> Result<ActionResult, ExecuteError> {
        let request = &initiated.request;
        let kind = request.kind();
        let behavior = self.registry.behavior(kind);

        let quote = {
            let ctx = self.context(request);
            let quote =
                transition::evaluate(behavior, &ctx, &request.args, TransitionPhase::Commit, true)?;
            transition::check_payable(&quote, &ctx, TransitionPhase::Commit)?;
            transition::verify_roll(&quote.dice, roll, &ctx)
                .map_err(|error| ExecuteError::rejected(kind, TransitionPhase::Commit, error))?;
            quote
        };

        let mut working = self.state.clone();
        let mut report = Report::default();
        {
            let mut ctx = EffectContext {
                kind,
                catalog: self.catalog,
                state: &mut working,
                team: request.team.as_ref(),
                rng: self.rng,
                report: &mut report,
            };
            transition::drive_commit(behavior, &quote, &request.args, &mut ctx)?;
        }

        let pending = if behavior.capabilities().is_delayed() {
            let team = request.team.clone().ok_or_else(|| {
                ExecuteError::rejected(
                    kind,
                    TransitionPhase::Commit,
                    ActionRejected::MissingTeam { kind },
                )
            })?;
            let now = working.world.clock;
            Some(working.scheduler.schedule(
                kind,
                team,
                request.args.clone(),
                now,
                now + quote.delay,
            ))
        } else {
            None
        };

        transition::post_validate(kind, &working)?;
        let diff = StateDiff::between(self.state, &working);
        *self.state = working;

        let mut result = ActionResult::committed(kind, request.team.clone(), report, diff);
        if pending.is_some() {
            result.scheduled_delay = Some(quote.delay);
            result.pending = pending;
        }
        Ok(result)
    }

    /// Initiate and commit in one critical section.
    ///
    /// Rejections come back as a `Rejected` result carrying the reason; only
    /// integrity failures surface as errors.
    pub fn submit(
        &mut self,
        request: ActionRequest,
        roll: Option<&DiceRoll>,
    ) -> Result<ActionResult, ExecuteError> {
        let kind = request.kind();
        let team = request.team.clone();
        let outcome = self
            .initiate(request)
            .and_then(|initiated| self.commit(&initiated, roll));

        match outcome {
            Ok(result) => Ok(result),
            Err(ExecuteError::Rejected { error, .. }) => Ok(ActionResult::rejected(
                kind,
                team,
                Message::error(error.error.error_code(), error.error.to_string()),
            )),
            Err(error) => Err(error),
        }
    }

    /// Applies every pending effect due at `current`, each exactly once and
    /// in scheduling order.
    ///
    /// The clock never moves backwards. An effect whose preconditions no
    /// longer hold is consumed without effect and reported as rejected. An
    /// integrity failure aborts the whole tick.
    pub fn tick(&mut self, current: Tick) -> Result<TickReport, ExecuteError> {
        let mut next = self.state.clone();
        next.world.clock = next.world.clock.max(current);
        let clock = next.world.clock;
        let mut effects = Vec::new();

        for seq in next.scheduler.due_at(clock) {
            let mut attempt = next.clone();
            let Some(effect) = attempt.scheduler.take(seq) else {
                continue;
            };
            let behavior = self.registry.behavior(effect.kind);
            let mut report = Report::default();
            let outcome = {
                let mut ctx = EffectContext {
                    kind: effect.kind,
                    catalog: self.catalog,
                    state: &mut attempt,
                    team: Some(&effect.team),
                    rng: self.rng,
                    report: &mut report,
                };
                behavior.delayed(&effect.args, &mut ctx)
            };

            let mut result = match outcome {
                Ok(()) => {
                    transition::post_validate(effect.kind, &attempt)?;
                    let diff = StateDiff::between(&next, &attempt);
                    next = attempt;
                    ActionResult::committed(effect.kind, Some(effect.team.clone()), report, diff)
                }
                Err(rejected) => {
                    next.scheduler.take(seq);
                    let message = Message::error(rejected.error_code(), rejected.to_string())
                        .with_ref(&effect.team);
                    let mut result =
                        ActionResult::rejected(effect.kind, Some(effect.team.clone()), message.clone());
                    result
                        .notifications
                        .entry(effect.team.clone())
                        .or_default()
                        .push(message);
                    result.diff = StateDiff {
                        scheduler: true,
                        ..StateDiff::default()
                    };
                    result
                }
            };
            result.pending = Some(seq);
            effects.push(result);
        }

        let diff = StateDiff::between(self.state, &next);
        *self.state = next;
        Ok(TickReport {
            clock,
            effects,
            diff,
        })
    }
}
