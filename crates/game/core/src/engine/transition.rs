//! Phase drivers shared by initiate, commit and tick.

use crate::action::{
    ActionArgs, ActionBehavior, ActionContext, ActionKind, ActionRejected, EffectContext, ensure,
};
use crate::cost::{DiceRequirement, DiceRoll};
use crate::state::{GameState, IntegrityViolation};

use super::ActionQuote;
use super::errors::{ExecuteError, TransitionPhase};

/// Prices a request against the context's state and, when `validate` is set
/// and the kind asks for it, runs its static preconditions.
pub(super) fn evaluate(
    behavior: &dyn ActionBehavior,
    ctx: &ActionContext<'_>,
    args: &ActionArgs,
    phase: TransitionPhase,
    validate: bool,
) -> Result<ActionQuote, ExecuteError> {
    let kind = ctx.kind;
    let reject = |error| ExecuteError::rejected(kind, phase, error);

    if ctx.team.is_some() {
        ctx.team().map_err(reject)?;
    }
    if validate && behavior.capabilities().checks_on_initiate() {
        behavior.initiate_check(args, ctx).map_err(reject)?;
    }

    let cost = behavior.cost(args, ctx).map_err(reject)?;
    let dice = behavior.dice(args, ctx).map_err(reject)?;
    let delay = behavior.delay(args, ctx).map_err(reject)?;

    if !dice.is_consistent() {
        return Err(ExecuteError::integrity(
            kind,
            phase,
            IntegrityViolation::InvalidDicePairing {
                kind,
                dots: dice.required_dots,
                dice: dice.allowed.len(),
            },
        ));
    }
    if let Some((resource, amount)) = cost.negative_entry() {
        return Err(reject(ActionRejected::NonPositiveAmount {
            resource: resource.clone(),
            amount,
        }));
    }

    Ok(ActionQuote {
        kind,
        team: ctx.team.cloned(),
        cost,
        dice,
        delay,
    })
}

/// The acting team can pay the quote and owns a die it may throw.
pub(super) fn check_payable(
    quote: &ActionQuote,
    ctx: &ActionContext<'_>,
    phase: TransitionPhase,
) -> Result<(), ExecuteError> {
    let reject = |error| ExecuteError::rejected(quote.kind, phase, error);

    if quote.dice.requires_throw() {
        let team = ctx.team().map_err(reject)?;
        let owned = ctx.catalog.available_dice(&team.researched);
        ensure(!owned.is_disjoint(&quote.dice.allowed), || {
            ActionRejected::DiceUnavailable {
                team: team.id.clone(),
                kind: quote.kind,
            }
        })
        .map_err(reject)?;
    }

    if !quote.cost.is_free() {
        let team = ctx.team().map_err(reject)?;
        team.resources
            .can_afford(&quote.cost)
            .map_err(|source| ActionRejected::Insufficient {
                team: team.id.clone(),
                source,
            })
            .map_err(reject)?;
    }
    Ok(())
}

/// Checks the organizer-supplied throw against the requirement.
pub(super) fn verify_roll(
    dice: &DiceRequirement,
    roll: Option<&DiceRoll>,
    ctx: &ActionContext<'_>,
) -> Result<(), ActionRejected> {
    if !dice.requires_throw() {
        return Ok(());
    }
    let required = dice.required_dots;
    let roll = roll.ok_or(ActionRejected::RollMissing { required })?;
    ensure(dice.allowed.contains(&roll.die), || {
        ActionRejected::RollNotAllowed {
            die: roll.die.clone(),
        }
    })?;

    let team = ctx.team()?;
    ensure(ctx.catalog.is_available(&team.researched, &roll.die), || {
        ActionRejected::DieNotOwned {
            team: team.id.clone(),
            die: roll.die.clone(),
        }
    })?;
    ensure(roll.dots >= required, || ActionRejected::RollTooLow {
        dots: roll.dots,
        required,
    })
}

/// Pays the quote and applies the immediate effect on `ctx.state`.
pub(super) fn drive_commit(
    behavior: &dyn ActionBehavior,
    quote: &ActionQuote,
    args: &ActionArgs,
    ctx: &mut EffectContext<'_>,
) -> Result<(), ExecuteError> {
    let kind = quote.kind;
    let reject = |error| ExecuteError::rejected(kind, TransitionPhase::Commit, error);

    if !quote.cost.is_free() {
        let team = ctx.team_mut().map_err(reject)?;
        let id = team.id.clone();
        team.resources
            .spend(&quote.cost)
            .map_err(|source| ActionRejected::Insufficient { team: id, source })
            .map_err(reject)?;
    }
    behavior.commit(args, ctx).map_err(reject)
}

/// Integrity gate before a working copy replaces the canonical state.
pub(super) fn post_validate(
    kind: ActionKind,
    state: &GameState,
) -> Result<(), ExecuteError> {
    state
        .check_integrity()
        .map_err(|error| ExecuteError::integrity(kind, TransitionPhase::PostValidate, error))
}
