//! Event types for different topics.

use serde::{Deserialize, Serialize};

use game_core::{ActionKind, ActionResult, Message, StateDiff, TeamId, Tick, TransitionPhase};

/// Events related to submitted actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionEvent {
    /// The action passed commit and its state is live.
    Committed {
        result: Box<ActionResult>,
        clock: Tick,
    },

    /// A precondition failed. State is untouched.
    Rejected {
        kind: ActionKind,
        team: Option<TeamId>,
        code: String,
        error: String,
        clock: Tick,
    },

    /// The action would have broken a state invariant. State is untouched.
    Aborted {
        kind: ActionKind,
        team: Option<TeamId>,
        phase: TransitionPhase,
        error: String,
        clock: Tick,
    },
}

/// Published after every tick that moved the clock or consumed an effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickEvent {
    pub clock: Tick,
    /// Delayed effects consumed by this tick, committed or not.
    pub effects: usize,
    pub diff: StateDiff,
}

/// One message addressed to one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub team: TeamId,
    pub message: Message,
    pub clock: Tick,
}
