//! Client-facing outcome records.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use game_core::{
    ActionKind, ActionResult, ActionStatus, Message, MessageLevel, StateDiff, TeamId, Tick,
};

/// Outcome of one submission or one delayed effect, split by message level.
///
/// Delays are converted to wall-clock seconds with the runtime's
/// `tick_seconds`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub kind: ActionKind,
    pub team: Option<TeamId>,
    pub status: ActionStatus,
    pub info: Vec<Message>,
    pub warnings: Vec<Message>,
    pub errors: Vec<Message>,
    pub notifications: BTreeMap<TeamId, Vec<Message>>,
    pub scheduled_delay_seconds: Option<u64>,
    /// Sequence number of the pending effect this report scheduled or consumed.
    pub pending: Option<u64>,
    pub diff: StateDiff,
}

impl SubmissionReport {
    pub fn from_result(result: ActionResult, tick_seconds: u64) -> Self {
        let mut info = Vec::new();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        for message in result.messages {
            match message.level {
                MessageLevel::Info => info.push(message),
                MessageLevel::Warning => warnings.push(message),
                MessageLevel::Error => errors.push(message),
            }
        }

        Self {
            kind: result.kind,
            team: result.team,
            status: result.status,
            info,
            warnings,
            errors,
            notifications: result.notifications,
            scheduled_delay_seconds: result
                .scheduled_delay
                .map(|ticks| ticks.saturating_mul(tick_seconds)),
            pending: result.pending,
            diff: result.diff,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.status == ActionStatus::Committed
    }

    /// Stable code of the first error, if the submission was rejected.
    pub fn error_code(&self) -> Option<&str> {
        self.errors.first().map(|message| message.template.as_str())
    }
}

/// Outcome of one tick: the clock afterwards and one report per consumed
/// delayed effect, in scheduling order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub clock: Tick,
    pub effects: Vec<SubmissionReport>,
    pub diff: StateDiff,
}
