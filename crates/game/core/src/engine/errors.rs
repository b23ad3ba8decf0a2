//! Error types for the action execution pipeline.

use crate::action::{ActionKind, ActionRejected};
use crate::error::{ErrorSeverity, GameError};
use crate::state::IntegrityViolation;

/// Identifies which stage of the pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    Initiate,
    Commit,
    Delayed,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::Initiate => "initiate",
            TransitionPhase::Commit => "commit",
            TransitionPhase::Delayed => "delayed",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while running an action through the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    /// A precondition failed. State is untouched.
    #[error("{kind} rejected: {error}")]
    Rejected {
        kind: ActionKind,
        error: TransitionPhaseError<ActionRejected>,
    },

    /// The action would have broken a state invariant. State is untouched.
    #[error("{kind} aborted: {error}")]
    Integrity {
        kind: ActionKind,
        error: TransitionPhaseError<IntegrityViolation>,
    },
}

impl ExecuteError {
    pub fn rejected(kind: ActionKind, phase: TransitionPhase, error: ActionRejected) -> Self {
        Self::Rejected {
            kind,
            error: TransitionPhaseError::new(phase, error),
        }
    }

    pub fn integrity(kind: ActionKind, phase: TransitionPhase, error: IntegrityViolation) -> Self {
        Self::Integrity {
            kind,
            error: TransitionPhaseError::new(phase, error),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Rejected { kind, .. } | Self::Integrity { kind, .. } => *kind,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        match self {
            Self::Rejected { error, .. } => error.phase,
            Self::Integrity { error, .. } => error.phase,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected { error, .. } => error.error.severity(),
            Self::Integrity { error, .. } => error.error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { error, .. } => error.error.error_code(),
            Self::Integrity { error, .. } => error.error.error_code(),
        }
    }
}
