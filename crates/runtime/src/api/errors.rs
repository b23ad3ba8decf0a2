//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, request decoding and the engine
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ActionKind, CatalogError, ErrorSeverity, ExecuteError, GameError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires {what} to be configured before building")]
    MissingComponent { what: &'static str },

    #[error("unknown action kind {name:?}")]
    UnknownKind { name: String },

    #[error("malformed arguments for {kind}")]
    Decode {
        kind: ActionKind,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] CatalogError),

    /// Rejections from `initiate` and every integrity failure.
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownKind { .. } | Self::Decode { .. } => ErrorSeverity::Validation,
            Self::Execute(error) => error.severity(),
            Self::Registry(error) => error.severity(),
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingComponent { .. } => "RUNTIME_MISSING_COMPONENT",
            Self::UnknownKind { .. } => "RUNTIME_UNKNOWN_KIND",
            Self::Decode { .. } => "RUNTIME_DECODE",
            Self::Registry(error) => error.error_code(),
            Self::Execute(error) => error.error_code(),
        }
    }
}
