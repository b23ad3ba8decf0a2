//! Runtime orchestration for the live strategy game.
//!
//! This crate wires the deterministic rules of `game-core` into a
//! single-writer tokio worker, a topic-based event bus and an asynchronous
//! notification worker. Consumers embed [`Runtime`] and interact with the
//! world through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    ChannelSink, LogSink, NotificationSink, Result, RuntimeError, RuntimeHandle, SinkError,
    Submission, SubmissionReport, TickSummary,
};
pub use events::{ActionEvent, Event, EventBus, NotificationEvent, TickEvent, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
