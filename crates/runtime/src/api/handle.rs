//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! submitting actions, ticking the clock or streaming events from specific
//! topics.
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{ActionQuote, DiceRoll, GameState, InitiatedAction, TeamId, Tick};

use super::errors::{Result, RuntimeError};
use super::report::{SubmissionReport, TickSummary};
use super::request::Submission;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Initiate and commit an action in one critical section.
    ///
    /// A refused action comes back as a rejected report; only decoding and
    /// integrity failures are errors.
    pub async fn submit(
        &self,
        kind: &str,
        args: Value,
        team: Option<TeamId>,
        roll: Option<DiceRoll>,
    ) -> Result<SubmissionReport> {
        self.submit_with(Submission {
            kind: kind.to_owned(),
            args,
            team,
            roll,
        })
        .await
    }

    pub async fn submit_with(&self, submission: Submission) -> Result<SubmissionReport> {
        self.request(|reply| Command::Submit { submission, reply })
            .await?
    }

    /// Check an action against the current state without changing it.
    ///
    /// Refusals surface as [`RuntimeError::Execute`] carrying the phase and
    /// reason.
    pub async fn initiate(&self, submission: Submission) -> Result<InitiatedAction> {
        self.request(|reply| Command::Initiate { submission, reply })
            .await?
    }

    /// Commit a previously initiated action. Preconditions are checked again
    /// against the state current at commit time.
    pub async fn commit(
        &self,
        initiated: InitiatedAction,
        roll: Option<DiceRoll>,
    ) -> Result<SubmissionReport> {
        self.request(|reply| Command::Commit {
            initiated: Box::new(initiated),
            roll,
            reply,
        })
        .await?
    }

    /// Cost, dice requirement and delay of an action, without preconditions.
    pub async fn preview(&self, submission: Submission) -> Result<ActionQuote> {
        self.request(|reply| Command::Preview { submission, reply })
            .await?
    }

    /// Signal that the clock reached `current`; applies every due effect.
    pub async fn tick(&self, current: Tick) -> Result<TickSummary> {
        self.request(|reply| Command::Tick { current, reply }).await?
    }

    /// Query the current game state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<GameState> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Action` - Committed, rejected and aborted submissions
    /// - `Topic::Tick` - Clock advances and consumed delayed effects
    /// - `Topic::Notification` - Per-team notifications
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
