//! Simulation worker that owns the authoritative [`game_core::GameState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs them
//! through [`game_core::GameEngine`] one at a time and publishes events to the
//! EventBus once the new state is in place. Being the only writer, each
//! command is a critical section over the whole state.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use game_core::{
    ActionQuote, ActionRegistry, ActionResult, Catalog, DiceRoll, ExecuteError, GameEngine,
    GameError, GameState, InitiatedAction, Message, TeamId, Tick,
};

use crate::api::{Result, RuntimeError, Submission, SubmissionReport, TickSummary};
use crate::events::{ActionEvent, Event, EventBus, NotificationEvent, TickEvent};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Initiate and commit in one step.
    Submit {
        submission: Submission,
        reply: oneshot::Sender<Result<SubmissionReport>>,
    },
    /// Check preconditions and affordability without mutating anything.
    Initiate {
        submission: Submission,
        reply: oneshot::Sender<Result<InitiatedAction>>,
    },
    /// Commit a previously initiated action against the current state.
    Commit {
        initiated: Box<InitiatedAction>,
        roll: Option<DiceRoll>,
        reply: oneshot::Sender<Result<SubmissionReport>>,
    },
    /// Price an action without running preconditions.
    Preview {
        submission: Submission,
        reply: oneshot::Sender<Result<ActionQuote>>,
    },
    /// Advance the clock and apply due delayed effects.
    Tick {
        current: Tick,
        reply: oneshot::Sender<Result<TickSummary>>,
    },
    /// Query the current game state (read-only).
    Snapshot { reply: oneshot::Sender<GameState> },
}

/// Background task that processes gameplay commands.
pub struct SimulationWorker {
    state: GameState,
    catalog: Arc<Catalog>,
    registry: Arc<ActionRegistry>,
    tick_seconds: u64,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    pub fn new(
        state: GameState,
        catalog: Arc<Catalog>,
        registry: Arc<ActionRegistry>,
        tick_seconds: u64,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "runtime::worker",
            teams = state.teams.len(),
            clock = %state.world.clock,
            pending = state.scheduler.len(),
            "SimulationWorker initialized"
        );

        Self {
            state,
            catalog,
            registry,
            tick_seconds,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends once every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }
        debug!(target: "runtime::worker", "command channel closed, worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Submit { submission, reply } => {
                let result = self.handle_submit(submission);
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::Initiate { submission, reply } => {
                let result = self.handle_initiate(submission);
                if reply.send(result).is_err() {
                    debug!("Initiate reply channel closed (caller dropped)");
                }
            }
            Command::Commit {
                initiated,
                roll,
                reply,
            } => {
                let result = self.handle_commit(&initiated, roll.as_ref());
                if reply.send(result).is_err() {
                    debug!("Commit reply channel closed (caller dropped)");
                }
            }
            Command::Preview { submission, reply } => {
                let result = self.handle_preview(submission);
                if reply.send(result).is_err() {
                    debug!("Preview reply channel closed (caller dropped)");
                }
            }
            Command::Tick { current, reply } => {
                let result = self.handle_tick(current);
                if reply.send(result).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn engine(&mut self) -> GameEngine<'_> {
        GameEngine::new(&mut self.state, &self.catalog, &self.registry)
    }

    fn handle_submit(&mut self, submission: Submission) -> Result<SubmissionReport> {
        let request = submission.decode(&self.registry)?;
        let (kind, team) = (request.kind(), request.team.clone());
        debug!(target: "runtime::worker", %kind, team = ?team, "submit");

        let outcome = self.engine().submit(request, submission.roll.as_ref());
        match outcome {
            Ok(result) => Ok(self.finish(result)),
            Err(error) => Err(self.abort(error, team)),
        }
    }

    fn handle_initiate(&mut self, submission: Submission) -> Result<InitiatedAction> {
        let request = submission.decode(&self.registry)?;
        let team = request.team.clone();
        self.engine().initiate(request).map_err(|error| {
            debug!(
                target: "runtime::worker",
                kind = %error.kind(),
                team = ?team,
                code = error.error_code(),
                "initiate refused"
            );
            RuntimeError::Execute(error)
        })
    }

    fn handle_commit(
        &mut self,
        initiated: &InitiatedAction,
        roll: Option<&DiceRoll>,
    ) -> Result<SubmissionReport> {
        let request = &initiated.request;
        let (kind, team) = (request.kind(), request.team.clone());

        let outcome = self.engine().commit(initiated, roll);
        match outcome {
            Ok(result) => Ok(self.finish(result)),
            Err(ExecuteError::Rejected { error, .. }) => {
                let message = Message::error(error.error.error_code(), error.error.to_string());
                Ok(self.finish(ActionResult::rejected(kind, team, message)))
            }
            Err(error) => Err(self.abort(error, team)),
        }
    }

    fn handle_preview(&mut self, submission: Submission) -> Result<ActionQuote> {
        let request = submission.decode(&self.registry)?;
        Ok(self.engine().preview(&request)?)
    }

    fn handle_tick(&mut self, current: Tick) -> Result<TickSummary> {
        let outcome = self.engine().tick(current);
        let report = match outcome {
            Ok(report) => report,
            Err(error) => return Err(self.abort(error, None)),
        };

        if !report.effects.is_empty() || !report.diff.is_empty() {
            debug!(
                target: "runtime::worker",
                clock = %report.clock,
                effects = report.effects.len(),
                "tick applied"
            );
            self.event_bus.publish(Event::Tick(TickEvent {
                clock: report.clock,
                effects: report.effects.len(),
                diff: report.diff.clone(),
            }));
        }

        let effects = report
            .effects
            .into_iter()
            .map(|effect| self.finish(effect))
            .collect();
        Ok(TickSummary {
            clock: report.clock,
            effects,
            diff: report.diff,
        })
    }

    /// Publishes the outcome of an applied or refused action and converts it
    /// for the caller. Runs after the state swap.
    fn finish(&self, result: ActionResult) -> SubmissionReport {
        let clock = self.state.world.clock;

        for (team, messages) in &result.notifications {
            for message in messages {
                self.event_bus
                    .publish(Event::Notification(NotificationEvent {
                        team: team.clone(),
                        message: message.clone(),
                        clock,
                    }));
            }
        }

        if result.is_committed() {
            self.event_bus.publish(Event::Action(ActionEvent::Committed {
                result: Box::new(result.clone()),
                clock,
            }));
        } else {
            let (code, text) = result
                .errors()
                .next()
                .map(|message| (message.template.clone(), message.text.clone()))
                .unwrap_or_default();
            debug!(
                target: "runtime::worker",
                kind = %result.kind,
                team = ?result.team,
                %code,
                "action rejected"
            );
            self.event_bus.publish(Event::Action(ActionEvent::Rejected {
                kind: result.kind,
                team: result.team.clone(),
                code,
                error: text,
                clock,
            }));
        }

        SubmissionReport::from_result(result, self.tick_seconds)
    }

    fn abort(&self, error: ExecuteError, team: Option<TeamId>) -> RuntimeError {
        error!(
            target: "runtime::worker",
            kind = %error.kind(),
            phase = error.phase().as_str(),
            code = error.error_code(),
            error = %error,
            "integrity failure, state left untouched"
        );
        self.event_bus.publish(Event::Action(ActionEvent::Aborted {
            kind: error.kind(),
            team,
            phase: error.phase(),
            error: error.to_string(),
            clock: self.state.world.clock,
        }));
        RuntimeError::Execute(error)
    }
}
