//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the simulation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use game_core::{ActionRegistry, Catalog, GameState};

use crate::api::{LogSink, NotificationSink, Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, NotificationWorker, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Wall-clock length of one tick, used to report delays in seconds.
    pub tick_seconds: u64,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_SECONDS: u64 = 60;
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            tick_seconds: Self::DEFAULT_TICK_SECONDS,
        }
    }
}

/// Main runtime that orchestrates game simulation
///
/// Runtime owns workers; [`RuntimeHandle`] provides a cloneable façade for
/// clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
    notify_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Workers stop once every outstanding handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        self.notify_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    state: Option<GameState>,
    catalog: Option<Catalog>,
    registry: Option<ActionRegistry>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            state: None,
            catalog: None,
            registry: None,
            sink: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide initial game state (required)
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Provide the validated entity catalog (required)
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replace the built-in rule set.
    pub fn registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the notification sink. Defaults to [`LogSink`].
    pub fn sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the runtime and spawn its workers
    pub async fn build(self) -> Result<Runtime> {
        let state = self.state.ok_or(RuntimeError::MissingComponent {
            what: "an initial state",
        })?;
        let catalog = self.catalog.ok_or(RuntimeError::MissingComponent {
            what: "a catalog",
        })?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => ActionRegistry::standard()?,
        };
        let sink = self.sink.unwrap_or_else(|| Arc::new(LogSink));

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        // Subscribe before the simulation can publish anything.
        let notify_worker = NotificationWorker::new(&event_bus, sink);
        let notify_worker_handle = tokio::spawn(async move {
            notify_worker.run().await;
        });

        let sim_worker = SimulationWorker::new(
            state,
            Arc::new(catalog),
            Arc::new(registry),
            self.config.tick_seconds,
            command_rx,
            event_bus,
        );
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
            notify_worker_handle,
        })
    }
}
