//! Notification delivery worker.
//!
//! Subscribes to [`Topic::Notification`] and hands every notification to the
//! configured [`NotificationSink`]. Runs decoupled from the simulation: a
//! slow or failing sink only ever produces log lines.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::api::NotificationSink;
use crate::events::{Event, EventBus, Topic};

pub struct NotificationWorker {
    event_rx: broadcast::Receiver<Event>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationWorker {
    pub fn new(event_bus: &EventBus, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            event_rx: event_bus.subscribe(Topic::Notification),
            sink,
        }
    }

    /// Main worker loop. Ends when the event bus is gone.
    pub async fn run(mut self) {
        info!(target: "runtime::notify", "NotificationWorker started");
        loop {
            match self.event_rx.recv().await {
                Ok(Event::Notification(notification)) => {
                    if let Err(error) = self.sink.deliver(&notification).await {
                        warn!(
                            target: "runtime::notify",
                            team = %notification.team,
                            template = %notification.message.template,
                            %error,
                            "notification dropped"
                        );
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "runtime::notify", skipped, "notification worker lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!(target: "runtime::notify", "NotificationWorker stopped");
    }
}
