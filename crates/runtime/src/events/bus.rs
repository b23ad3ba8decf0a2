//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{ActionEvent, NotificationEvent, TickEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Submissions (committed, rejected, aborted)
    Action,
    /// Clock advances and consumed delayed effects
    Tick,
    /// Per-team notifications
    Notification,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Action, Topic::Tick, Topic::Notification];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Action(ActionEvent),
    Tick(TickEvent),
    Notification(NotificationEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Action(_) => Topic::Action,
            Event::Tick(_) => Topic::Tick,
            Event::Notification(_) => Topic::Notification,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created once, so publishing and
/// subscribing never lock.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self {
            channels: Arc::new(channels),
        }
    }

    fn sender(&self, topic: Topic) -> Option<&broadcast::Sender<Event>> {
        self.channels.get(&topic)
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Some(tx) = self.sender(topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.sender(topic) {
            Some(tx) => tx.subscribe(),
            // every topic is created up front
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
