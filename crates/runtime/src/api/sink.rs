//! Asynchronous delivery of per-team notifications.
//!
//! Runtime users plug in a [`NotificationSink`] to forward notifications to
//! wherever teams read them. Delivery happens after the state has been
//! swapped in, so a failing sink never affects the game.
use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::events::NotificationEvent;

/// Delivery failure reported by a sink. Logged, never propagated.
#[derive(Debug)]
pub struct SinkError(pub String);

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification delivery failed: {}", self.0)
    }
}

impl std::error::Error for SinkError {}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &NotificationEvent) -> Result<(), SinkError>;
}

/// Writes every notification to the log.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &NotificationEvent) -> Result<(), SinkError> {
        tracing::info!(
            target: "runtime::notify",
            team = %notification.team,
            template = %notification.message.template,
            clock = %notification.clock,
            "{}",
            notification.message.text
        );
        Ok(())
    }
}

/// Forwards notifications into an mpsc channel.
pub struct ChannelSink {
    tx: mpsc::Sender<NotificationEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<NotificationEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, notification: &NotificationEvent) -> Result<(), SinkError> {
        self.tx
            .send(notification.clone())
            .await
            .map_err(|_| SinkError("receiver dropped".into()))
    }
}
