mod common;

use std::time::Duration;

use async_trait::async_trait;
use game_core::{TeamId, Tick};
use runtime::{
    ActionEvent, ChannelSink, Event, LogSink, NotificationEvent, NotificationSink, SinkError,
    Submission, Topic,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

use common::start;

const WAIT: Duration = Duration::from_secs(2);

fn wood_to_blue(amount: u32) -> Submission {
    Submission::new(
        "trade",
        json!({"receiver": "blue", "resources": {"pro-wood": amount}}),
    )
    .by("red")
}

struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn deliver(&self, _notification: &NotificationEvent) -> Result<(), SinkError> {
        Err(SinkError("mailbox full".into()))
    }
}

#[tokio::test]
async fn trade_notifies_the_receiver_once() {
    let (tx, mut rx) = mpsc::channel(8);
    let runtime = start(ChannelSink::new(tx)).await;
    let handle = runtime.handle();

    let report = handle.submit_with(wood_to_blue(5)).await.unwrap();
    assert!(report.is_committed(), "{report:?}");
    assert_eq!(report.notifications.len(), 1);

    let delivered = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivered.team, TeamId::from("blue"));
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
}

#[tokio::test]
async fn failing_sink_never_blocks_the_game() {
    let runtime = start(FailingSink).await;
    let handle = runtime.handle();

    assert!(handle.submit_with(wood_to_blue(2)).await.unwrap().is_committed());
    assert!(handle.submit_with(wood_to_blue(3)).await.unwrap().is_committed());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn action_topic_sees_commits_and_rejections() {
    let runtime = start(LogSink).await;
    let handle = runtime.handle();
    let mut actions = handle.subscribe(Topic::Action);

    handle.submit_with(wood_to_blue(1)).await.unwrap();
    handle.submit_with(wood_to_blue(500)).await.unwrap();

    let first = timeout(WAIT, actions.recv()).await.unwrap().unwrap();
    assert!(matches!(first, Event::Action(ActionEvent::Committed { .. })));
    let second = timeout(WAIT, actions.recv()).await.unwrap().unwrap();
    assert!(matches!(
        second,
        Event::Action(ActionEvent::Rejected { ref code, .. }) if code == "ACTION_INSUFFICIENT_RESOURCES"
    ));
}

#[tokio::test]
async fn ticks_publish_and_never_rewind() {
    let runtime = start(LogSink).await;
    let handle = runtime.handle();
    let mut ticks = handle.subscribe(Topic::Tick);

    let planks = Submission::new("vyroba", json!({"vyroba": "vyr-planks", "count": 2})).by("red");
    handle.submit_with(planks).await.unwrap();

    let summary = handle.tick(Tick(4)).await.unwrap();
    assert_eq!(summary.clock, Tick(4));
    assert_eq!(summary.effects.len(), 1);

    match timeout(WAIT, ticks.recv()).await.unwrap().unwrap() {
        Event::Tick(event) => {
            assert_eq!(event.clock, Tick(4));
            assert_eq!(event.effects, 1);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let summary = handle.tick(Tick(1)).await.unwrap();
    assert_eq!(summary.clock, Tick(4));
    assert!(summary.effects.is_empty());
    assert_eq!(handle.snapshot().await.unwrap().world.clock, Tick(4));
}
