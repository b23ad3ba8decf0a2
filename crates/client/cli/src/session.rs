//! Line protocol between an operator console and the runtime.
//!
//! Every input line is one JSON object:
//!
//! ```text
//! {"kind": "trade", "team": "red", "args": {...}}   submit an action
//! {"preview": {"kind": "research_start", "team": "red", "args": {...}}}
//! {"tick": 12}                                       clock reached tick 12
//! {"snapshot": true}                                 dump the game state
//! ```
//!
//! Every reply is one JSON object tagged with `report`, `quote`, `tick`,
//! `snapshot` or `error`.
use std::error::Error as StdError;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use game_core::{ActionQuote, GameError, GameState, Tick};
use runtime::{RuntimeError, RuntimeHandle, Submission, SubmissionReport, TickSummary};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Line {
    Tick { tick: Tick },
    Snapshot { snapshot: IgnoredAny },
    Preview { preview: Submission },
    Submit(Submission),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    Report(SubmissionReport),
    Quote(ActionQuote),
    Tick(TickSummary),
    Snapshot(Box<GameState>),
    Error { code: String, message: String },
}

impl Reply {
    fn error(code: impl Into<String>, message: String) -> Self {
        Self::Error {
            code: code.into(),
            message,
        }
    }
}

pub struct Session {
    handle: RuntimeHandle,
}

impl Session {
    pub fn new(handle: RuntimeHandle) -> Self {
        Self { handle }
    }

    /// Answer one input line.
    ///
    /// Malformed lines and refused requests become [`Reply::Error`]; only a
    /// runtime that stopped answering is an error.
    pub async fn process(&self, line: &str) -> Result<Reply, RuntimeError> {
        let parsed = match serde_json::from_str::<Line>(line) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(target: "cli::session", error = %err, "unreadable line");
                return Ok(Reply::error("CLI_MALFORMED_LINE", err.to_string()));
            }
        };

        let outcome = match parsed {
            Line::Submit(submission) => self.handle.submit_with(submission).await.map(Reply::Report),
            Line::Preview { preview } => self.handle.preview(preview).await.map(Reply::Quote),
            Line::Tick { tick } => self.handle.tick(tick).await.map(Reply::Tick),
            Line::Snapshot { .. } => self
                .handle
                .snapshot()
                .await
                .map(|state| Reply::Snapshot(Box::new(state))),
        };

        match outcome {
            Ok(reply) => Ok(reply),
            Err(err @ (RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_))) => {
                Err(err)
            }
            Err(err) => {
                tracing::warn!(
                    target: "cli::session",
                    code = err.error_code(),
                    error = %err,
                    "request failed"
                );
                Ok(Reply::error(err.error_code(), describe(&err)))
            }
        }
    }
}

/// Error message followed by its source chain.
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use game_content::ContentFactory;
    use runtime::{LogSink, Runtime, RuntimeConfig};
    use serde_json::{Value, json};

    use super::*;

    async fn session() -> (Runtime, Session) {
        let game = ContentFactory::embedded().expect("embedded content loads");
        let runtime = Runtime::builder()
            .config(RuntimeConfig::default())
            .catalog(game.catalog)
            .initial_state(game.state)
            .sink(LogSink)
            .build()
            .await
            .expect("runtime builds");
        let session = Session::new(runtime.handle());
        (runtime, session)
    }

    async fn reply(session: &Session, line: Value) -> Value {
        let reply = session.process(&line.to_string()).await.expect("runtime alive");
        serde_json::to_value(reply).expect("reply serializes")
    }

    #[test]
    fn lines_pick_the_right_request() {
        assert!(matches!(
            serde_json::from_str::<Line>(r#"{"tick": 3}"#).unwrap(),
            Line::Tick { tick: Tick(3) }
        ));
        assert!(matches!(
            serde_json::from_str::<Line>(r#"{"snapshot": true}"#).unwrap(),
            Line::Snapshot { .. }
        ));
        assert!(matches!(
            serde_json::from_str::<Line>(r#"{"preview": {"kind": "next_turn"}}"#).unwrap(),
            Line::Preview { .. }
        ));
        match serde_json::from_str::<Line>(r#"{"kind": "research_start", "team": "red"}"#).unwrap() {
            Line::Submit(submission) => {
                assert_eq!(submission.kind, "research_start");
                assert!(submission.args.is_null());
            }
            other => panic!("unexpected line {other:?}"),
        }
    }

    #[tokio::test]
    async fn submissions_report_and_ticks_summarize() {
        let (runtime, session) = session().await;

        let report = reply(
            &session,
            json!({
                "kind": "vyroba",
                "team": "red",
                "args": {"vyroba": "vyr-planks", "count": 1},
            }),
        )
        .await;
        assert_eq!(report["report"]["status"], "committed", "{report}");

        let tick = reply(&session, json!({"tick": 2})).await;
        assert_eq!(tick["tick"]["effects"].as_array().map(Vec::len), Some(1), "{tick}");

        let snapshot = reply(&session, json!({"snapshot": true})).await;
        assert!(snapshot["snapshot"]["teams"].is_object(), "{snapshot}");

        drop(session);
        runtime.shutdown().await.expect("clean shutdown");
    }

    #[tokio::test]
    async fn bad_input_is_answered_not_fatal() {
        let (runtime, session) = session().await;

        let garbled = session.process("{not json").await.expect("runtime alive");
        assert!(matches!(&garbled, Reply::Error { code, .. } if code == "CLI_MALFORMED_LINE"));

        let unknown = reply(&session, json!({"kind": "teleport", "team": "red"})).await;
        assert_eq!(unknown["error"]["code"], "RUNTIME_UNKNOWN_KIND");

        let quote = reply(
            &session,
            json!({"preview": {"kind": "research_start", "team": "red", "args": {"tech": "tec-crafts"}}}),
        )
        .await;
        assert!(quote.get("quote").is_some(), "{quote}");

        drop(session);
        runtime.shutdown().await.expect("clean shutdown");
    }
}
