use std::collections::BTreeMap;

use super::ActionKind;
use crate::state::{StateDiff, TeamId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Structured diagnostic or notification.
///
/// `template` is a stable key (e.g. `research.finished`) that renderers may
/// translate; `refs` lists the entity, team or army ids it mentions; `text`
/// is a ready-to-show English rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub level: MessageLevel,
    pub template: String,
    pub refs: Vec<String>,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, template: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            template: template.into(),
            refs: Vec::new(),
            text: text.into(),
        }
    }

    pub fn info(template: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, template, text)
    }

    pub fn warning(template: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, template, text)
    }

    pub fn error(template: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, template, text)
    }

    #[must_use]
    pub fn with_ref(mut self, id: impl ToString) -> Self {
        self.refs.push(id.to_string());
        self
    }
}

/// Messages and notifications collected while an action runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub messages: Vec<Message>,
    pub notifications: BTreeMap<TeamId, Vec<Message>>,
}

impl Report {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn notify(&mut self, team: &TeamId, message: Message) {
        self.notifications
            .entry(team.clone())
            .or_default()
            .push(message);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionStatus {
    Committed,
    Rejected,
}

/// Outcome of one committed or rejected action, or of one delayed effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResult {
    pub kind: ActionKind,
    pub team: Option<TeamId>,
    pub status: ActionStatus,
    pub messages: Vec<Message>,
    pub notifications: BTreeMap<TeamId, Vec<Message>>,
    /// Ticks until the delayed effect lands, for delay-bearing kinds.
    pub scheduled_delay: Option<u64>,
    /// Sequence number of the scheduled pending effect.
    pub pending: Option<u64>,
    pub diff: StateDiff,
}

impl ActionResult {
    pub fn committed(kind: ActionKind, team: Option<TeamId>, report: Report, diff: StateDiff) -> Self {
        Self {
            kind,
            team,
            status: ActionStatus::Committed,
            messages: report.messages,
            notifications: report.notifications,
            scheduled_delay: None,
            pending: None,
            diff,
        }
    }

    pub fn rejected(kind: ActionKind, team: Option<TeamId>, error: Message) -> Self {
        Self {
            kind,
            team,
            status: ActionStatus::Rejected,
            messages: vec![error],
            notifications: BTreeMap::new(),
            scheduled_delay: None,
            pending: None,
            diff: StateDiff::default(),
        }
    }

    pub fn is_committed(&self) -> bool {
        self.status == ActionStatus::Committed
    }

    pub fn messages_at(&self, level: MessageLevel) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |message| message.level == level)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.messages_at(MessageLevel::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages_at(MessageLevel::Error)
    }
}
