//! Wire shape of an action submission and its decoding into core requests.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use game_core::{ActionArgs, ActionKind, ActionRegistry, ActionRequest, DiceRoll, TeamId};

use super::errors::{Result, RuntimeError};

/// One submission as it arrives from a client: a kind name, loosely typed
/// arguments, the acting team (absent for operator actions) and the dice
/// throw, if the organizer made one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub kind: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub team: Option<TeamId>,
    #[serde(default)]
    pub roll: Option<DiceRoll>,
}

impl Submission {
    pub fn new(kind: impl Into<String>, args: Value) -> Self {
        Self {
            kind: kind.into(),
            args,
            team: None,
            roll: None,
        }
    }

    #[must_use]
    pub fn by(mut self, team: impl Into<TeamId>) -> Self {
        self.team = Some(team.into());
        self
    }

    #[must_use]
    pub fn with_roll(mut self, roll: DiceRoll) -> Self {
        self.roll = Some(roll);
        self
    }

    /// Resolves the kind through `registry` and decodes the arguments into
    /// the kind's argument shape.
    pub fn decode(&self, registry: &ActionRegistry) -> Result<ActionRequest> {
        let kind = registry
            .lookup(&self.kind)
            .ok_or_else(|| RuntimeError::UnknownKind {
                name: self.kind.clone(),
            })?;
        Ok(ActionRequest {
            team: self.team.clone(),
            args: decode_args(kind, &self.args)?,
        })
    }
}

/// Decodes `args` as the argument struct of `kind`. A missing payload stands
/// for an empty argument object.
pub fn decode_args(kind: ActionKind, args: &Value) -> Result<ActionArgs> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    let tagged = serde_json::json!({ "kind": kind.as_str(), "args": args });
    serde_json::from_value(tagged).map_err(|source| RuntimeError::Decode { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_by_kind_name() {
        let registry = ActionRegistry::standard().unwrap();
        let request = Submission::new("counter_increment", json!({"counter": "rounds", "delta": 2}))
            .decode(&registry)
            .unwrap();
        assert_eq!(request.kind(), ActionKind::CounterIncrement);
        assert_eq!(request.team, None);
    }

    #[test]
    fn empty_payload_is_an_empty_object() {
        let args = decode_args(ActionKind::PlagueOnset, &Value::Null).unwrap();
        assert_eq!(args.kind(), ActionKind::PlagueOnset);
    }

    #[test]
    fn unknown_kinds_and_bad_args_are_distinguished() {
        let registry = ActionRegistry::standard().unwrap();
        let unknown = Submission::new("teleport", Value::Null).decode(&registry);
        assert!(matches!(unknown, Err(RuntimeError::UnknownKind { .. })));

        let malformed = Submission::new("trade", json!({"receiver": 5})).decode(&registry);
        assert!(matches!(
            malformed,
            Err(RuntimeError::Decode {
                kind: ActionKind::Trade,
                ..
            })
        ));
    }

    #[test]
    fn parses_a_json_line() {
        let line = r#"{"kind":"feed","team":"red","args":{"provided":{"pro-grain":"4"}}}"#;
        let submission: Submission = serde_json::from_str(line).unwrap();
        assert_eq!(submission.team, Some(TeamId::from("red")));
        assert_eq!(submission.roll, None);
    }
}
