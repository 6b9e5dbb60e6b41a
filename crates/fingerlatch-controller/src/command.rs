//! Command dispatch for the latch controller.
//!
//! Requests are JSON objects mapping command names to values. The only
//! recognized entry is `"action"` with the value `"start"` or `"stop"`.
//! The response maps every request key, in request order, to whether that
//! entry was recognized and acted upon.
//!
//! ```json
//! {"action": "stop", "reboot": true}   →   {"action": true, "reboot": false}
//! ```

use fingerlatch_core::constants::{ACTION_START, ACTION_STOP, COMMAND_ACTION};
use fingerlatch_hardware::{BoardDevice, MatchSensor, ServoDevice};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::lifecycle::LatchController;

/// A recognized command entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the control loop.
    Start,
    /// Stop the control loop.
    Stop,
}

impl Command {
    /// Parse one request entry. Returns `None` for anything unrecognized.
    pub fn parse(name: &str, value: &Value) -> Option<Self> {
        if name != COMMAND_ACTION {
            return None;
        }
        match value.as_str()? {
            ACTION_START => Some(Command::Start),
            ACTION_STOP => Some(Command::Stop),
            _ => None,
        }
    }
}

/// Per-key results of a command request, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResponse {
    entries: Vec<(String, bool)>,
}

impl CommandResponse {
    fn push(&mut self, key: &str, handled: bool) {
        self.entries.push((key.to_string(), handled));
    }

    /// Result for `key`, if it was in the request.
    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, handled)| *handled)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the request was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries
            .iter()
            .map(|(name, handled)| (name.as_str(), *handled))
    }

    /// Convert to a JSON object, keeping request order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(name, handled)| (name.clone(), Value::Bool(*handled)))
                .collect(),
        )
    }
}

impl Serialize for CommandResponse {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, handled) in &self.entries {
            map.serialize_entry(name, handled)?;
        }
        map.end()
    }
}

impl<B, S, A> LatchController<B, S, A>
where
    B: BoardDevice + 'static,
    S: MatchSensor + 'static,
    A: ServoDevice + 'static,
{
    /// Execute every recognized entry of `request`, in order.
    ///
    /// Unrecognized entries are answered `false` and have no side effect.
    /// A recognized start or stop is answered `true` even when it was a
    /// no-op because the loop was already in that state.
    pub async fn do_command(&mut self, request: &Map<String, Value>) -> CommandResponse {
        let mut response = CommandResponse::default();

        for (name, value) in request {
            let handled = match Command::parse(name, value) {
                Some(Command::Start) => {
                    self.start();
                    true
                }
                Some(Command::Stop) => {
                    self.stop().await;
                    true
                }
                None => {
                    debug!("Ignoring unrecognized command entry {}={}", name, value);
                    false
                }
            };
            response.push(name, handled);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_recognized() {
        assert_eq!(Command::parse("action", &json!("start")), Some(Command::Start));
        assert_eq!(Command::parse("action", &json!("stop")), Some(Command::Stop));
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(Command::parse("action", &json!("reboot")), None);
        assert_eq!(Command::parse("action", &json!(1)), None);
        assert_eq!(Command::parse("action", &Value::Null), None);
        assert_eq!(Command::parse("Action", &json!("start")), None);
        assert_eq!(Command::parse("command", &json!("start")), None);
    }

    #[test]
    fn test_response_serializes_in_order() {
        let mut response = CommandResponse::default();
        response.push("zeta", false);
        response.push("action", true);
        response.push("alpha", false);

        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"zeta":false,"action":true,"alpha":false}"#
        );
        assert_eq!(response.to_json().to_string(), r#"{"zeta":false,"action":true,"alpha":false}"#);
        assert_eq!(response.get("action"), Some(true));
        assert_eq!(response.get("missing"), None);
        assert_eq!(response.len(), 3);
    }
}
