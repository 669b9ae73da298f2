use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque, finalized event payload.
///
/// The publisher delivers it verbatim and never mutates it; the only field
/// it reads is the optional `id`, which the websocket transport uses to
/// match relay acknowledgements to the event they answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    payload: Value,
}

impl Message {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// The payload as it will appear on the wire.
    pub fn as_json(&self) -> &Value {
        &self.payload
    }

    /// Event id, when the payload carries one.
    pub fn id(&self) -> Option<&str> {
        self.payload.get("id").and_then(Value::as_str)
    }

    pub fn into_json(self) -> Value {
        self.payload
    }
}

impl From<Value> for Message {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}
