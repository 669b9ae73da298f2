//! Short-lived websocket delivery of one event to many relays.
//!
//! One connection per relay per publish call, all relays in flight at once.
//! Connection pooling and event caching belong to the connection library
//! behind [`RelayTransport`]; this transport only provides the capability
//! the publisher races against its deadline: a future that settles once
//! every relay has answered.

use async_trait::async_trait;
use futures_util::{future, SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsFrame};
use tracing::debug;
use url::Url;

use crate::error::TransportError;
use crate::{Message, RelayAck, RelayTransport};

/// [`RelayTransport`] over plain NIP-01 websocket framing.
#[derive(Debug, Default)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }

    async fn deliver(&self, relay: &str, frame: &str, event_id: Option<&str>) -> RelayAck {
        match self.try_deliver(relay, frame, event_id).await {
            Ok((true, _)) => RelayAck::accepted(relay),
            Ok((false, reason)) => RelayAck::rejected(
                relay,
                reason.unwrap_or_else(|| "rejected by relay".to_string()),
            ),
            Err(e) => RelayAck::rejected(relay, e.to_string()),
        }
    }

    async fn try_deliver(
        &self,
        relay: &str,
        frame: &str,
        event_id: Option<&str>,
    ) -> Result<(bool, Option<String>), TransportError> {
        Url::parse(relay)
            .map_err(|e| TransportError::connection(format!("invalid relay url {relay}: {e}")))?;

        let (mut socket, _) = connect_async(relay)
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;

        socket
            .send(WsFrame::Text(frame.to_string()))
            .await
            .map_err(|e| TransportError::send(e.to_string()))?;

        while let Some(incoming) = socket.next().await {
            let incoming = incoming.map_err(|e| TransportError::protocol(e.to_string()))?;
            if let WsFrame::Text(text) = incoming {
                if let Some(verdict) = parse_ok_frame(&text, event_id) {
                    let _ = socket.close(None).await;
                    return Ok(verdict);
                }
                debug!("Ignoring non-OK frame from {}: {}", relay, text);
            }
        }

        Err(TransportError::protocol(
            "relay closed the connection before acknowledging",
        ))
    }
}

#[async_trait]
impl RelayTransport for WsTransport {
    async fn publish_to_many(
        &self,
        relays: &[String],
        message: &Message,
    ) -> Result<Vec<RelayAck>, TransportError> {
        let frame = event_frame(message);
        let event_id = message.id().map(str::to_string);

        let attempts = relays
            .iter()
            .map(|relay| self.deliver(relay, &frame, event_id.as_deref()));

        // join_all preserves input order and resolves once every relay has
        // answered, which is the contract the publisher's deadline races.
        Ok(future::join_all(attempts).await)
    }
}

/// Serialize the client publish frame: `["EVENT", <payload>]`.
pub fn event_frame(message: &Message) -> String {
    json!(["EVENT", message.as_json()]).to_string()
}

/// Parse a relay `["OK", <id>, <accepted>, <reason>]` frame.
///
/// Returns `None` for anything else — NOTICE, EOSE, or an OK for a
/// different event id — which the read loop skips.
pub fn parse_ok_frame(text: &str, event_id: Option<&str>) -> Option<(bool, Option<String>)> {
    let value: Value = serde_json::from_str(text).ok()?;
    let items = value.as_array()?;

    if items.first()?.as_str()? != "OK" {
        return None;
    }
    if let (Some(expected), Some(got)) = (event_id, items.get(1).and_then(Value::as_str)) {
        if expected != got {
            return None;
        }
    }

    let accepted = items.get(2).and_then(Value::as_bool)?;
    let reason = items
        .get(3)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some((accepted, reason))
}
