//! Concurrent fan-out publication of finalized events to Nostr relays.
//!
//! The publisher takes one already-signed message and a set of independent,
//! unreliable relay endpoints, dispatches delivery to all of them at once
//! through a [`RelayTransport`] handle, and collects one
//! [`DeliveryOutcome`] per relay within a single whole-batch deadline.
//! Failure detail lives in the returned outcomes; the only raised error in
//! the crate is the caller-side [`QuorumError`] from
//! [`PublishReport::require`].

pub mod error;
pub mod message;
pub mod outcome;
pub mod publish;
pub mod test_utils;
pub mod ws;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use error::{QuorumError, TransportError};
pub use message::Message;
pub use outcome::{DeliveryOutcome, PublishReport};
pub use publish::FanoutPublisher;
pub use ws::WsTransport;

/// Acceptance report from one relay for one delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAck {
    /// Relay that produced the answer.
    pub source: String,
    /// Whether the relay accepted the message.
    pub accepted: bool,
    /// The relay's stated reason when not accepted.
    pub reason: Option<String>,
}

impl RelayAck {
    pub fn accepted(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            accepted: true,
            reason: None,
        }
    }

    pub fn rejected(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            accepted: false,
            reason: Some(reason.into()),
        }
    }
}

/// The relay connection capability the publisher races against its deadline.
///
/// Injected as an explicit long-lived handle (`Arc<dyn RelayTransport>`),
/// never referenced as an ambient singleton.
#[async_trait]
pub trait RelayTransport: Send + Sync + Debug {
    /// Deliver `message` to every relay in `relays`, resolving only once
    /// all of them have answered (accepted or rejected), in input order.
    ///
    /// An `Err` means the attempt failed before per-relay data existed
    /// (a pool-level failure); per-relay rejections are `Ok` acks with
    /// `accepted = false`.
    async fn publish_to_many(
        &self,
        relays: &[String],
        message: &Message,
    ) -> Result<Vec<RelayAck>, TransportError>;
}
