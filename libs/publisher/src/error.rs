/// Failure of the relay connection capability before per-relay data exists.
///
/// Never escapes [`crate::FanoutPublisher::publish`]; the publisher
/// flattens it into the `error` field of every outcome in the batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("relay protocol error: {0}")]
    Protocol(String),

    #[error("relay pool failure: {0}")]
    Pool(String),
}

impl TransportError {
    pub fn connection(msg: impl Into<String>) -> Self {
        TransportError::Connection(msg.into())
    }

    pub fn send(msg: impl Into<String>) -> Self {
        TransportError::Send(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        TransportError::Protocol(msg.into())
    }

    pub fn pool(msg: impl Into<String>) -> Self {
        TransportError::Pool(msg.into())
    }
}

/// Raised at the caller boundary when too few relays accepted a message.
///
/// The one hard failure in the system; everything below it reports facts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "publish quorum not met: required {required} successful relays, got {successful} of {total}"
)]
pub struct QuorumError {
    /// Minimum successful deliveries the caller demanded.
    pub required: usize,
    /// Deliveries that actually succeeded.
    pub successful: usize,
    /// Relays attempted.
    pub total: usize,
}
