//! Transport doubles for exercising the publisher without a network.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::{Message, RelayAck, RelayTransport, TransportError};

/// A transport that answers from a fixed script and records its calls.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Script,
    calls: Mutex<Vec<Vec<String>>>,
}

#[derive(Debug)]
enum Script {
    AcceptAll,
    Fixed(Vec<RelayAck>),
}

impl ScriptedTransport {
    /// Accept the message on every relay it is asked about.
    pub fn accept_all() -> Self {
        Self {
            script: Script::AcceptAll,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with exactly `acks`, regardless of the relay list.
    pub fn with_acks(acks: Vec<RelayAck>) -> Self {
        Self {
            script: Script::Fixed(acks),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Relay lists seen by `publish_to_many`, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayTransport for ScriptedTransport {
    async fn publish_to_many(
        &self,
        relays: &[String],
        _message: &Message,
    ) -> Result<Vec<RelayAck>, TransportError> {
        self.calls.lock().unwrap().push(relays.to_vec());
        match &self.script {
            Script::AcceptAll => Ok(relays.iter().map(RelayAck::accepted).collect()),
            Script::Fixed(acks) => Ok(acks.clone()),
        }
    }
}

/// A transport that always fails at the pool level.
#[derive(Debug)]
pub struct FailingTransport {
    error: TransportError,
}

impl FailingTransport {
    pub fn new(error: TransportError) -> Self {
        Self { error }
    }
}

impl Default for FailingTransport {
    fn default() -> Self {
        Self::new(TransportError::pool("relay pool unavailable"))
    }
}

#[async_trait]
impl RelayTransport for FailingTransport {
    async fn publish_to_many(
        &self,
        _relays: &[String],
        _message: &Message,
    ) -> Result<Vec<RelayAck>, TransportError> {
        Err(self.error.clone())
    }
}

/// A transport that sleeps before accepting, to drive the publisher past
/// its deadline.
#[derive(Debug)]
pub struct SlowTransport {
    delay: Duration,
    completed: AtomicBool,
}

impl SlowTransport {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            completed: AtomicBool::new(false),
        }
    }

    /// Whether the delayed attempt ever ran to completion. Stays false when
    /// the publisher's deadline won the race and dropped the attempt.
    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RelayTransport for SlowTransport {
    async fn publish_to_many(
        &self,
        relays: &[String],
        _message: &Message,
    ) -> Result<Vec<RelayAck>, TransportError> {
        tokio::time::sleep(self.delay).await;
        self.completed.store(true, Ordering::Relaxed);
        Ok(relays.iter().map(RelayAck::accepted).collect())
    }
}
