use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::outcome::{DeliveryOutcome, PublishReport};
use crate::{Message, RelayTransport};

/// Concurrent fan-out publication with a single whole-batch deadline.
///
/// One publish call races the transport's combined result against one timer
/// started at the beginning of the batch. No retries; no quorum enforcement.
#[derive(Debug, Clone)]
pub struct FanoutPublisher {
    transport: Arc<dyn RelayTransport>,
}

impl FanoutPublisher {
    pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
        Self { transport }
    }

    /// Deliver one finalized message to every relay concurrently.
    ///
    /// Total: returns exactly one outcome per input relay and never errors.
    /// When the deadline fires, every relay is reported as failed even if
    /// some had individually succeeded before the timer — the transport
    /// settles only once all relays have answered, so there is no partial
    /// aggregate to salvage (conservative failure policy, kept on purpose).
    /// The losing future is dropped and its eventual result never touches
    /// the returned outcomes.
    pub async fn publish(
        &self,
        message: &Message,
        relays: &[String],
        deadline: Duration,
    ) -> Vec<DeliveryOutcome> {
        if relays.is_empty() {
            return Vec::new();
        }

        debug!(
            "Dispatching message to {} relays with {}ms budget",
            relays.len(),
            deadline.as_millis()
        );

        match timeout(deadline, self.transport.publish_to_many(relays, message)).await {
            Ok(Ok(acks)) if acks.len() == relays.len() => {
                let outcomes: Vec<DeliveryOutcome> = relays
                    .iter()
                    .zip(acks)
                    .map(|(relay, ack)| {
                        if ack.accepted {
                            DeliveryOutcome::accepted(relay)
                        } else {
                            DeliveryOutcome::rejected(
                                relay,
                                ack.reason
                                    .unwrap_or_else(|| "rejected by relay".to_string()),
                            )
                        }
                    })
                    .collect();

                let rejected = outcomes.iter().filter(|o| !o.success).count();
                if rejected > 0 {
                    warn!(
                        "Fan-out partial failure: {}/{} relays rejected the message",
                        rejected,
                        outcomes.len()
                    );
                }
                outcomes
            }
            Ok(Ok(acks)) => {
                // A misbehaving pool cannot be allowed to break the
                // one-outcome-per-relay invariant.
                warn!(
                    "Transport answered {} of {} relays, failing the batch",
                    acks.len(),
                    relays.len()
                );
                fail_all(
                    relays,
                    format!(
                        "transport returned {} acknowledgements for {} relays",
                        acks.len(),
                        relays.len()
                    ),
                )
            }
            Ok(Err(e)) => {
                warn!("Transport failure publishing to {} relays: {}", relays.len(), e);
                fail_all(relays, e.to_string())
            }
            Err(_) => {
                warn!(
                    "Publish timed out after {}ms, failing all {} relays",
                    deadline.as_millis(),
                    relays.len()
                );
                fail_all(
                    relays,
                    format!("publish timed out after {}ms", deadline.as_millis()),
                )
            }
        }
    }

    /// [`Self::publish`] plus the derived aggregate counts.
    pub async fn publish_report(
        &self,
        message: &Message,
        relays: &[String],
        deadline: Duration,
    ) -> PublishReport {
        PublishReport::new(self.publish(message, relays, deadline).await)
    }
}

fn fail_all(relays: &[String], reason: String) -> Vec<DeliveryOutcome> {
    relays
        .iter()
        .map(|relay| DeliveryOutcome::rejected(relay, reason.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingTransport, ScriptedTransport, SlowTransport};
    use crate::{RelayAck, TransportError};
    use serde_json::json;

    fn message() -> Message {
        Message::new(json!({"id": "e1", "kind": 1, "content": "hello"}))
    }

    fn relays(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_relay_list_is_a_noop() {
        let publisher = FanoutPublisher::new(Arc::new(ScriptedTransport::accept_all()));
        let outcomes = publisher
            .publish(&message(), &[], Duration::from_millis(100))
            .await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn all_relays_accepted() {
        let transport = Arc::new(ScriptedTransport::accept_all());
        let publisher = FanoutPublisher::new(transport.clone());
        let targets = relays(&["wss://r1", "wss://r2", "wss://r3"]);

        let report = publisher
            .publish_report(&message(), &targets, Duration::from_millis(100))
            .await;

        assert_eq!(report.total_relays(), 3);
        assert_eq!(report.success_count(), 3);
        assert!(report.outcomes().iter().all(|o| o.success && o.error.is_none()));
        // The whole batch went through one logical transport call.
        assert_eq!(transport.calls(), vec![targets]);
    }

    #[tokio::test]
    async fn mixed_acceptance_is_reported_per_relay() {
        let transport = ScriptedTransport::with_acks(vec![
            RelayAck::accepted("wss://r1"),
            RelayAck::rejected("wss://r2", "duplicate"),
            RelayAck::accepted("wss://r3"),
        ]);
        let publisher = FanoutPublisher::new(Arc::new(transport));
        let targets = relays(&["wss://r1", "wss://r2", "wss://r3"]);

        let report = publisher
            .publish_report(&message(), &targets, Duration::from_millis(100))
            .await;

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.total_relays(), 3);
        let outcomes = report.outcomes();
        assert_eq!(outcomes[0], DeliveryOutcome::accepted("wss://r1"));
        assert_eq!(outcomes[1], DeliveryOutcome::rejected("wss://r2", "duplicate"));
        assert_eq!(outcomes[2], DeliveryOutcome::accepted("wss://r3"));
    }

    #[tokio::test]
    async fn missing_rejection_reason_gets_a_default() {
        let transport = ScriptedTransport::with_acks(vec![RelayAck {
            source: "wss://r1".to_string(),
            accepted: false,
            reason: None,
        }]);
        let publisher = FanoutPublisher::new(Arc::new(transport));

        let outcomes = publisher
            .publish(&message(), &relays(&["wss://r1"]), Duration::from_millis(100))
            .await;

        assert_eq!(outcomes[0].error.as_deref(), Some("rejected by relay"));
    }

    #[tokio::test]
    async fn timeout_fails_every_relay_even_the_fast_ones() {
        let transport = Arc::new(SlowTransport::new(Duration::from_millis(200)));
        let publisher = FanoutPublisher::new(transport.clone());
        let targets = relays(&["wss://r1", "wss://r2", "wss://r3"]);

        let outcomes = publisher
            .publish(&message(), &targets, Duration::from_millis(10))
            .await;

        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            assert!(!outcome.success);
            let reason = outcome.error.as_deref().unwrap();
            assert!(reason.contains("timed out after 10ms"), "got {reason}");
        }
        // The losing attempt was dropped mid-sleep; its result never
        // reached the caller's state.
        assert!(!transport.completed());
    }

    #[tokio::test]
    async fn pool_failure_fails_every_relay() {
        let transport = FailingTransport::new(TransportError::pool("socket pool exhausted"));
        let publisher = FanoutPublisher::new(Arc::new(transport));
        let targets = relays(&["wss://r1", "wss://r2"]);

        let outcomes = publisher
            .publish(&message(), &targets, Duration::from_millis(100))
            .await;

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert!(!outcome.success);
            assert_eq!(
                outcome.error.as_deref(),
                Some("relay pool failure: socket pool exhausted")
            );
        }
    }

    #[tokio::test]
    async fn mismatched_ack_count_fails_every_relay() {
        let transport = ScriptedTransport::with_acks(vec![RelayAck::accepted("wss://r1")]);
        let publisher = FanoutPublisher::new(Arc::new(transport));
        let targets = relays(&["wss://r1", "wss://r2"]);

        let outcomes = publisher
            .publish(&message(), &targets, Duration::from_millis(100))
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.success));
        assert!(outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("1 acknowledgements for 2 relays"));
    }

    #[tokio::test]
    async fn concurrent_publish_calls_are_independent() {
        let slow = FanoutPublisher::new(Arc::new(SlowTransport::new(Duration::from_millis(200))));
        let fast = FanoutPublisher::new(Arc::new(ScriptedTransport::accept_all()));
        let msg = message();
        let targets = relays(&["wss://r1"]);

        let (slow_outcomes, fast_outcomes) = tokio::join!(
            slow.publish(&msg, &targets, Duration::from_millis(10)),
            fast.publish(&msg, &targets, Duration::from_millis(100)),
        );

        assert!(!slow_outcomes[0].success);
        assert!(fast_outcomes[0].success);
    }
}
