use serde::Serialize;

use crate::error::QuorumError;

/// Result of one delivery attempt to one relay.
///
/// Exactly one is produced per input relay, even on timeout or transport
/// failure. Immutable once returned; owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    /// Relay the attempt targeted.
    pub relay: String,
    /// Whether the relay accepted the message.
    pub success: bool,
    /// Failure description when not accepted.
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn accepted(relay: impl Into<String>) -> Self {
        Self {
            relay: relay.into(),
            success: true,
            error: None,
        }
    }

    pub fn rejected(relay: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            relay: relay.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Ordered outcomes of one publish call plus the derived aggregate counts.
#[derive(Debug, Clone)]
pub struct PublishReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl PublishReport {
    pub fn new(outcomes: Vec<DeliveryOutcome>) -> Self {
        Self { outcomes }
    }

    /// Outcomes in input-relay order.
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    /// Relays that accepted the message.
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    /// Relays attempted.
    pub fn total_relays(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.success_count() == self.total_relays()
    }

    /// Caller-side quorum check: the publisher only reports facts, this is
    /// where a minimum-success threshold turns into a hard failure.
    pub fn require(&self, required: usize) -> Result<(), QuorumError> {
        let successful = self.success_count();
        if successful < required {
            return Err(QuorumError {
                required,
                successful,
                total: self.total_relays(),
            });
        }
        Ok(())
    }

    pub fn into_outcomes(self) -> Vec<DeliveryOutcome> {
        self.outcomes
    }
}
