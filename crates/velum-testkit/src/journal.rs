//! In-memory fact journal.

use async_trait::async_trait;
use parking_lot::Mutex;
use velum_core::RequestId;
use velum_recovery::effects::{JournalEffects, JournalError};
use velum_recovery::facts::RecoveryFact;

/// Captures facts for test assertions.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    facts: Mutex<Vec<RecoveryFact>>,
}

impl MemoryJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in emission order.
    pub fn facts(&self) -> Vec<RecoveryFact> {
        self.facts.lock().clone()
    }

    /// How many execution facts were emitted for `request_id`.
    pub fn executed_count(&self, request_id: RequestId) -> usize {
        self.facts
            .lock()
            .iter()
            .filter(|fact| {
                matches!(
                    fact,
                    RecoveryFact::RequestExecuted { request_id: id, .. } if *id == request_id
                )
            })
            .count()
    }
}

#[async_trait]
impl JournalEffects for MemoryJournal {
    async fn record_fact(&self, fact: RecoveryFact) -> Result<(), JournalError> {
        self.facts.lock().push(fact);
        Ok(())
    }
}
