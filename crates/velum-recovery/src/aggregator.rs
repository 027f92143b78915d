//! Homomorphic approval aggregation.
//!
//! One submission folds one encrypted vote into a request's counter.
//! Approve and reject perform the same backend operations; the only
//! difference is the encrypted weight, so the aggregator learns nothing
//! about the vote and only affirmative votes reach the count. Rejection
//! tallies, if a deployment wants them, live outside this core.
//!
//! Folds commute, which is what makes concurrent guardian submissions
//! order-independent without locking or plaintext read-modify-write.
//!
//! Each submission must carry a one-time approval ticket. Tickets are
//! issued off-protocol, blinded so they cannot be linked to a guardian
//! index; the aggregator's only job is to consume each ticket exactly
//! once per request.

use crate::requests::RecoveryRequest;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use velum_core::effects::CiphertextEffects;
use velum_core::{EncBool, RecoveryError, RecoveryResult, RequestId};

/// Blinded one-time credential accompanying an approval submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTicket(Vec<u8>);

impl ApprovalTicket {
    /// Wrap raw ticket bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw ticket bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    // Spent-tracking stores the digest, never the raw ticket.
    fn digest(&self) -> [u8; 32] {
        *blake3::hash(&self.0).as_bytes()
    }
}

/// Folds encrypted votes into request counters and tracks spent tickets.
#[derive(Debug, Default)]
pub struct ApprovalAggregator {
    spent: HashMap<RequestId, HashSet<[u8; 32]>>,
}

impl ApprovalAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one encrypted vote into `request`'s counter.
    ///
    /// Consumes `ticket`; a replay for the same request fails with
    /// `TicketSpent` before any backend work. The caller has already
    /// resolved the request and rejected terminal ones. A backend failure
    /// leaves the ticket spendable.
    pub async fn fold<E: CiphertextEffects>(
        &mut self,
        request: &mut RecoveryRequest,
        vote: &EncBool,
        ticket: &ApprovalTicket,
        effects: &E,
    ) -> RecoveryResult<()> {
        let digest = ticket.digest();
        if self
            .spent
            .get(&request.id)
            .is_some_and(|spent| spent.contains(&digest))
        {
            return Err(RecoveryError::ticket_spent(request.id));
        }

        let weight = effects.approval_weight(vote).await?;
        request.approvals = effects.add(&request.approvals, &weight).await?;
        self.spent.entry(request.id).or_default().insert(digest);

        debug!(request_id = %request.id, "Approval folded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_digest_is_stable_and_collision_free_for_distinct_bytes() {
        let a = ApprovalTicket::from_bytes(vec![1, 2, 3]);
        let b = ApprovalTicket::from_bytes(vec![1, 2, 4]);

        assert_eq!(a.digest(), ApprovalTicket::from_bytes(vec![1, 2, 3]).digest());
        assert_ne!(a.digest(), b.digest());
    }
}
