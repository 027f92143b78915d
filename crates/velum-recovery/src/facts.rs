//! Recovery domain facts.
//!
//! Append-only audit records emitted by the protocol facade. Facts carry
//! request-level data only: no vote contents, no guardian identities, no
//! per-guardian linkage of any kind. Approval submissions deliberately
//! emit nothing.

use serde::{Deserialize, Serialize};
use velum_core::{DecryptionId, HolderId, RequestId};

/// Facts emitted over the lifecycle of a recovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryFact {
    /// A recovery request was created.
    RequestCreated {
        request_id: RequestId,
        holder: HolderId,
        timestamp_ms: u64,
    },
    /// A decryption round was issued for a request's counter.
    DecryptionRequested {
        request_id: RequestId,
        decryption_id: DecryptionId,
        timestamp_ms: u64,
    },
    /// A decryption callback was dropped because its proof failed
    /// verification or its cleartext did not decode to a count.
    DecryptionRejected {
        request_id: RequestId,
        decryption_id: DecryptionId,
        timestamp_ms: u64,
    },
    /// A verified count fell short of the majority; the request stays
    /// open for further approvals and a later round.
    ThresholdNotMet {
        request_id: RequestId,
        approvals: u64,
        guardian_count: u64,
        timestamp_ms: u64,
    },
    /// The request reached its terminal executed state. Emitted exactly
    /// once per request.
    RequestExecuted {
        request_id: RequestId,
        approvals: u64,
        guardian_count: u64,
        timestamp_ms: u64,
    },
}

impl RecoveryFact {
    /// Request this fact refers to.
    pub fn request_id(&self) -> RequestId {
        match self {
            RecoveryFact::RequestCreated { request_id, .. } => *request_id,
            RecoveryFact::DecryptionRequested { request_id, .. } => *request_id,
            RecoveryFact::DecryptionRejected { request_id, .. } => *request_id,
            RecoveryFact::ThresholdNotMet { request_id, .. } => *request_id,
            RecoveryFact::RequestExecuted { request_id, .. } => *request_id,
        }
    }

    /// Emission timestamp in epoch milliseconds.
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            RecoveryFact::RequestCreated { timestamp_ms, .. } => *timestamp_ms,
            RecoveryFact::DecryptionRequested { timestamp_ms, .. } => *timestamp_ms,
            RecoveryFact::DecryptionRejected { timestamp_ms, .. } => *timestamp_ms,
            RecoveryFact::ThresholdNotMet { timestamp_ms, .. } => *timestamp_ms,
            RecoveryFact::RequestExecuted { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}
