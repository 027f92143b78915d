//! Threshold decryption coordination.
//!
//! Issues one-shot decryption rounds for request counters and correlates
//! the asynchronous callbacks back to their requests. Correlation is
//! strictly by the opaque round identifier; no ordering is assumed
//! between rounds outstanding for different requests.
//!
//! Issuance policy: at most one round may block a request at a time. A
//! round stops blocking once it resolves, once its proof is rejected, or
//! once its timeout elapses. Expired rounds are removed when superseded,
//! so their late callbacks miss the correlation table and are dropped;
//! rejected rounds stay correlated, because the decryption infrastructure
//! may still deliver a corrected proof for them.

use crate::requests::RecoveryRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use velum_core::effects::CiphertextEffects;
use velum_core::{DecryptionId, HolderId, RecoveryError, RecoveryResult, RequestId};

/// Correlation record for one issued decryption round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecryption {
    /// Round identifier returned by the backend.
    pub decryption_id: DecryptionId,
    /// Request whose counter is being decrypted.
    pub request_id: RequestId,
    /// Holder who was authorized to issue this round.
    pub holder: HolderId,
    /// Issuance time, epoch milliseconds.
    pub issued_at_ms: u64,
    /// Set when a callback for this round failed proof verification; a
    /// rejected round no longer blocks a fresh issuance.
    pub rejected: bool,
}

/// Coordinator policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How long a round blocks re-issuance before it can be superseded,
    /// in milliseconds.
    pub decryption_timeout_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            decryption_timeout_ms: 24 * 60 * 60 * 1000, // 24 hours
        }
    }
}

/// Pending-round table and issuance policy.
#[derive(Debug, Default)]
pub struct DecryptionCoordinator {
    config: CoordinatorConfig,
    pending: HashMap<DecryptionId, PendingDecryption>,
    // Latest round issued per request, if any.
    by_request: HashMap<RequestId, DecryptionId>,
}

impl DecryptionCoordinator {
    /// Create with an explicit configuration.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            pending: HashMap::new(),
            by_request: HashMap::new(),
        }
    }

    /// Create with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CoordinatorConfig::default())
    }

    /// Issue a decryption round for `request`'s current counter.
    ///
    /// The facade has already authenticated the caller as the request
    /// owner and rejected terminal requests. Fails with
    /// `DecryptionInProgress` while an unexpired, unrejected round is
    /// outstanding for the same request.
    pub async fn issue<E: CiphertextEffects>(
        &mut self,
        request: &RecoveryRequest,
        now_ms: u64,
        effects: &E,
    ) -> RecoveryResult<DecryptionId> {
        if let Some(existing_id) = self.by_request.get(&request.id).copied() {
            if let Some(existing) = self.pending.get(&existing_id) {
                let deadline = existing
                    .issued_at_ms
                    .saturating_add(self.config.decryption_timeout_ms);
                let expired = now_ms >= deadline;
                if !existing.rejected && !expired {
                    return Err(RecoveryError::decryption_in_progress(
                        request.id,
                        existing_id,
                    ));
                }
                if expired {
                    self.pending.remove(&existing_id);
                    debug!(
                        request_id = %request.id,
                        decryption_id = %existing_id,
                        "Expired decryption round superseded"
                    );
                }
            }
        }

        let decryption_id = effects.request_decryption(&request.approvals).await?;
        self.pending.insert(
            decryption_id,
            PendingDecryption {
                decryption_id,
                request_id: request.id,
                holder: request.holder,
                issued_at_ms: now_ms,
                rejected: false,
            },
        );
        self.by_request.insert(request.id, decryption_id);
        debug!(request_id = %request.id, decryption_id = %decryption_id, "Decryption round issued");
        Ok(decryption_id)
    }

    /// Look up the correlation record for a callback.
    ///
    /// An unknown correlation id reports `InvalidRequest` with the
    /// reserved identifier, since no request can be named for it.
    pub fn lookup(&self, decryption_id: DecryptionId) -> RecoveryResult<&PendingDecryption> {
        self.pending
            .get(&decryption_id)
            .ok_or_else(|| RecoveryError::invalid_request(RequestId::INVALID))
    }

    /// Mark a round's proof as rejected. The round stays correlated so a
    /// corrected callback can still arrive, but it no longer blocks a
    /// fresh issuance.
    pub fn mark_rejected(&mut self, decryption_id: DecryptionId) {
        if let Some(pending) = self.pending.get_mut(&decryption_id) {
            pending.rejected = true;
        }
    }

    /// Consume a resolved round.
    pub fn resolve(&mut self, decryption_id: DecryptionId) -> Option<PendingDecryption> {
        let pending = self.pending.remove(&decryption_id)?;
        if self.by_request.get(&pending.request_id) == Some(&decryption_id) {
            self.by_request.remove(&pending.request_id);
        }
        Some(pending)
    }
}

/// Decode a little-endian unsigned count from callback cleartext bytes.
///
/// Accepts up to eight bytes; longer inputs are valid only when the
/// excess bytes are zero. Anything else cannot be a faithful counter
/// decryption and is treated as a verification failure by the caller.
pub fn decode_count(cleartext: &[u8]) -> Option<u64> {
    let (head, tail) = cleartext.split_at(cleartext.len().min(8));
    if tail.iter().any(|byte| *byte != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf[..head.len()].copy_from_slice(head);
    Some(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decode_count_accepts_short_and_padded_inputs() {
        assert_eq!(decode_count(&[]), Some(0));
        assert_eq!(decode_count(&[2]), Some(2));
        assert_eq!(decode_count(&3u64.to_le_bytes()), Some(3));
        assert_eq!(decode_count(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]), Some(1));
    }

    #[test]
    fn decode_count_rejects_oversized_values() {
        let mut wide = vec![0u8; 9];
        wide[8] = 1;
        assert_eq!(decode_count(&wide), None);
    }

    #[test]
    fn unknown_correlation_reports_reserved_identifier() {
        let coordinator = DecryptionCoordinator::with_defaults();
        assert_matches!(
            coordinator.lookup(DecryptionId(9)),
            Err(RecoveryError::InvalidRequest {
                request_id: RequestId::INVALID
            })
        );
    }
}
