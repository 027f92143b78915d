//! Ledger-facing protocol surface.
//!
//! `RecoveryProtocol` wires the registry, request store, aggregator,
//! coordinator, and evaluator behind the operation set a deployment
//! exposes. Each entry point is one discrete unit of work that completes
//! or fails synchronously from the caller's perspective; the only
//! asynchronous boundary in the protocol is between
//! `request_approval_decryption` and the matching `decryption_callback`,
//! and the two are correlated strictly by the opaque round identifier.

use crate::aggregator::{ApprovalAggregator, ApprovalTicket};
use crate::coordinator::{decode_count, CoordinatorConfig, DecryptionCoordinator};
use crate::effects::ProtocolEffects;
use crate::evaluator::{evaluate, Verdict};
use crate::facts::RecoveryFact;
use crate::registry::{GuardianRegistry, GuardianSet};
use crate::requests::{RecoveryRequest, RequestStore};
use tracing::{debug, info, warn};
use velum_core::{
    DecryptionId, EncBool, EncGuardian, HolderId, RecoveryError, RecoveryResult, RequestId,
};

/// Protocol state and entry points for one deployment.
pub struct RecoveryProtocol<E: ProtocolEffects> {
    effects: E,
    registry: GuardianRegistry,
    requests: RequestStore,
    aggregator: ApprovalAggregator,
    coordinator: DecryptionCoordinator,
}

impl<E: ProtocolEffects> RecoveryProtocol<E> {
    /// Create with an explicit coordinator configuration.
    pub fn new(effects: E, config: CoordinatorConfig) -> Self {
        Self {
            effects,
            registry: GuardianRegistry::new(),
            requests: RequestStore::new(),
            aggregator: ApprovalAggregator::new(),
            coordinator: DecryptionCoordinator::new(config),
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(effects: E) -> Self {
        Self::new(effects, CoordinatorConfig::default())
    }

    /// Replace the caller's entire guardian set.
    ///
    /// The caller identity is the holder, so a cross-holder write is
    /// unrepresentable at this surface.
    pub fn set_guardians(&mut self, holder: HolderId, guardians: Vec<EncGuardian>) {
        let count = guardians.len();
        self.registry.set_guardians(holder, guardians);
        debug!(holder = %holder, count, "Guardian set replaced");
    }

    /// Number of guardians registered for `holder`; zero when
    /// unconfigured. The only plaintext observable over a registry.
    pub fn guardian_count(&self, holder: &HolderId) -> usize {
        self.registry.guardian_count(holder)
    }

    /// The holder's encrypted guardian handles, for pass-through display.
    pub fn guardian_set(&self, holder: &HolderId) -> Option<&GuardianSet> {
        self.registry.guardian_set(holder)
    }

    /// Create a recovery request with a counter starting at encrypted
    /// zero. Emits `RequestCreated`.
    pub async fn create_request(&mut self, holder: HolderId) -> RecoveryResult<RequestId> {
        let now_ms = self.effects.now_ms().await?;
        let zero = self.effects.encrypt_zero().await?;
        let request_id = self.requests.create(holder, zero, now_ms);
        self.effects
            .record_fact(RecoveryFact::RequestCreated {
                request_id,
                holder,
                timestamp_ms: now_ms,
            })
            .await?;
        info!(request_id = %request_id, holder = %holder, "Recovery request created");
        Ok(request_id)
    }

    /// Read one request.
    pub fn get_request(&self, id: RequestId) -> RecoveryResult<&RecoveryRequest> {
        self.requests.get(id)
    }

    /// All requests owned by `holder`, ordered by identifier.
    pub fn requests_for(&self, holder: &HolderId) -> Vec<&RecoveryRequest> {
        self.requests.for_holder(holder)
    }

    /// Fold one encrypted vote into a request's counter.
    ///
    /// The ticket is a blinded one-time credential; replaying it for the
    /// same request fails with `TicketSpent`. The vote is never decrypted
    /// here and no fact is emitted, so nothing observable distinguishes
    /// an approval from a rejection.
    pub async fn submit_approval(
        &mut self,
        id: RequestId,
        vote: &EncBool,
        ticket: &ApprovalTicket,
    ) -> RecoveryResult<()> {
        let request = self.requests.get_mut(id)?;
        if request.executed {
            return Err(RecoveryError::already_executed(id));
        }
        self.aggregator
            .fold(request, vote, ticket, &self.effects)
            .await
    }

    /// Issue a decryption round for a request's aggregate counter.
    ///
    /// Owner-only: `caller` must be the holder who created the request;
    /// anyone else fails with `Unauthorized` and no round is issued.
    /// Emits `DecryptionRequested` on success.
    pub async fn request_approval_decryption(
        &mut self,
        caller: HolderId,
        id: RequestId,
    ) -> RecoveryResult<DecryptionId> {
        let now_ms = self.effects.now_ms().await?;
        let request = self.requests.get(id)?;
        if request.holder != caller {
            return Err(RecoveryError::unauthorized(caller));
        }
        if request.executed {
            return Err(RecoveryError::already_executed(id));
        }

        let decryption_id = self
            .coordinator
            .issue(request, now_ms, &self.effects)
            .await?;
        self.effects
            .record_fact(RecoveryFact::DecryptionRequested {
                request_id: id,
                decryption_id,
                timestamp_ms: now_ms,
            })
            .await?;
        Ok(decryption_id)
    }

    /// Handle the asynchronous decryption callback.
    ///
    /// Returns `Ok(true)` exactly when the request transitioned to
    /// executed, in which case `RequestExecuted` is emitted; `Ok(false)`
    /// when the verified count fell short and the request stays open.
    /// The gateway invoking this has no caller to report errors to, so
    /// failures are additionally logged and leave the request in its
    /// prior state.
    pub async fn decryption_callback(
        &mut self,
        decryption_id: DecryptionId,
        cleartext: &[u8],
        proof: &[u8],
    ) -> RecoveryResult<bool> {
        let now_ms = self.effects.now_ms().await?;

        // (a) correlate back to the originating request
        let pending = match self.coordinator.lookup(decryption_id) {
            Ok(pending) => pending.clone(),
            Err(err) => {
                warn!(decryption_id = %decryption_id, "Callback with unknown correlation id dropped");
                return Err(err);
            }
        };

        // (b) verify the proof before touching any state
        let accepted = self
            .effects
            .verify_decryption_proof(decryption_id, cleartext, proof)
            .await?;
        if !accepted {
            self.coordinator.mark_rejected(decryption_id);
            self.effects
                .record_fact(RecoveryFact::DecryptionRejected {
                    request_id: pending.request_id,
                    decryption_id,
                    timestamp_ms: now_ms,
                })
                .await?;
            warn!(
                request_id = %pending.request_id,
                decryption_id = %decryption_id,
                "Decryption proof rejected"
            );
            return Err(RecoveryError::proof_invalid(decryption_id));
        }

        // (c) duplicate-callback guard: the request may have gone terminal
        // through another round while this one was in flight
        if self.requests.get(pending.request_id)?.executed {
            self.coordinator.resolve(decryption_id);
            return Err(RecoveryError::already_executed(pending.request_id));
        }

        // (d) decode the verified count and evaluate against the guardian
        // count read now, not at request creation
        let Some(approvals) = decode_count(cleartext) else {
            self.coordinator.mark_rejected(decryption_id);
            self.effects
                .record_fact(RecoveryFact::DecryptionRejected {
                    request_id: pending.request_id,
                    decryption_id,
                    timestamp_ms: now_ms,
                })
                .await?;
            warn!(decryption_id = %decryption_id, "Verified cleartext does not decode to a count");
            return Err(RecoveryError::proof_invalid(decryption_id));
        };
        let guardian_count = self.registry.guardian_count(&pending.holder);
        self.coordinator.resolve(decryption_id);

        match evaluate(approvals, guardian_count) {
            Verdict::Executed { .. } => {
                self.requests.mark_executed(pending.request_id)?;
                self.effects
                    .record_fact(RecoveryFact::RequestExecuted {
                        request_id: pending.request_id,
                        approvals,
                        guardian_count: guardian_count as u64,
                        timestamp_ms: now_ms,
                    })
                    .await?;
                info!(
                    request_id = %pending.request_id,
                    approvals,
                    guardian_count,
                    "Recovery request executed"
                );
                Ok(true)
            }
            Verdict::ThresholdNotMet { required, .. } => {
                self.effects
                    .record_fact(RecoveryFact::ThresholdNotMet {
                        request_id: pending.request_id,
                        approvals,
                        guardian_count: guardian_count as u64,
                        timestamp_ms: now_ms,
                    })
                    .await?;
                debug!(
                    request_id = %pending.request_id,
                    approvals,
                    required,
                    "Majority not reached; request stays open"
                );
                Ok(false)
            }
        }
    }
}
