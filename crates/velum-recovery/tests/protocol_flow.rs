//! End-to-end protocol scenarios.
//!
//! Drives the full ledger surface: registry configuration, request
//! creation, encrypted approvals, decryption rounds, and the execution
//! decision, including the failure paths of each entry point.

use assert_matches::assert_matches;
use velum_core::{DecryptionId, HolderId, RecoveryError, RequestId};
use velum_recovery::aggregator::ApprovalTicket;
use velum_recovery::facts::RecoveryFact;
use velum_recovery::protocol::RecoveryProtocol;
use velum_testkit::TestEffects;

/// Fixture wiring a protocol instance to scriptable test effects.
struct ProtocolHarness {
    effects: TestEffects,
    protocol: RecoveryProtocol<TestEffects>,
    holder: HolderId,
    last_ticket: u64,
}

impl ProtocolHarness {
    fn new() -> Self {
        let effects = TestEffects::new();
        let protocol = RecoveryProtocol::with_defaults(effects.clone());
        Self {
            effects,
            protocol,
            holder: HolderId::new_from_entropy([1u8; 32]),
            last_ticket: 0,
        }
    }

    fn ticket(&mut self) -> ApprovalTicket {
        self.last_ticket += 1;
        ApprovalTicket::from_bytes(self.last_ticket.to_le_bytes().to_vec())
    }

    fn register_guardians(&mut self, count: usize) {
        let guardians = (0..count)
            .map(|i| self.effects.cipher.encrypt_guardian(i as u64))
            .collect();
        self.protocol.set_guardians(self.holder, guardians);
    }

    async fn submit_votes(&mut self, id: RequestId, approvals: usize, rejections: usize) {
        for _ in 0..approvals {
            let vote = self.effects.cipher.encrypt_bool(true);
            let ticket = self.ticket();
            self.protocol
                .submit_approval(id, &vote, &ticket)
                .await
                .expect("approval should fold");
        }
        for _ in 0..rejections {
            let vote = self.effects.cipher.encrypt_bool(false);
            let ticket = self.ticket();
            self.protocol
                .submit_approval(id, &vote, &ticket)
                .await
                .expect("rejection should fold");
        }
    }

    /// Issue a round and deliver its callback with the backend's own
    /// cleartext and proof.
    async fn run_decryption(&mut self, id: RequestId) -> Result<bool, RecoveryError> {
        let decryption_id = self
            .protocol
            .request_approval_decryption(self.holder, id)
            .await?;
        let (cleartext, proof) = self
            .effects
            .cipher
            .decryption_result(decryption_id)
            .expect("round should be scheduled");
        self.protocol
            .decryption_callback(decryption_id, &cleartext, &proof)
            .await
    }
}

#[tokio::test]
async fn majority_of_three_guardians_executes_request_one() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);

    let id = harness
        .protocol
        .create_request(harness.holder)
        .await
        .expect("request should be created");
    assert_eq!(id, RequestId(1));

    harness.submit_votes(id, 2, 0).await;

    let executed = harness
        .run_decryption(id)
        .await
        .expect("round should resolve");
    assert!(executed, "two of three is a strict majority");
    assert!(harness.protocol.get_request(id).unwrap().executed);
    assert_eq!(harness.effects.journal.executed_count(id), 1);

    let facts = harness.effects.journal.facts();
    assert_matches!(facts[0], RecoveryFact::RequestCreated { request_id, .. } if request_id == id);
}

#[tokio::test]
async fn minority_leaves_request_open_until_more_approvals_accrue() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(5);

    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;

    let executed = harness.run_decryption(id).await.unwrap();
    assert!(!executed, "two of five falls short of the majority");
    assert!(!harness.protocol.get_request(id).unwrap().executed);

    // a later approval and a fresh round push it over
    harness.submit_votes(id, 1, 0).await;
    let executed = harness.run_decryption(id).await.unwrap();
    assert!(executed);
    assert_eq!(harness.effects.journal.executed_count(id), 1);
}

#[tokio::test]
async fn rejections_do_not_raise_the_count() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);

    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 1, 2).await;

    let counter = &harness.protocol.get_request(id).unwrap().approvals;
    assert_eq!(harness.effects.cipher.plaintext_of(counter), Some(1));

    let executed = harness.run_decryption(id).await.unwrap();
    assert!(!executed, "one of three falls short of the majority");
}

#[tokio::test]
async fn replayed_ticket_is_rejected_without_touching_the_counter() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);

    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    let ticket = harness.ticket();
    let first = harness.effects.cipher.encrypt_bool(true);
    harness
        .protocol
        .submit_approval(id, &first, &ticket)
        .await
        .unwrap();

    let replay = harness.effects.cipher.encrypt_bool(true);
    assert_matches!(
        harness.protocol.submit_approval(id, &replay, &ticket).await,
        Err(RecoveryError::TicketSpent { request_id }) if request_id == id
    );

    let counter = &harness.protocol.get_request(id).unwrap().approvals;
    assert_eq!(harness.effects.cipher.plaintext_of(counter), Some(1));
}

#[tokio::test]
async fn unknown_and_reserved_identifiers_fail() {
    let mut harness = ProtocolHarness::new();

    assert_matches!(
        harness.protocol.get_request(RequestId::INVALID),
        Err(RecoveryError::InvalidRequest { .. })
    );

    let vote = harness.effects.cipher.encrypt_bool(true);
    let ticket = harness.ticket();
    assert_matches!(
        harness.protocol.submit_approval(RequestId(42), &vote, &ticket).await,
        Err(RecoveryError::InvalidRequest { .. })
    );
}

#[tokio::test]
async fn request_identifiers_are_monotonic_across_holders() {
    let mut harness = ProtocolHarness::new();
    let other = HolderId::new_from_entropy([2u8; 32]);

    let first = harness.protocol.create_request(harness.holder).await.unwrap();
    let second = harness.protocol.create_request(other).await.unwrap();
    let third = harness.protocol.create_request(harness.holder).await.unwrap();

    assert_eq!((first, second, third), (RequestId(1), RequestId(2), RequestId(3)));

    let owned: Vec<_> = harness
        .protocol
        .requests_for(&harness.holder)
        .into_iter()
        .map(|request| request.id)
        .collect();
    assert_eq!(owned, vec![RequestId(1), RequestId(3)]);
}

#[tokio::test]
async fn non_owner_cannot_issue_decryption() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();

    let outsider = HolderId::new_from_entropy([9u8; 32]);
    assert_matches!(
        harness.protocol.request_approval_decryption(outsider, id).await,
        Err(RecoveryError::Unauthorized { holder }) if holder == outsider
    );

    // no round was issued, so no correlation exists
    let facts = harness.effects.journal.facts();
    assert!(!facts
        .iter()
        .any(|fact| matches!(fact, RecoveryFact::DecryptionRequested { .. })));
}

#[tokio::test]
async fn callback_with_unknown_correlation_is_dropped() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();

    let result = harness
        .protocol
        .decryption_callback(DecryptionId(99), &[2], &[0u8; 32])
        .await;
    assert_matches!(result, Err(RecoveryError::InvalidRequest { .. }));
    assert!(!harness.protocol.get_request(id).unwrap().executed);
}

#[tokio::test]
async fn rejected_proof_leaves_request_recoverable() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;

    let round = harness
        .protocol
        .request_approval_decryption(harness.holder, id)
        .await
        .unwrap();
    let (cleartext, _) = harness.effects.cipher.decryption_result(round).unwrap();

    let result = harness
        .protocol
        .decryption_callback(round, &cleartext, &velum_testkit::MockCipherBackend::forged_proof())
        .await;
    assert_matches!(result, Err(RecoveryError::ProofInvalid { .. }));
    assert!(!harness.protocol.get_request(id).unwrap().executed);

    // a rejected round no longer blocks issuance; the fresh round executes
    let executed = harness.run_decryption(id).await.unwrap();
    assert!(executed);
    assert_eq!(harness.effects.journal.executed_count(id), 1);
}

#[tokio::test]
async fn corrected_proof_for_the_same_round_still_resolves() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;

    let round = harness
        .protocol
        .request_approval_decryption(harness.holder, id)
        .await
        .unwrap();
    let (cleartext, proof) = harness.effects.cipher.decryption_result(round).unwrap();

    let rejected = harness
        .protocol
        .decryption_callback(round, &cleartext, &velum_testkit::MockCipherBackend::forged_proof())
        .await;
    assert_matches!(rejected, Err(RecoveryError::ProofInvalid { .. }));

    // the round stays correlated, so the corrected delivery succeeds
    let executed = harness
        .protocol
        .decryption_callback(round, &cleartext, &proof)
        .await
        .unwrap();
    assert!(executed);
}

#[tokio::test]
async fn late_round_after_execution_is_a_no_op() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;

    // round A's proof is rejected, so it stays correlated while round B
    // is issued and executes the request
    let round_a = harness
        .protocol
        .request_approval_decryption(harness.holder, id)
        .await
        .unwrap();
    let (cleartext_a, proof_a) = harness.effects.cipher.decryption_result(round_a).unwrap();
    let _ = harness
        .protocol
        .decryption_callback(round_a, &cleartext_a, &velum_testkit::MockCipherBackend::forged_proof())
        .await;
    assert!(harness.run_decryption(id).await.unwrap());

    let late = harness
        .protocol
        .decryption_callback(round_a, &cleartext_a, &proof_a)
        .await;
    assert_matches!(late, Err(RecoveryError::AlreadyExecuted { request_id }) if request_id == id);
    assert_eq!(harness.effects.journal.executed_count(id), 1);
}

#[tokio::test]
async fn terminal_requests_reject_further_mutation() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;
    assert!(harness.run_decryption(id).await.unwrap());

    let vote = harness.effects.cipher.encrypt_bool(true);
    let ticket = harness.ticket();
    assert_matches!(
        harness.protocol.submit_approval(id, &vote, &ticket).await,
        Err(RecoveryError::AlreadyExecuted { .. })
    );
    assert_matches!(
        harness.protocol.request_approval_decryption(harness.holder, id).await,
        Err(RecoveryError::AlreadyExecuted { .. })
    );
}

#[tokio::test]
async fn second_issuance_waits_for_timeout() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;

    let first = harness
        .protocol
        .request_approval_decryption(harness.holder, id)
        .await
        .unwrap();
    assert_matches!(
        harness.protocol.request_approval_decryption(harness.holder, id).await,
        Err(RecoveryError::DecryptionInProgress { decryption_id, .. }) if decryption_id == first
    );

    // after the timeout the stale round is superseded and its late
    // callback no longer correlates
    harness.effects.clock.advance_ms(24 * 60 * 60 * 1000);
    let (cleartext, proof) = harness.effects.cipher.decryption_result(first).unwrap();
    let second = harness
        .protocol
        .request_approval_decryption(harness.holder, id)
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_matches!(
        harness.protocol.decryption_callback(first, &cleartext, &proof).await,
        Err(RecoveryError::InvalidRequest { .. })
    );

    let (cleartext, proof) = harness.effects.cipher.decryption_result(second).unwrap();
    assert!(harness
        .protocol
        .decryption_callback(second, &cleartext, &proof)
        .await
        .unwrap());
}

#[tokio::test]
async fn registering_more_guardians_raises_the_bar_for_open_requests() {
    let mut harness = ProtocolHarness::new();
    harness.register_guardians(3);
    let id = harness.protocol.create_request(harness.holder).await.unwrap();
    harness.submit_votes(id, 2, 0).await;

    // the guardian count is read at evaluation time, not frozen at
    // creation: two approvals no longer carry a majority of five
    harness.register_guardians(5);
    let executed = harness.run_decryption(id).await.unwrap();
    assert!(!executed);

    let facts = harness.effects.journal.facts();
    assert_matches!(
        facts.last(),
        Some(RecoveryFact::ThresholdNotMet { approvals: 2, guardian_count: 5, .. })
    );
}

#[tokio::test]
async fn unconfigured_registry_reports_zero_guardians() {
    let harness = ProtocolHarness::new();
    assert_eq!(harness.protocol.guardian_count(&harness.holder), 0);
    assert!(harness.protocol.guardian_set(&harness.holder).is_none());
}
