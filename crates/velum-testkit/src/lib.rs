//! # Velum Testkit
//!
//! In-memory effect handlers for exercising the recovery protocol in
//! tests: a deterministic homomorphic backend with scriptable decryption
//! rounds, a manually advanced clock, and a fact journal that captures
//! everything the protocol emits.
//!
//! Not a cryptographic scheme. The mock backend keeps plaintexts in a
//! table and fabricates proofs with a keyed hash; it exists to drive the
//! protocol's state machines, not to provide privacy.

#![forbid(unsafe_code)]

pub mod cipher;
pub mod clock;
pub mod journal;

pub use cipher::MockCipherBackend;
pub use clock::FixedClock;
pub use journal::MemoryJournal;

use async_trait::async_trait;
use std::sync::Arc;
use velum_core::effects::{CiphertextEffects, CiphertextError, PhysicalTimeEffects, TimeError};
use velum_core::{DecryptionId, EncBool, EncUint};
use velum_recovery::effects::{JournalEffects, JournalError};
use velum_recovery::facts::RecoveryFact;

/// Bundled effects for protocol tests.
///
/// Cloning shares the underlying handlers, so a test can hand one clone
/// to the protocol and keep another for scripting decryption rounds and
/// inspecting the journal.
#[derive(Clone)]
pub struct TestEffects {
    /// Mock homomorphic backend.
    pub cipher: Arc<MockCipherBackend>,
    /// Manually advanced clock.
    pub clock: Arc<FixedClock>,
    /// Capturing fact journal.
    pub journal: Arc<MemoryJournal>,
}

impl TestEffects {
    /// Fresh handlers with a plausible wall-clock starting point.
    pub fn new() -> Self {
        Self {
            cipher: Arc::new(MockCipherBackend::new()),
            clock: Arc::new(FixedClock::starting_at(1_700_000_000_000)),
            journal: Arc::new(MemoryJournal::new()),
        }
    }
}

impl Default for TestEffects {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CiphertextEffects for TestEffects {
    async fn encrypt_zero(&self) -> Result<EncUint, CiphertextError> {
        self.cipher.encrypt_zero().await
    }

    async fn encrypt_one(&self) -> Result<EncUint, CiphertextError> {
        self.cipher.encrypt_one().await
    }

    async fn add(&self, a: &EncUint, b: &EncUint) -> Result<EncUint, CiphertextError> {
        self.cipher.add(a, b).await
    }

    async fn approval_weight(&self, vote: &EncBool) -> Result<EncUint, CiphertextError> {
        self.cipher.approval_weight(vote).await
    }

    async fn request_decryption(&self, value: &EncUint) -> Result<DecryptionId, CiphertextError> {
        self.cipher.request_decryption(value).await
    }

    async fn verify_decryption_proof(
        &self,
        id: DecryptionId,
        cleartext: &[u8],
        proof: &[u8],
    ) -> Result<bool, CiphertextError> {
        self.cipher
            .verify_decryption_proof(id, cleartext, proof)
            .await
    }
}

#[async_trait]
impl PhysicalTimeEffects for TestEffects {
    async fn now_ms(&self) -> Result<u64, TimeError> {
        self.clock.now_ms().await
    }
}

#[async_trait]
impl JournalEffects for TestEffects {
    async fn record_fact(&self, fact: RecoveryFact) -> Result<(), JournalError> {
        self.journal.record_fact(fact).await
    }
}

/// Install a subscriber printing protocol traces for a test run.
///
/// Respects `RUST_LOG`; repeated calls are no-ops.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
