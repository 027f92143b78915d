//! In-memory homomorphic backend.
//!
//! Implements the ciphertext capability against a plaintext table.
//! Handles are opaque bytes from a seeded generator, so runs are
//! deterministic. Decryption rounds queue until the test feeds the
//! resulting cleartext and proof back through the protocol's callback
//! path, mirroring the asynchronous gateway of a real deployment.
//!
//! Not a cryptographic scheme: proofs are a keyed hash binding the round
//! id to the cleartext, enough to exercise the accept and reject paths.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use velum_core::effects::{CiphertextEffects, CiphertextError};
use velum_core::{CiphertextHandle, DecryptionId, EncBool, EncGuardian, EncUint};

const PROOF_KEY: [u8; 32] = *b"velum-testkit-decryption-proofs!";

#[derive(Debug, Default)]
struct BackendState {
    plaintexts: HashMap<CiphertextHandle, u64>,
    // Round id -> plaintext captured at issuance.
    rounds: HashMap<DecryptionId, u64>,
    last_decryption: u64,
}

/// Deterministic mock backend.
pub struct MockCipherBackend {
    state: Mutex<BackendState>,
    rng: Mutex<ChaCha8Rng>,
}

impl MockCipherBackend {
    /// Create with the default seed.
    pub fn new() -> Self {
        Self::with_seed(7)
    }

    /// Create with an explicit handle-generation seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Mutex::new(BackendState::default()),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn fresh_handle(&self) -> CiphertextHandle {
        let mut bytes = vec![0u8; 16];
        self.rng.lock().fill_bytes(&mut bytes);
        CiphertextHandle::from_bytes(bytes)
    }

    fn store(&self, value: u64) -> CiphertextHandle {
        let handle = self.fresh_handle();
        self.state.lock().plaintexts.insert(handle.clone(), value);
        handle
    }

    fn value_of(&self, handle: &CiphertextHandle) -> Result<u64, CiphertextError> {
        self.state
            .lock()
            .plaintexts
            .get(handle)
            .copied()
            .ok_or_else(|| CiphertextError::UnknownCiphertext {
                handle: handle.to_string(),
            })
    }

    /// Encrypt an arbitrary integer. Fixture side; the protocol itself
    /// only ever asks for zero and one.
    pub fn encrypt_uint(&self, value: u64) -> EncUint {
        EncUint::new(self.store(value))
    }

    /// Encrypt a vote.
    pub fn encrypt_bool(&self, value: bool) -> EncBool {
        EncBool::new(self.store(u64::from(value)))
    }

    /// Encrypt a guardian identifier stand-in.
    pub fn encrypt_guardian(&self, seed: u64) -> EncGuardian {
        EncGuardian::new(self.store(seed))
    }

    /// Peek at a ciphertext's plaintext. Fixture-side oracle for
    /// assertions; nothing in the protocol crates can reach this.
    pub fn plaintext_of(&self, value: &EncUint) -> Option<u64> {
        self.state.lock().plaintexts.get(value.handle()).copied()
    }

    /// Cleartext bytes and matching proof for a scheduled round.
    pub fn decryption_result(&self, id: DecryptionId) -> Option<(Vec<u8>, Vec<u8>)> {
        let plaintext = self.state.lock().rounds.get(&id).copied()?;
        let cleartext = plaintext.to_le_bytes().to_vec();
        let proof = Self::proof_for(id, &cleartext);
        Some((cleartext, proof))
    }

    /// A proof that verifies for no round.
    pub fn forged_proof() -> Vec<u8> {
        vec![0u8; 32]
    }

    fn proof_for(id: DecryptionId, cleartext: &[u8]) -> Vec<u8> {
        let mut hasher = blake3::Hasher::new_keyed(&PROOF_KEY);
        hasher.update(&id.value().to_le_bytes());
        hasher.update(cleartext);
        hasher.finalize().as_bytes().to_vec()
    }
}

impl Default for MockCipherBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CiphertextEffects for MockCipherBackend {
    async fn encrypt_zero(&self) -> Result<EncUint, CiphertextError> {
        Ok(self.encrypt_uint(0))
    }

    async fn encrypt_one(&self) -> Result<EncUint, CiphertextError> {
        Ok(self.encrypt_uint(1))
    }

    async fn add(&self, a: &EncUint, b: &EncUint) -> Result<EncUint, CiphertextError> {
        let sum = self
            .value_of(a.handle())?
            .wrapping_add(self.value_of(b.handle())?);
        Ok(EncUint::new(self.store(sum)))
    }

    async fn approval_weight(&self, vote: &EncBool) -> Result<EncUint, CiphertextError> {
        let weight = u64::from(self.value_of(vote.handle())? != 0);
        Ok(EncUint::new(self.store(weight)))
    }

    async fn request_decryption(&self, value: &EncUint) -> Result<DecryptionId, CiphertextError> {
        let plaintext = self.value_of(value.handle())?;
        let mut state = self.state.lock();
        state.last_decryption += 1;
        let id = DecryptionId(state.last_decryption);
        state.rounds.insert(id, plaintext);
        Ok(id)
    }

    async fn verify_decryption_proof(
        &self,
        id: DecryptionId,
        cleartext: &[u8],
        proof: &[u8],
    ) -> Result<bool, CiphertextError> {
        let Some(plaintext) = self.state.lock().rounds.get(&id).copied() else {
            return Err(CiphertextError::UnknownDecryption { id });
        };
        let faithful = cleartext == plaintext.to_le_bytes().as_slice();
        let bound = Self::proof_for(id, cleartext).as_slice() == proof;
        Ok(faithful && bound)
    }
}
