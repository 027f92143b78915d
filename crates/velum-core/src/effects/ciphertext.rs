//! Homomorphic ciphertext capability.
//!
//! Minimum contract the protocol requires from the encryption scheme. Any
//! threshold or fully homomorphic scheme satisfying these operations can
//! back a deployment; the protocol consumes ciphertexts purely as opaque
//! handles and never observes a plaintext outside the verified decryption
//! callback.
//!
//! Two algebraic guarantees matter:
//!
//! - `add` is associative and commutative over the underlying plaintexts.
//!   This is what lets approval submissions arrive in any order and still
//!   produce the same aggregate, with no locking and no plaintext
//!   read-modify-write.
//! - `approval_weight` is oblivious: it performs identical work for an
//!   encrypted approve and an encrypted reject, yielding an encrypted one
//!   or zero without revealing which.

use crate::ciphertext::{EncBool, EncUint};
use crate::identifiers::DecryptionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for ciphertext backend operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum CiphertextError {
    /// Handle does not name a ciphertext known to the backend.
    #[error("Unknown ciphertext: {handle}")]
    UnknownCiphertext {
        /// Display form of the unresolved handle.
        handle: String,
    },

    /// Correlation id does not name a scheduled decryption.
    #[error("Unknown decryption round: {id}")]
    UnknownDecryption {
        /// The unresolved correlation id.
        id: DecryptionId,
    },

    /// Scheme-level failure.
    #[error("Backend failure: {reason}")]
    Backend {
        /// Description of the failure.
        reason: String,
    },
}

/// Operations the protocol requires from the homomorphic backend.
#[async_trait]
pub trait CiphertextEffects: Send + Sync {
    /// Encrypt the constant zero under the active context.
    async fn encrypt_zero(&self) -> Result<EncUint, CiphertextError>;

    /// Encrypt the constant one under the active context.
    async fn encrypt_one(&self) -> Result<EncUint, CiphertextError>;

    /// Homomorphic addition of two encrypted integers.
    async fn add(&self, a: &EncUint, b: &EncUint) -> Result<EncUint, CiphertextError>;

    /// Obliviously map an encrypted vote to an encrypted count weight:
    /// one for approve, zero for reject.
    async fn approval_weight(&self, vote: &EncBool) -> Result<EncUint, CiphertextError>;

    /// Schedule asynchronous decryption of `value`.
    ///
    /// Non-blocking: returns the correlation handle immediately. The
    /// cleartext arrives later through the deployment's callback path,
    /// accompanied by a proof of correct decryption.
    async fn request_decryption(&self, value: &EncUint) -> Result<DecryptionId, CiphertextError>;

    /// Check that `cleartext` is the faithful decryption of the ciphertext
    /// behind `id`. `Ok(false)` means the proof was rejected; callers must
    /// abort with no state change.
    async fn verify_decryption_proof(
        &self,
        id: DecryptionId,
        cleartext: &[u8],
        proof: &[u8],
    ) -> Result<bool, CiphertextError>;
}
