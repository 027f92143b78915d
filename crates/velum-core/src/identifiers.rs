//! Core identifier types used across the Velum protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier of a credential holder.
///
/// A holder owns exactly one guardian registry and any number of recovery
/// requests; this identifier is the lookup key for both. It is not itself
/// a stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HolderId([u8; 32]);

impl HolderId {
    /// Create from raw entropy or a ledger account key.
    pub fn new_from_entropy(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holder-{}", hex::encode(&self.0[..8]))
    }
}

/// Recovery request identifier.
///
/// Allocated from a deployment-wide monotonic counter owned by the
/// request store. `0` is reserved as the invalid identifier; the first
/// allocation yields `1`. Identifiers are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Reserved invalid identifier.
    pub const INVALID: RequestId = RequestId(0);

    /// Inner counter value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Whether this identifier could have been allocated.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request-{}", self.0)
    }
}

/// Correlation handle for one issued decryption round.
///
/// Allocated by the ciphertext backend when decryption is requested and
/// quoted back verbatim by the asynchronous callback. The protocol treats
/// it as opaque beyond equality; no ordering between concurrently
/// outstanding rounds is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecryptionId(pub u64);

impl DecryptionId {
    /// Inner correlation value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecryptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decryption-{}", self.0)
    }
}
