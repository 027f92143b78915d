//! Opaque ciphertext handles.
//!
//! The protocol never inspects ciphertext contents; handles are byte
//! sequences passed through unchanged between the ledger surface and the
//! homomorphic backend. The typed wrappers exist so an encrypted guardian
//! identifier cannot be fed where an encrypted counter is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to one ciphertext held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(Vec<u8>);

impl CiphertextHandle {
    /// Wrap raw handle bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw handle bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.0[..self.0.len().min(8)];
        write!(f, "ct-{}", hex::encode(prefix))
    }
}

/// Handle typed as an encrypted unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncUint(CiphertextHandle);

impl EncUint {
    /// Wrap a handle known to name an encrypted integer.
    pub fn new(handle: CiphertextHandle) -> Self {
        Self(handle)
    }

    /// Underlying handle.
    pub fn handle(&self) -> &CiphertextHandle {
        &self.0
    }

    /// Unwrap into the underlying handle.
    pub fn into_handle(self) -> CiphertextHandle {
        self.0
    }
}

/// Handle typed as an encrypted boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncBool(CiphertextHandle);

impl EncBool {
    /// Wrap a handle known to name an encrypted boolean.
    pub fn new(handle: CiphertextHandle) -> Self {
        Self(handle)
    }

    /// Underlying handle.
    pub fn handle(&self) -> &CiphertextHandle {
        &self.0
    }

    /// Unwrap into the underlying handle.
    pub fn into_handle(self) -> CiphertextHandle {
        self.0
    }
}

/// Handle typed as one encrypted guardian identifier.
///
/// No comparison or decryption operation exists for guardian handles
/// anywhere in this workspace; the only observable over a registry is its
/// cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncGuardian(CiphertextHandle);

impl EncGuardian {
    /// Wrap a handle known to name an encrypted guardian identifier.
    pub fn new(handle: CiphertextHandle) -> Self {
        Self(handle)
    }

    /// Underlying handle.
    pub fn handle(&self) -> &CiphertextHandle {
        &self.0
    }

    /// Unwrap into the underlying handle.
    pub fn into_handle(self) -> CiphertextHandle {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncates_long_handles() {
        let handle = CiphertextHandle::from_bytes(vec![0xff; 32]);
        assert_eq!(handle.to_string(), "ct-ffffffffffffffff");
    }

    #[test]
    fn display_handles_short_handles() {
        let handle = CiphertextHandle::from_bytes(vec![0x01, 0x02]);
        assert_eq!(handle.to_string(), "ct-0102");
    }

    #[test]
    fn handle_round_trips_through_wrappers() {
        let handle = CiphertextHandle::from_bytes(vec![1, 2, 3]);
        let counter = EncUint::new(handle.clone());
        assert_eq!(counter.into_handle(), handle);
    }
}
