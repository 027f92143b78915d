//! Unified error type for Velum protocol operations.
//!
//! One enum covers the caller-visible failure taxonomy. Every variant is
//! scoped to the single request, registry, or decryption round it touches;
//! nothing here is fatal to the protocol as a whole.

use crate::effects::ciphertext::CiphertextError;
use crate::effects::time::TimeError;
use crate::identifiers::{DecryptionId, HolderId, RequestId};
use serde::{Deserialize, Serialize};

/// Unified error type for all protocol operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RecoveryError {
    /// Unknown, out-of-range, or reserved request identifier. Also raised
    /// for a decryption callback whose correlation id is unrecognized, in
    /// which case the reserved identifier is reported.
    #[error("Invalid request: {request_id}")]
    InvalidRequest {
        /// Identifier that failed to resolve.
        request_id: RequestId,
    },

    /// Mutation attempted on a request that already reached its terminal
    /// executed state.
    #[error("Request already executed: {request_id}")]
    AlreadyExecuted {
        /// Identifier of the terminal request.
        request_id: RequestId,
    },

    /// Non-owner attempted an owner-only action.
    #[error("Unauthorized caller: {holder}")]
    Unauthorized {
        /// Caller that was rejected.
        holder: HolderId,
    },

    /// Decryption callback failed cryptographic verification.
    #[error("Decryption proof rejected for {decryption_id}")]
    ProofInvalid {
        /// Round whose proof was rejected.
        decryption_id: DecryptionId,
    },

    /// A decryption round is already outstanding for this request.
    #[error("Decryption already in progress for {request_id} ({decryption_id})")]
    DecryptionInProgress {
        /// Request with the outstanding round.
        request_id: RequestId,
        /// The outstanding round.
        decryption_id: DecryptionId,
    },

    /// One-time approval ticket was already consumed for this request.
    #[error("Approval ticket already spent for {request_id}")]
    TicketSpent {
        /// Request the replayed ticket targeted.
        request_id: RequestId,
    },

    /// Ciphertext backend failure.
    #[error("Backend error: {reason}")]
    Backend {
        /// Description of the backend failure.
        reason: String,
    },

    /// Clock failure.
    #[error("Time error: {reason}")]
    Time {
        /// Description of the clock failure.
        reason: String,
    },

    /// Internal infrastructure failure (journal, bookkeeping).
    #[error("Internal error: {reason}")]
    Internal {
        /// Description of the failure.
        reason: String,
    },
}

impl RecoveryError {
    /// Create an invalid-request error.
    pub fn invalid_request(request_id: RequestId) -> Self {
        Self::InvalidRequest { request_id }
    }

    /// Create an already-executed error.
    pub fn already_executed(request_id: RequestId) -> Self {
        Self::AlreadyExecuted { request_id }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(holder: HolderId) -> Self {
        Self::Unauthorized { holder }
    }

    /// Create a proof-invalid error.
    pub fn proof_invalid(decryption_id: DecryptionId) -> Self {
        Self::ProofInvalid { decryption_id }
    }

    /// Create a decryption-in-progress error.
    pub fn decryption_in_progress(request_id: RequestId, decryption_id: DecryptionId) -> Self {
        Self::DecryptionInProgress {
            request_id,
            decryption_id,
        }
    }

    /// Create a ticket-spent error.
    pub fn ticket_spent(request_id: RequestId) -> Self {
        Self::TicketSpent { request_id }
    }

    /// Create a backend error.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}

/// Standard result type for protocol operations.
pub type RecoveryResult<T> = std::result::Result<T, RecoveryError>;

impl From<CiphertextError> for RecoveryError {
    fn from(err: CiphertextError) -> Self {
        Self::backend(err.to_string())
    }
}

impl From<TimeError> for RecoveryError {
    fn from(err: TimeError) -> Self {
        Self::Time {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_scoped_identifiers() {
        let err = RecoveryError::already_executed(RequestId(7));
        assert_eq!(err.to_string(), "Request already executed: request-7");
    }

    #[test]
    fn backend_errors_convert() {
        let err: RecoveryError = CiphertextError::Backend {
            reason: "offline".to_string(),
        }
        .into();
        assert!(matches!(err, RecoveryError::Backend { .. }));
    }
}
