//! Effect composition for the recovery protocol.
//!
//! The facade is generic over a single composed trait so deployments and
//! tests supply one effects value covering the ciphertext backend, the
//! clock, and the fact journal.

use crate::facts::RecoveryFact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use velum_core::effects::{CiphertextEffects, PhysicalTimeEffects};
use velum_core::RecoveryError;

/// Error type for journal writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum JournalError {
    /// The fact could not be appended.
    #[error("Journal write failed: {reason}")]
    Write {
        /// Description of the failure.
        reason: String,
    },
}

impl From<JournalError> for RecoveryError {
    fn from(err: JournalError) -> Self {
        RecoveryError::internal(err.to_string())
    }
}

/// Append-only fact sink.
#[async_trait]
pub trait JournalEffects: Send + Sync {
    /// Record one fact.
    async fn record_fact(&self, fact: RecoveryFact) -> Result<(), JournalError>;
}

/// Composed effects required by the protocol facade.
pub trait ProtocolEffects:
    CiphertextEffects + PhysicalTimeEffects + JournalEffects + Send + Sync
{
}

/// Blanket implementation for any type providing all required effects.
impl<T> ProtocolEffects for T where
    T: CiphertextEffects + PhysicalTimeEffects + JournalEffects + Send + Sync
{
}
