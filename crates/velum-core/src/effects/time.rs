//! Wall-clock time effect.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The clock source could not be read.
    #[error("Clock unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
}

/// Wall-clock access for timestamps and round expiry.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current Unix time in milliseconds.
    async fn now_ms(&self) -> Result<u64, TimeError>;
}
