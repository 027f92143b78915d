//! Majority execution rule.
//!
//! Pure decision logic: compare a decrypted approval count against the
//! strict-majority threshold derived from the guardian count read at
//! evaluation time. The count is deliberately not frozen at request
//! creation; registering more guardians after a request exists raises
//! that request's bar.

use serde::{Deserialize, Serialize};

/// Strict majority: `floor(n / 2) + 1`.
///
/// With zero guardians the threshold is one, so an unconfigured registry
/// can never execute a request on an empty count.
pub fn majority_threshold(guardian_count: usize) -> usize {
    guardian_count / 2 + 1
}

/// Outcome of evaluating one decrypted approval count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Majority reached; the request transitions to executed.
    Executed {
        /// Decrypted approval count.
        approvals: u64,
        /// Guardian count at evaluation time.
        guardian_count: usize,
    },
    /// Majority not reached; the request stays open for further approvals
    /// and a later decryption round.
    ThresholdNotMet {
        /// Decrypted approval count.
        approvals: u64,
        /// Guardian count at evaluation time.
        guardian_count: usize,
        /// Approvals that would have been required.
        required: usize,
    },
}

/// Apply the strict-majority rule.
pub fn evaluate(approvals: u64, guardian_count: usize) -> Verdict {
    let required = majority_threshold(guardian_count);
    if approvals >= required as u64 {
        Verdict::Executed {
            approvals,
            guardian_count,
        }
    } else {
        Verdict::ThresholdNotMet {
            approvals,
            guardian_count,
            required,
        }
    }
}
