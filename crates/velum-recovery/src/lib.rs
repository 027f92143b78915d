//! # Velum Recovery - Encrypted Guardian Registry and Approval Protocol
//!
//! Privacy-preserving social recovery for a custodial credential. A holder
//! registers a set of guardians whose identities are stored only as
//! ciphertexts; recovering a lost credential requires a strict majority of
//! guardians to approve, and no guardian learns who else is a guardian or
//! how any other guardian voted.
//!
//! ## Protocol Shape
//!
//! - **Guardian Registry**: per-holder ordered set of encrypted guardian
//!   identifiers; guardian count is the only observable cardinality.
//! - **Request Store**: recovery requests carrying homomorphically
//!   maintained encrypted approval counters, with deployment-wide
//!   monotonic identifiers.
//! - **Approval Aggregator**: folds one encrypted yes/no vote per one-time
//!   ticket into a request counter; never decrypts individual votes.
//! - **Decryption Coordinator**: one-shot decryption rounds correlated by
//!   opaque id, with proof verification on the callback path.
//! - **Execution Evaluator**: strict-majority decision against the
//!   guardian count read at evaluation time; terminal exactly once.
//!
//! Control flow: registry mutation, then request creation, then any number
//! of commutative aggregator submissions, then one decryption round trip,
//! then one evaluator decision ending in a terminal state and a fact.
//!
//! ## Privacy Invariants
//!
//! - No plaintext guardian identity is stored or compared anywhere.
//! - Votes enter as ciphertexts and are folded obliviously; only the
//!   aggregate count is ever revealed, through a verified decryption.
//! - Facts carry request-level data only, never per-guardian data.

#![forbid(unsafe_code)]

pub mod aggregator;
pub mod coordinator;
pub mod effects;
pub mod evaluator;
pub mod facts;
pub mod protocol;
pub mod registry;
pub mod requests;

pub use velum_core::{
    CiphertextHandle, DecryptionId, EncBool, EncGuardian, EncUint, HolderId, RecoveryError,
    RecoveryResult, RequestId,
};

pub use aggregator::{ApprovalAggregator, ApprovalTicket};
pub use coordinator::{CoordinatorConfig, DecryptionCoordinator, PendingDecryption};
pub use effects::{JournalEffects, JournalError, ProtocolEffects};
pub use evaluator::{evaluate, majority_threshold, Verdict};
pub use facts::RecoveryFact;
pub use protocol::RecoveryProtocol;
pub use registry::{GuardianRegistry, GuardianSet};
pub use requests::{RecoveryRequest, RequestStore};
