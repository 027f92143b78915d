//! # Velum Core - Shared Types and Effect Traits
//!
//! Core vocabulary for the Velum social-recovery protocol: identifier
//! newtypes, opaque ciphertext handles, the unified error type, and the
//! effect traits through which protocol code reaches the outside world
//! (wall-clock time and the homomorphic ciphertext backend).
//!
//! ## What Belongs Here
//!
//! - Identifier and handle newtypes shared by every crate
//! - The `RecoveryError` taxonomy and `RecoveryResult` alias
//! - Effect trait definitions (no implementations)
//!
//! ## What Does NOT Belong Here
//!
//! - Protocol state machines (velum-recovery)
//! - Effect handler implementations (velum-testkit carries the in-memory
//!   test handlers; production handlers live with their deployments)

#![forbid(unsafe_code)]

pub mod ciphertext;
pub mod effects;
pub mod errors;
pub mod identifiers;

pub use ciphertext::{CiphertextHandle, EncBool, EncGuardian, EncUint};
pub use errors::{RecoveryError, RecoveryResult};
pub use identifiers::{DecryptionId, HolderId, RequestId};
