//! Kernel error taxonomy.
//!
//! Per-action validation failures are not represented here: the execution
//! gate reports those as [`crate::GateOutcome`] values so it stays callable
//! in tight loops. These variants cover the genuinely exceptional paths.

use thiserror::Error;
use warden_crypto::DigestError;

/// Errors raised by the receipt chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A link or stored hash failed verification.
    #[error("receipt chain integrity violation at entry {index}: {reason}")]
    IntegrityViolation { index: usize, reason: String },

    /// A record could not be canonically serialized for hashing.
    #[error("receipt serialization failed: {0}")]
    Serialization(#[from] DigestError),

    /// The chain lock was poisoned by a panicking writer.
    #[error("receipt chain lock poisoned")]
    LockPoisoned,
}
