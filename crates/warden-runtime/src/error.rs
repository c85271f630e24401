//! Runtime error taxonomy.

use thiserror::Error;
use warden_crypto::DigestError;
use warden_kernel::ChainError;

/// Errors surfaced by the runtime coordinator and its drivers.
///
/// Gate rejections are never represented here; they are reported as
/// [`warden_kernel::GateOutcome`] values. These variants cover capacity
/// limits and genuinely exceptional conditions.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The license-imposed simulation quota would be exceeded. Reported,
    /// not fatal: the runtime stays fully operational.
    #[error("simulation quota exceeded: requested {requested}, remaining {remaining}")]
    CapacityExceeded { requested: u64, remaining: u64 },

    /// The coordinator lock was poisoned by a panicking holder.
    #[error("runtime state lock poisoned")]
    LockPoisoned,

    /// Receipt chain failure.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Canonical serialization failure while issuing or signing.
    #[error(transparent)]
    Canonicalization(#[from] DigestError),
}
