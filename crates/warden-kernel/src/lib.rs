//! Warden governance core.
//!
//! Everything an autonomous agent's action must pass before it is allowed
//! to bind the world lives here:
//!
//! - **Actions**: opaque payloads identified by canonical content digests
//! - **Authority tokens**: signed, time-bounded, nonce-bearing credentials
//!   binding an actor to one specific action at one authority tier
//! - **The execution gate**: the single chokepoint validating signature,
//!   replay, expiry, and action binding
//! - **The receipt chain**: an append-only, hash-linked audit ledger,
//!   independently verifiable for tamper detection
//! - **Stability tracking**: a fast-moving health index plus a Beta
//!   posterior that accumulates evidence across the runtime's lifetime
//! - **Tier classification**: declared risk mapped to an authority tier,
//!   escalated under low confidence
//!
//! The kernel is deliberately free of shared mutable state: the replay
//! registry and the lock that makes gate evaluation atomic are owned by the
//! runtime coordinator one layer up.

#![deny(unsafe_code)]

pub mod action;
pub mod error;
pub mod gate;
pub mod receipt;
pub mod reconcile;
pub mod stability;
pub mod tier;
pub mod token;

pub use action::Action;
pub use error::ChainError;
pub use gate::{ExecutionGate, GateOutcome};
pub use receipt::{Receipt, ReceiptChain};
pub use reconcile::Reconciler;
pub use stability::{StabilitySnapshot, StabilityTracker};
pub use tier::{classify, classify_label, AuthorityTier, RiskClass, LOW_CONFIDENCE_THRESHOLD};
pub use token::AuthorityToken;
