//! Cryptographic primitives for the Warden governance kernel.
//!
//! This crate provides the hashing and signature foundation the kernel is
//! built on:
//!
//! - **BLAKE3 content digests** over canonical JSON encodings, used for
//!   action fingerprinting and receipt-chain linking
//! - **Ed25519 key pairs** owned by a runtime instance for its entire
//!   lifetime, with the verifying half exposed read-only
//! - **Detached hex signatures** computed over the canonical encoding of a
//!   value, excluding the signature field itself
//!
//! # Canonical encoding
//!
//! Canonical means `serde_json`: JSON object keys are stored sorted, so two
//! logically equal values produce identical bytes regardless of how they
//! were constructed, and struct fields serialize in declared order. Every
//! digest and signature in the system is defined purely in terms of that
//! encoding.
//!
//! # Verification never errors
//!
//! [`verify_canonical`] returns `false` on any malformation, key mismatch,
//! or verification failure. Callers in tight loops (the execution gate, the
//! resilience prover) rely on a clean reject, never a crash.

#![deny(unsafe_code)]

mod digest;
mod keys;
mod sign;

pub use digest::{content_digest, Digest, DigestError, DIGEST_SIZE};
pub use keys::Keypair;
pub use sign::{sign_canonical, verify_canonical, SIGNATURE_HEX_LEN};

pub use ed25519_dalek::VerifyingKey;
