//! BLAKE3 content digests over canonical JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of a digest in raw bytes.
pub const DIGEST_SIZE: usize = 32;

/// Errors produced while canonicalizing content for digesting or signing.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The value could not be canonically serialized.
    #[error("content is not canonically serializable: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A fixed-length, hex-encoded BLAKE3 digest of canonical content.
///
/// Equal logical content always yields the same digest: object keys are
/// ordered structurally rather than by insertion, so construction order
/// never leaks into the fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wraps raw digest bytes, hex-encoding them.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; DIGEST_SIZE]) -> Self {
        Self(hex::encode(bytes))
    }

    /// The hex form of the digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digests a serializable value over its canonical JSON encoding.
///
/// # Errors
///
/// Returns [`DigestError::Serialization`] for non-serializable input.
pub fn content_digest<T: Serialize>(value: &T) -> Result<Digest, DigestError> {
    let encoded = serde_json::to_vec(value)?;
    Ok(Digest::from_bytes(blake3::hash(&encoded).as_bytes()))
}
