//! Ed25519 key pairs owned by a runtime instance.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

/// An Ed25519 signing/verifying pair.
///
/// The signing half never leaves this crate; external callers sign through
/// [`crate::sign_canonical`] and only ever hold the verifying half. Secret
/// key material is zeroized on drop by the underlying implementation.
pub struct Keypair {
    signing: SigningKey,
    verifying: VerifyingKey,
}

impl Keypair {
    /// Generates a fresh key pair from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let signing = SigningKey::generate(&mut OsRng);
        let verifying = signing.verifying_key();
        Self { signing, verifying }
    }

    /// The verifying half of the pair, exposed read-only.
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    /// Raw public-key bytes, hex-encoded, for external verifiers.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying.as_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_hex_is_32_bytes_encoded() {
        let keypair = Keypair::generate();
        assert_eq!(keypair.public_key_hex().len(), 64);
    }

    #[test]
    fn generated_pairs_are_distinct() {
        assert_ne!(
            Keypair::generate().public_key_hex(),
            Keypair::generate().public_key_hex()
        );
    }

    #[test]
    fn debug_does_not_leak_secret_material() {
        let keypair = Keypair::generate();
        let rendered = format!("{keypair:?}");
        assert!(rendered.contains(&keypair.public_key_hex()));
        assert!(!rendered.contains("signing"));
    }
}
