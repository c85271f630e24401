//! Detached signatures over canonical JSON encodings.

use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};
use serde::Serialize;

use crate::digest::DigestError;
use crate::keys::Keypair;

/// Length of a hex-encoded Ed25519 signature.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// Signs the canonical JSON encoding of `value`, returning a hex signature.
///
/// # Errors
///
/// Returns [`DigestError::Serialization`] if the value cannot be
/// canonically serialized.
pub fn sign_canonical<T: Serialize>(keypair: &Keypair, value: &T) -> Result<String, DigestError> {
    let encoded = serde_json::to_vec(value)?;
    let signature = keypair.signing_key().sign(&encoded);
    Ok(hex::encode(signature.to_bytes()))
}

/// Verifies a hex signature against the canonical JSON encoding of `value`.
///
/// Returns `false` on any malformation, key mismatch, or verification
/// failure; it never panics or surfaces an error.
#[must_use]
pub fn verify_canonical<T: Serialize>(
    verifying_key: &VerifyingKey,
    value: &T,
    signature_hex: &str,
) -> bool {
    let Ok(encoded) = serde_json::to_vec(value) else {
        return false;
    };
    let Ok(raw) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&raw) else {
        return false;
    };
    verifying_key.verify(&encoded, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn sign_and_verify_roundtrip() {
        let keypair = Keypair::generate();
        let value = json!({"actor": "agent-1", "nonce": 1});

        let signature = sign_canonical(&keypair, &value).unwrap();
        assert_eq!(signature.len(), SIGNATURE_HEX_LEN);
        assert!(verify_canonical(keypair.verifying_key(), &value, &signature));
    }

    #[test]
    fn verification_fails_for_other_key() {
        let keypair = Keypair::generate();
        let other = Keypair::generate();
        let value = json!({"actor": "agent-1"});

        let signature = sign_canonical(&keypair, &value).unwrap();
        assert!(!verify_canonical(other.verifying_key(), &value, &signature));
    }

    #[test]
    fn verification_fails_for_changed_content() {
        let keypair = Keypair::generate();
        let signature = sign_canonical(&keypair, &json!({"n": 1})).unwrap();
        assert!(!verify_canonical(
            keypair.verifying_key(),
            &json!({"n": 2}),
            &signature
        ));
    }

    #[test]
    fn malformed_signatures_are_rejected_not_fatal() {
        let keypair = Keypair::generate();
        let value = json!({"n": 1});

        let zeroed = "0".repeat(SIGNATURE_HEX_LEN);
        for bad in ["", "zz", "00", zeroed.as_str()] {
            assert!(!verify_canonical(keypair.verifying_key(), &value, bad));
        }
    }

    proptest! {
        #[test]
        fn corrupting_any_hex_digit_invalidates(position in 0usize..SIGNATURE_HEX_LEN) {
            let keypair = Keypair::generate();
            let value = json!({"seq": 7});
            let signature = sign_canonical(&keypair, &value).unwrap();

            let mut corrupted: Vec<char> = signature.chars().collect();
            corrupted[position] = if corrupted[position] == 'f' { '0' } else { 'f' };
            let corrupted: String = corrupted.into_iter().collect();

            prop_assume!(corrupted != signature);
            prop_assert!(!verify_canonical(keypair.verifying_key(), &value, &corrupted));
        }
    }
}
