//! Signed, time-bounded, replay-protected authority tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use warden_crypto::{sign_canonical, verify_canonical, Digest, DigestError, Keypair, VerifyingKey};

use crate::action::Action;
use crate::tier::AuthorityTier;

/// A signed credential binding an actor, one specific action, and an
/// authority tier to a single-use nonce and a validity window.
///
/// The signature covers the canonical encoding of every field except the
/// signature itself. A token is consumed exactly once by the execution
/// gate and never mutated after signing; once its nonce is in the replay
/// registry, re-submission is rejected regardless of signature validity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorityToken {
    pub actor: String,
    pub action_hash: Digest,
    pub tier: AuthorityTier,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub nonce: u64,
    pub signature: String,
}

/// The signed view of a token: every field except the signature, in a
/// fixed canonical order.
#[derive(Serialize)]
struct Claims<'a> {
    actor: &'a str,
    action_hash: &'a Digest,
    tier: AuthorityTier,
    issued_at: &'a DateTime<Utc>,
    expires_at: &'a DateTime<Utc>,
    nonce: u64,
}

impl AuthorityToken {
    /// Issues and signs a token authorizing `actor` to perform `action`.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Serialization`] if the action or the claims
    /// cannot be canonically serialized.
    pub fn issue(
        actor: impl Into<String>,
        action: &Action,
        tier: AuthorityTier,
        ttl: Duration,
        nonce: u64,
        keypair: &Keypair,
    ) -> Result<Self, DigestError> {
        let issued_at = Utc::now();
        let mut token = Self {
            actor: actor.into(),
            action_hash: action.fingerprint()?,
            tier,
            issued_at,
            expires_at: issued_at + ttl,
            nonce,
            signature: String::new(),
        };
        let signature = sign_canonical(keypair, &token.claims())?;
        token.signature = signature;
        Ok(token)
    }

    fn claims(&self) -> Claims<'_> {
        Claims {
            actor: &self.actor,
            action_hash: &self.action_hash,
            tier: self.tier,
            issued_at: &self.issued_at,
            expires_at: &self.expires_at,
            nonce: self.nonce,
        }
    }

    /// Verifies the stored signature against the token's own claims.
    ///
    /// Returns `false` on any malformation, key mismatch, or verification
    /// failure; it never errors.
    #[must_use]
    pub fn verify(&self, verifying_key: &VerifyingKey) -> bool {
        verify_canonical(verifying_key, &self.claims(), &self.signature)
    }

    /// Whether the validity window has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn transfer_action() -> Action {
        Action::new()
            .with_field("intent", "transfer")
            .with_field("amount", 10)
    }

    fn issued(keypair: &Keypair) -> AuthorityToken {
        AuthorityToken::issue(
            "agent-1",
            &transfer_action(),
            AuthorityTier::T2,
            Duration::seconds(300),
            1,
            keypair,
        )
        .unwrap()
    }

    #[test]
    fn issued_tokens_verify() {
        let keypair = Keypair::generate();
        let token = issued(&keypair);

        assert!(token.verify(keypair.verifying_key()));
        assert_eq!(token.expires_at - token.issued_at, Duration::seconds(300));
    }

    #[test]
    fn verification_fails_for_other_key() {
        let keypair = Keypair::generate();
        let other = Keypair::generate();

        assert!(!issued(&keypair).verify(other.verifying_key()));
    }

    #[test]
    fn mutating_any_field_after_signing_invalidates() {
        let keypair = Keypair::generate();
        let token = issued(&keypair);

        let mut actor_changed = token.clone();
        actor_changed.actor = "agent-2".to_string();
        assert!(!actor_changed.verify(keypair.verifying_key()));

        let mut tier_changed = token.clone();
        tier_changed.tier = AuthorityTier::T4;
        assert!(!tier_changed.verify(keypair.verifying_key()));

        let mut nonce_changed = token.clone();
        nonce_changed.nonce += 1;
        assert!(!nonce_changed.verify(keypair.verifying_key()));

        let mut window_changed = token.clone();
        window_changed.expires_at = window_changed.expires_at + Duration::seconds(1);
        assert!(!window_changed.verify(keypair.verifying_key()));

        let mut hash_changed = token;
        hash_changed.action_hash = Action::new()
            .with_field("intent", "noop")
            .fingerprint()
            .unwrap();
        assert!(!hash_changed.verify(keypair.verifying_key()));
    }

    #[test]
    fn expiry_is_evaluated_against_the_supplied_clock() {
        let keypair = Keypair::generate();
        let token = issued(&keypair);

        assert!(!token.is_expired(token.expires_at));
        assert!(token.is_expired(token.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn serde_roundtrip_preserves_verifiability() {
        let keypair = Keypair::generate();
        let token = issued(&keypair);

        let encoded = serde_json::to_string(&token).unwrap();
        let decoded: AuthorityToken = serde_json::from_str(&encoded).unwrap();
        assert!(decoded.verify(keypair.verifying_key()));
    }

    proptest! {
        #[test]
        fn replacing_the_nonce_always_invalidates(new_nonce in 2u64..u64::MAX) {
            let keypair = Keypair::generate();
            let mut token = issued(&keypair);
            token.nonce = new_nonce;
            prop_assert!(!token.verify(keypair.verifying_key()));
        }
    }
}
