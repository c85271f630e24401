//! The execution gate: the single chokepoint every action passes through.

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;
use warden_crypto::VerifyingKey;

use crate::action::Action;
use crate::token::AuthorityToken;

/// Outcome of one gate evaluation.
///
/// Rejections are reported outcomes, not errors: the gate must stay
/// callable in tight loops, and a deliberately malformed token produces a
/// clean reject, never a crash. Every rejection carries a distinct
/// human-readable reason so audit logs stay actionable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// The action was admitted and its nonce consumed.
    Committed,
    /// The signature is malformed or does not match the claims.
    InvalidSignature,
    /// The token's nonce was already consumed.
    ReplayDetected,
    /// The validity window has passed.
    TokenExpired,
    /// The action content does not match the fingerprint the token binds.
    ActionMismatch,
}

impl GateOutcome {
    /// Whether the action was committed.
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }

    /// Human-readable reason, distinct per cause.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::Committed => "execution committed",
            Self::InvalidSignature => "invalid signature",
            Self::ReplayDetected => "replay detected",
            Self::TokenExpired => "token expired",
            Self::ActionMismatch => "action mismatch",
        }
    }
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Validates tokens against proposed actions and the shared replay
/// registry.
///
/// The gate itself is stateless and re-entrant; the registry borrow must be
/// obtained under the coordinator's lock so that the replay check and the
/// success-path insertion form one atomic unit and two concurrent
/// submissions of the same nonce can never both commit. Decisive checks
/// (signature, replay) run before the semantic ones (expiry, binding); the
/// later ordering is a fail-fast nicety, not a correctness requirement.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecutionGate;

impl ExecutionGate {
    /// Creates a gate.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the full validation sequence, consuming the nonce on success.
    pub fn execute(
        &self,
        action: &Action,
        token: &AuthorityToken,
        nonce_registry: &mut HashSet<u64>,
        verifying_key: &VerifyingKey,
    ) -> GateOutcome {
        let outcome = Self::validate(action, token, nonce_registry, verifying_key);
        if outcome.is_committed() {
            nonce_registry.insert(token.nonce);
        }
        debug!(
            actor = %token.actor,
            nonce = token.nonce,
            outcome = outcome.reason(),
            "gate decision"
        );
        outcome
    }

    fn validate(
        action: &Action,
        token: &AuthorityToken,
        nonce_registry: &HashSet<u64>,
        verifying_key: &VerifyingKey,
    ) -> GateOutcome {
        if !token.verify(verifying_key) {
            return GateOutcome::InvalidSignature;
        }
        if nonce_registry.contains(&token.nonce) {
            return GateOutcome::ReplayDetected;
        }
        if token.is_expired(Utc::now()) {
            return GateOutcome::TokenExpired;
        }
        match action.fingerprint() {
            Ok(fingerprint) if fingerprint == token.action_hash => GateOutcome::Committed,
            _ => GateOutcome::ActionMismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::AuthorityTier;
    use chrono::Duration;
    use warden_crypto::Keypair;

    fn transfer_action() -> Action {
        Action::new()
            .with_field("intent", "transfer")
            .with_field("amount", 10)
    }

    fn token_for(action: &Action, ttl_secs: i64, nonce: u64, keypair: &Keypair) -> AuthorityToken {
        AuthorityToken::issue(
            "agent-1",
            action,
            AuthorityTier::T2,
            Duration::seconds(ttl_secs),
            nonce,
            keypair,
        )
        .unwrap()
    }

    #[test]
    fn valid_token_commits_and_consumes_nonce() {
        let keypair = Keypair::generate();
        let gate = ExecutionGate::new();
        let action = transfer_action();
        let token = token_for(&action, 300, 1, &keypair);
        let mut registry = HashSet::new();

        let outcome = gate.execute(&action, &token, &mut registry, keypair.verifying_key());
        assert_eq!(outcome, GateOutcome::Committed);
        assert_eq!(outcome.reason(), "execution committed");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_submission_is_a_replay() {
        let keypair = Keypair::generate();
        let gate = ExecutionGate::new();
        let action = transfer_action();
        let token = token_for(&action, 300, 1, &keypair);
        let mut registry = HashSet::new();

        assert!(gate
            .execute(&action, &token, &mut registry, keypair.verifying_key())
            .is_committed());
        let replay = gate.execute(&action, &token, &mut registry, keypair.verifying_key());
        assert_eq!(replay, GateOutcome::ReplayDetected);
        assert_eq!(replay.reason(), "replay detected");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn expired_token_is_rejected_without_touching_the_registry() {
        let keypair = Keypair::generate();
        let gate = ExecutionGate::new();
        let action = transfer_action();
        let token = token_for(&action, -10, 1, &keypair);
        let mut registry = HashSet::new();

        let outcome = gate.execute(&action, &token, &mut registry, keypair.verifying_key());
        assert_eq!(outcome, GateOutcome::TokenExpired);
        assert!(registry.is_empty());
    }

    #[test]
    fn changed_action_payload_is_a_mismatch() {
        let keypair = Keypair::generate();
        let gate = ExecutionGate::new();
        let token = token_for(&transfer_action(), 300, 1, &keypair);
        let tampered = transfer_action().with_field("amount", 9999);
        let mut registry = HashSet::new();

        let outcome = gate.execute(&tampered, &token, &mut registry, keypair.verifying_key());
        assert_eq!(outcome, GateOutcome::ActionMismatch);
        assert!(registry.is_empty());
    }

    #[test]
    fn corrupted_signature_wins_over_every_other_failure() {
        let keypair = Keypair::generate();
        let gate = ExecutionGate::new();
        let action = transfer_action();
        let mut token = token_for(&action, -10, 1, &keypair);
        token.signature = "0".repeat(128);
        let mut registry = HashSet::from([1]);

        let outcome = gate.execute(&action, &token, &mut registry, keypair.verifying_key());
        assert_eq!(outcome, GateOutcome::InvalidSignature);
    }

    #[test]
    fn replay_wins_over_expiry() {
        let keypair = Keypair::generate();
        let gate = ExecutionGate::new();
        let action = transfer_action();
        let token = token_for(&action, -10, 7, &keypair);
        let mut registry = HashSet::from([7]);

        let outcome = gate.execute(&action, &token, &mut registry, keypair.verifying_key());
        assert_eq!(outcome, GateOutcome::ReplayDetected);
        assert_eq!(registry.len(), 1);
    }
}
