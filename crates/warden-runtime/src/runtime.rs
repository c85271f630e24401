//! The runtime coordinator: trust root and serialization point.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::Duration;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use warden_crypto::{sign_canonical, Keypair, VerifyingKey};
use warden_kernel::{
    classify, Action, AuthorityTier, AuthorityToken, ExecutionGate, GateOutcome, Receipt,
    ReceiptChain, Reconciler, RiskClass, StabilitySnapshot, StabilityTracker,
};

use crate::config::{GuardConfig, RuntimeConfig};
use crate::error::RuntimeError;
use crate::license::License;

/// Mutable coordinator state, guarded by a single mutex.
struct RuntimeState {
    nonce_counter: u64,
    nonce_registry: HashSet<u64>,
    stability: StabilityTracker,
    simulations_used: u64,
}

/// The trust root of a governed runtime instance.
///
/// Owns the signing key pair for its entire lifetime and serializes nonce
/// issuance, replay-registry mutation, and stability feedback behind one
/// lock. Signing, verification, and digesting are pure and run outside the
/// lock, so concurrent callers only contend on the state they actually
/// share. Receipt-chain appends are internally atomic and need no
/// coordination here.
pub struct WardenRuntime {
    instance_id: Uuid,
    config: RuntimeConfig,
    keypair: Keypair,
    gate: ExecutionGate,
    reconciler: Reconciler,
    state: Mutex<RuntimeState>,
    receipts: ReceiptChain,
    license: License,
}

impl WardenRuntime {
    /// Creates a runtime with default configuration (demo license).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a runtime from explicit configuration, generating a fresh
    /// Ed25519 key pair for the instance.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        let license = License::parse(config.license_key.as_deref());
        let keypair = Keypair::generate();
        let instance_id = Uuid::new_v4();
        info!(
            instance = %instance_id,
            licensed = license.valid,
            public_key = %keypair.public_key_hex(),
            "warden runtime initialized"
        );
        Self {
            instance_id,
            config,
            keypair,
            gate: ExecutionGate::new(),
            reconciler: Reconciler::new(),
            state: Mutex::new(RuntimeState {
                nonce_counter: 0,
                nonce_registry: HashSet::new(),
                stability: StabilityTracker::new(),
                simulations_used: 0,
            }),
            receipts: ReceiptChain::new(),
            license,
        }
    }

    /// This instance's identifier.
    #[must_use]
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The entitlement state this instance started with.
    #[must_use]
    pub fn license(&self) -> &License {
        &self.license
    }

    /// The verifying half of the instance key pair.
    #[must_use]
    pub fn public_key(&self) -> &VerifyingKey {
        self.keypair.verifying_key()
    }

    /// Raw public-key bytes, hex-encoded, for external verifiers.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        self.keypair.public_key_hex()
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, RuntimeState>, RuntimeError> {
        self.state.lock().map_err(|_| RuntimeError::LockPoisoned)
    }

    /// Issues the next nonce: strictly increasing, never reused for the
    /// runtime's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn next_nonce(&self) -> Result<u64, RuntimeError> {
        let mut state = self.lock_state()?;
        state.nonce_counter += 1;
        Ok(state.nonce_counter)
    }

    /// Issues a signed token for `action`, deriving the tier from the
    /// declared risk class and the current health posterior.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning or canonical serialization.
    pub fn issue_token(
        &self,
        actor: impl Into<String>,
        action: &Action,
        risk: RiskClass,
    ) -> Result<AuthorityToken, RuntimeError> {
        let (nonce, posterior) = {
            let mut state = self.lock_state()?;
            state.nonce_counter += 1;
            (state.nonce_counter, state.stability.posterior())
        };
        let tier = classify(risk, posterior);
        let ttl = Duration::seconds(self.config.stability.token_ttl_secs);
        Ok(AuthorityToken::issue(
            actor,
            action,
            tier,
            ttl,
            nonce,
            &self.keypair,
        )?)
    }

    /// Issues a signed token with an explicit tier and validity window.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning or canonical serialization.
    pub fn issue_token_with_ttl(
        &self,
        actor: impl Into<String>,
        action: &Action,
        tier: AuthorityTier,
        ttl: Duration,
    ) -> Result<AuthorityToken, RuntimeError> {
        let nonce = self.next_nonce()?;
        Ok(AuthorityToken::issue(
            actor,
            action,
            tier,
            ttl,
            nonce,
            &self.keypair,
        )?)
    }

    /// Runs the execution gate over `action` and `token`.
    ///
    /// The replay check and the success-path nonce insertion execute as one
    /// atomic unit under the coordinator lock, so two concurrent
    /// submissions of the same nonce can never both commit. The decision is
    /// appended to the receipt chain before returning.
    ///
    /// # Errors
    ///
    /// Gate rejections are returned as [`GateOutcome`] values; an `Err`
    /// means lock poisoning or a receipt-chain failure.
    pub fn evaluate(
        &self,
        action: &Action,
        token: &AuthorityToken,
    ) -> Result<GateOutcome, RuntimeError> {
        let outcome = {
            let mut state = self.lock_state()?;
            self.gate.execute(
                action,
                token,
                &mut state.nonce_registry,
                self.keypair.verifying_key(),
            )
        };
        self.receipts.append(json!({
            "event": "gate.decision",
            "actor": token.actor,
            "nonce": token.nonce,
            "tier": token.tier,
            "committed": outcome.is_committed(),
            "reason": outcome.reason(),
        }))?;
        Ok(outcome)
    }

    /// End-to-end authorization: issue a token, run the gate, and feed the
    /// outcome back into the stability tracker.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning, canonical serialization, or a
    /// receipt-chain failure; rejections are reported in the outcome.
    pub fn process_action(
        &self,
        actor: &str,
        action: &Action,
        risk: RiskClass,
    ) -> Result<(AuthorityToken, GateOutcome), RuntimeError> {
        let token = self.issue_token(actor, action, risk)?;
        let outcome = self.evaluate(action, &token)?;
        {
            let mut state = self.lock_state()?;
            if outcome.is_committed() {
                state.stability.recover(self.config.stability.recover_on_commit);
            } else {
                state.stability.degrade(self.config.stability.degrade_on_reject);
            }
        }
        Ok((token, outcome))
    }

    /// Records an unhealthy observation.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn degrade(&self, amount: f64) -> Result<(), RuntimeError> {
        self.lock_state()?.stability.degrade(amount);
        Ok(())
    }

    /// Records a healthy observation.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn recover(&self, amount: f64) -> Result<(), RuntimeError> {
        self.lock_state()?.stability.recover(amount);
        Ok(())
    }

    /// Whether the stability index currently reads healthy.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn is_stable(&self) -> Result<bool, RuntimeError> {
        Ok(self.lock_state()?.stability.evaluate())
    }

    /// The current Bayesian health posterior.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn posterior(&self) -> Result<f64, RuntimeError> {
        Ok(self.lock_state()?.stability.posterior())
    }

    /// Point-in-time stability view.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn stability(&self) -> Result<StabilitySnapshot, RuntimeError> {
        Ok(self.lock_state()?.stability.snapshot())
    }

    /// One supervisory heartbeat: under a single lock acquisition, combine
    /// the stability check with the caller-observed integrity result and
    /// apply detection-and-mitigation feedback: degrade then partially
    /// recover on an anomaly, small steady recovery otherwise.
    ///
    /// Returns whether the step was healthy.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn continuity_tick(
        &self,
        integrity_ok: bool,
        policy: &GuardConfig,
    ) -> Result<bool, RuntimeError> {
        let mut state = self.lock_state()?;
        let healthy = state.stability.evaluate() && integrity_ok;
        if healthy {
            state.stability.recover(policy.steady_recover);
        } else {
            state.stability.degrade(policy.anomaly_degrade);
            state.stability.recover(policy.anomaly_recover);
        }
        Ok(healthy)
    }

    /// Baseline integrity verification over the runtime's own chain.
    #[must_use]
    pub fn verify_integrity(&self) -> bool {
        self.reconciler.reconcile(&self.receipts)
    }

    /// Deep integrity audit: recomputes every stored receipt hash.
    ///
    /// # Errors
    ///
    /// Propagates the first integrity violation found.
    pub fn audit_integrity(&self) -> Result<(), RuntimeError> {
        Ok(self.reconciler.audit(&self.receipts)?)
    }

    /// The runtime's receipt chain.
    #[must_use]
    pub fn receipts(&self) -> &ReceiptChain {
        &self.receipts
    }

    /// Ordered receipt sequence for external audit.
    #[must_use]
    pub fn export_receipts(&self) -> Vec<Receipt> {
        self.receipts.export()
    }

    /// Number of nonces consumed so far.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LockPoisoned`] if the coordinator lock was
    /// poisoned.
    pub fn consumed_nonces(&self) -> Result<usize, RuntimeError> {
        Ok(self.lock_state()?.nonce_registry.len())
    }

    /// Signs a canonical payload with the instance key, hex-encoded. Used
    /// for artifacts that must be verifiable against the exported public
    /// key, such as resilience certificates.
    ///
    /// # Errors
    ///
    /// Fails only on canonical serialization.
    pub fn sign_payload<T: Serialize>(&self, value: &T) -> Result<String, RuntimeError> {
        Ok(sign_canonical(&self.keypair, value)?)
    }

    /// Reserves simulation quota for a proof run.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::CapacityExceeded`] when the licensed ceiling
    /// would be passed; the runtime itself stays fully operational.
    pub fn reserve_simulations(&self, requested: u64) -> Result<(), RuntimeError> {
        let mut state = self.lock_state()?;
        let remaining = self
            .license
            .max_simulations
            .saturating_sub(state.simulations_used);
        if requested > remaining {
            return Err(RuntimeError::CapacityExceeded {
                requested,
                remaining,
            });
        }
        state.simulations_used += requested;
        Ok(())
    }
}

impl Default for WardenRuntime {
    fn default() -> Self {
        Self::new()
    }
}
