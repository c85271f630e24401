//! Resilience prover: adversarial synthetic load over the execution gate.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use warden_crypto::{verify_canonical, Digest, VerifyingKey};
use warden_kernel::{classify, Action, ReceiptChain, RiskClass};

use crate::error::RuntimeError;
use crate::runtime::WardenRuntime;

fn corrupted_signature() -> String {
    "0".repeat(128)
}

/// Pluggable source of adversarial behavior.
///
/// Keeping the randomness behind this seam lets the gate logic be
/// exercised deterministically; the default model draws from a seeded RNG.
pub trait AdversaryModel: Send {
    /// Declared risk class for the next synthetic action.
    fn sample_risk(&mut self) -> RiskClass;
    /// Whether the next run applies adversarial stability pressure.
    fn is_adversarial(&mut self, fraction: f64) -> bool;
    /// Whether the next run is byzantine (eligible for signature
    /// corruption).
    fn is_byzantine(&mut self, fraction: f64) -> bool;
    /// Whether a byzantine run actually corrupts its signature.
    fn corrupts_signature(&mut self, rate: f64) -> bool;
    /// Stability pressure applied before an adversarial run.
    fn pressure_amount(&mut self) -> f64;
    /// Recovery applied after a committed run.
    fn recovery_amount(&mut self) -> f64;
    /// Degradation applied after a rejected run.
    fn penalty_amount(&mut self) -> f64;
}

/// Default adversary backed by a seeded RNG.
pub struct RandomAdversary {
    rng: StdRng,
}

impl RandomAdversary {
    /// Creates a reproducible adversary from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAdversary {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl AdversaryModel for RandomAdversary {
    fn sample_risk(&mut self) -> RiskClass {
        match self.rng.gen_range(0..4) {
            0 => RiskClass::Low,
            1 => RiskClass::Medium,
            2 => RiskClass::High,
            _ => RiskClass::Critical,
        }
    }

    fn is_adversarial(&mut self, fraction: f64) -> bool {
        self.rng.gen_bool(fraction.clamp(0.0, 1.0))
    }

    fn is_byzantine(&mut self, fraction: f64) -> bool {
        self.rng.gen_bool(fraction.clamp(0.0, 1.0))
    }

    fn corrupts_signature(&mut self, rate: f64) -> bool {
        self.rng.gen_bool(rate.clamp(0.0, 1.0))
    }

    fn pressure_amount(&mut self) -> f64 {
        self.rng.gen_range(0.05..0.25)
    }

    fn recovery_amount(&mut self) -> f64 {
        self.rng.gen_range(0.02..0.15)
    }

    fn penalty_amount(&mut self) -> f64 {
        self.rng.gen_range(0.05..0.2)
    }
}

/// A signed summary of one proof run, verifiable against the runtime
/// public key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResilienceCertificate {
    pub certificate_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub simulations: u64,
    pub success_rate: f64,
    pub byzantine_fraction: f64,
    pub adversarial_fraction: f64,
    pub posterior: f64,
    pub stability_index: f64,
    pub integrity: bool,
    /// Head hash of the prover's own receipt chain at issuance.
    pub proof_hash: Digest,
    pub signature: String,
}

/// The signed view of a certificate: every field except the signature.
#[derive(Serialize)]
struct CertificateClaims<'a> {
    certificate_id: &'a Uuid,
    issued_at: &'a DateTime<Utc>,
    simulations: u64,
    success_rate: f64,
    byzantine_fraction: f64,
    adversarial_fraction: f64,
    posterior: f64,
    stability_index: f64,
    integrity: bool,
    proof_hash: &'a Digest,
}

impl ResilienceCertificate {
    fn claims(&self) -> CertificateClaims<'_> {
        CertificateClaims {
            certificate_id: &self.certificate_id,
            issued_at: &self.issued_at,
            simulations: self.simulations,
            success_rate: self.success_rate,
            byzantine_fraction: self.byzantine_fraction,
            adversarial_fraction: self.adversarial_fraction,
            posterior: self.posterior,
            stability_index: self.stability_index,
            integrity: self.integrity,
            proof_hash: &self.proof_hash,
        }
    }

    /// Verifies the certificate signature over its canonical fields.
    ///
    /// Returns `false` on any malformation or mismatch; never errors.
    #[must_use]
    pub fn verify(&self, verifying_key: &VerifyingKey) -> bool {
        verify_canonical(verifying_key, &self.claims(), &self.signature)
    }
}

/// Drives the execution gate with synthetic adversarial and byzantine
/// tokens and certifies the observed success rate.
///
/// The prover keeps its own receipt chain, one entry per simulation plus
/// the run summary, separate from the runtime's decision ledger.
pub struct ResilienceProver<M: AdversaryModel = RandomAdversary> {
    runtime: Arc<WardenRuntime>,
    model: M,
    proof_receipts: ReceiptChain,
}

impl ResilienceProver<RandomAdversary> {
    /// Creates a prover with the default randomized adversary.
    #[must_use]
    pub fn new(runtime: Arc<WardenRuntime>) -> Self {
        Self::with_model(runtime, RandomAdversary::default())
    }
}

impl<M: AdversaryModel> ResilienceProver<M> {
    /// Creates a prover with an injected adversary model.
    #[must_use]
    pub fn with_model(runtime: Arc<WardenRuntime>, model: M) -> Self {
        Self {
            runtime,
            model,
            proof_receipts: ReceiptChain::new(),
        }
    }

    /// The prover's own receipt chain.
    #[must_use]
    pub fn proof_receipts(&self) -> &ReceiptChain {
        &self.proof_receipts
    }

    /// Runs the full proof suite and returns a signed certificate.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::CapacityExceeded`] when the license quota
    /// would be passed (reported, never a crash), or propagates lock and
    /// chain failures.
    pub async fn run_proof_suite(
        &mut self,
        num_simulations: u64,
        byzantine_fraction: f64,
        adversarial_fraction: f64,
    ) -> Result<ResilienceCertificate, RuntimeError> {
        self.runtime.reserve_simulations(num_simulations)?;

        let mut successes: u64 = 0;
        for sequence in 0..num_simulations {
            let adversarial = self.model.is_adversarial(adversarial_fraction);
            let byzantine = self.model.is_byzantine(byzantine_fraction);
            if self.simulate_intent(sequence, adversarial, byzantine)? {
                successes += 1;
            }
            tokio::task::yield_now().await;
        }

        let success_rate = if num_simulations == 0 {
            0.0
        } else {
            successes as f64 / num_simulations as f64
        };
        let stability = self.runtime.stability()?;
        let integrity = self.runtime.verify_integrity();

        let summary = self.proof_receipts.append(json!({
            "event": "proof.summary",
            "simulations": num_simulations,
            "success_rate": success_rate,
            "byzantine_fraction": byzantine_fraction,
            "adversarial_fraction": adversarial_fraction,
            "posterior": stability.posterior,
            "stability_index": stability.stability_index,
            "integrity": integrity,
        }))?;

        let mut certificate = ResilienceCertificate {
            certificate_id: Uuid::new_v4(),
            issued_at: Utc::now(),
            simulations: num_simulations,
            success_rate,
            byzantine_fraction,
            adversarial_fraction,
            posterior: stability.posterior,
            stability_index: stability.stability_index,
            integrity,
            proof_hash: summary.hash,
            signature: String::new(),
        };
        let signature = self.runtime.sign_payload(&certificate.claims())?;
        certificate.signature = signature;

        self.runtime.receipts().append(json!({
            "event": "proof.certificate",
            "certificate": certificate,
        }))?;
        info!(
            certificate = %certificate.certificate_id,
            simulations = num_simulations,
            success_rate,
            "resilience certificate issued"
        );
        Ok(certificate)
    }

    fn simulate_intent(
        &mut self,
        sequence: u64,
        adversarial: bool,
        byzantine: bool,
    ) -> Result<bool, RuntimeError> {
        let prover_config = self.runtime.config().prover.clone();
        let actor = if adversarial { "adversary" } else { "trusted-agent" };
        let action = Action::new()
            .with_field("intent", "synthetic_probe")
            .with_field("sequence", sequence);

        if adversarial {
            let pressure = self.model.pressure_amount();
            self.runtime.degrade(pressure)?;
        }

        let risk = self.model.sample_risk();
        let tier = classify(risk, self.runtime.posterior()?);
        let ttl_secs = if adversarial {
            prover_config.adversarial_ttl_secs
        } else {
            prover_config.standard_ttl_secs
        };
        let mut token =
            self.runtime
                .issue_token_with_ttl(actor, &action, tier, Duration::seconds(ttl_secs))?;

        if byzantine
            && self
                .model
                .corrupts_signature(prover_config.signature_corruption_rate)
        {
            token.signature = corrupted_signature();
        }

        let outcome = self.runtime.evaluate(&action, &token)?;
        let committed = outcome.is_committed();
        if committed {
            let recovery = self.model.recovery_amount();
            self.runtime.recover(recovery)?;
        } else {
            let penalty = self.model.penalty_amount();
            self.runtime.degrade(penalty)?;
        }

        self.proof_receipts.append(json!({
            "event": "proof.simulation",
            "sequence": sequence,
            "adversarial": adversarial,
            "byzantine": byzantine,
            "committed": committed,
            "reason": outcome.reason(),
        }))?;
        Ok(committed)
    }
}
