//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// License key; absent or unrecognized keys fall back to demo mode.
    pub license_key: Option<String>,
    pub stability: StabilityConfig,
    pub guard: GuardConfig,
    pub prover: ProverConfig,
}

/// Stability feedback and token validity on the direct authorization path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Recovery applied when a gate decision commits.
    pub recover_on_commit: f64,
    /// Degradation applied when a gate decision rejects.
    pub degrade_on_reject: f64,
    /// Token validity window in seconds.
    pub token_ttl_secs: i64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            recover_on_commit: 0.1,
            degrade_on_reject: 0.1,
            token_ttl_secs: 300,
        }
    }
}

/// Continuity guard loop parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Number of heartbeat steps per run.
    pub total_steps: u64,
    /// Progress observation cadence, in steps.
    pub report_every: u64,
    /// Degradation applied when a step observes an anomaly.
    pub anomaly_degrade: f64,
    /// Partial recovery applied immediately after anomaly mitigation.
    pub anomaly_recover: f64,
    /// Small recovery applied on each healthy step.
    pub steady_recover: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            total_steps: 200_000,
            report_every: 20_000,
            anomaly_degrade: 0.03,
            anomaly_recover: 0.05,
            steady_recover: 0.002,
        }
    }
}

/// Resilience prover parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Validity window for trusted synthetic tokens, in seconds.
    pub standard_ttl_secs: i64,
    /// Shorter validity window for adversarial synthetic tokens, in seconds.
    pub adversarial_ttl_secs: i64,
    /// Probability that a byzantine run actually corrupts its signature.
    pub signature_corruption_rate: f64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            standard_ttl_secs: 300,
            adversarial_ttl_secs: 150,
            signature_corruption_rate: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_roundtrip_through_serde() {
        let config = RuntimeConfig::default();
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: RuntimeConfig = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.guard.total_steps, config.guard.total_steps);
        assert_eq!(
            decoded.prover.adversarial_ttl_secs,
            config.prover.adversarial_ttl_secs
        );
    }
}
