//! Authority tiers derived from declared risk and Bayesian confidence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confidence below which a recognized risk class escalates one tier.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Authority/strictness level attached to a token.
///
/// The tier is a signal consumed by policy layers to decide how much
/// scrutiny an action deserves; classification itself enforces nothing;
/// enforcement is the execution gate's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuthorityTier {
    T0,
    T1,
    T2,
    T3,
    T4,
}

impl AuthorityTier {
    /// One level stricter, capped at `T4`.
    #[must_use]
    pub fn escalate(self) -> Self {
        match self {
            Self::T0 => Self::T1,
            Self::T1 => Self::T2,
            Self::T2 => Self::T3,
            Self::T3 | Self::T4 => Self::T4,
        }
    }
}

impl std::fmt::Display for AuthorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::T0 => "T0",
            Self::T1 => "T1",
            Self::T2 => "T2",
            Self::T3 => "T3",
            Self::T4 => "T4",
        };
        f.write_str(label)
    }
}

/// Declared risk classification of a proposed action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskClass {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskClass {
    /// The tier this class maps to before any confidence escalation.
    #[must_use]
    pub fn base_tier(self) -> AuthorityTier {
        match self {
            Self::Low => AuthorityTier::T1,
            Self::Medium => AuthorityTier::T2,
            Self::High => AuthorityTier::T3,
            Self::Critical => AuthorityTier::T4,
        }
    }
}

/// A risk label that matches no known class.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown risk class: {0}")]
pub struct UnknownRiskClass(pub String);

impl FromStr for RiskClass {
    type Err = UnknownRiskClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(UnknownRiskClass(s.to_string())),
        }
    }
}

/// Maps a declared risk class and the current health posterior to an
/// authority tier, escalating one level when confidence is low.
#[must_use]
pub fn classify(risk: RiskClass, confidence: f64) -> AuthorityTier {
    let base = risk.base_tier();
    if confidence < LOW_CONFIDENCE_THRESHOLD {
        base.escalate()
    } else {
        base
    }
}

/// Classifies a free-form risk label.
///
/// Unrecognized labels map to [`AuthorityTier::T0`], which is never
/// escalated regardless of confidence.
#[must_use]
pub fn classify_label(label: &str, confidence: f64) -> AuthorityTier {
    match label.parse::<RiskClass>() {
        Ok(risk) => classify(risk, confidence),
        Err(_) => AuthorityTier::T0,
    }
}
