//! License collaborator: a validity flag and a simulation quota.
//!
//! The quota is a capacity limiter, not a behavioral gate: demo and
//! licensed runtimes behave identically below the ceiling.

use tracing::warn;

/// Simulation quota for unlicensed (demo) runtimes.
pub const DEMO_SIMULATION_QUOTA: u64 = 100;
/// Simulation quota for licensed runtimes.
pub const LICENSED_SIMULATION_QUOTA: u64 = 999_999;
/// Prefix carried by issued license keys.
const LICENSE_KEY_PREFIX: &str = "WARDEN-";

/// Entitlement state for one runtime instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct License {
    pub valid: bool,
    pub licensee: String,
    pub max_simulations: u64,
}

impl License {
    /// Parses an optional license key, falling back to demo mode.
    #[must_use]
    pub fn parse(key: Option<&str>) -> Self {
        if let Some(rest) = key.and_then(|key| key.strip_prefix(LICENSE_KEY_PREFIX)) {
            if !rest.is_empty() {
                let licensee = rest.split('-').next().unwrap_or(rest).to_string();
                return Self {
                    valid: true,
                    licensee,
                    max_simulations: LICENSED_SIMULATION_QUOTA,
                };
            }
        }
        warn!(
            quota = DEMO_SIMULATION_QUOTA,
            "no valid license key; running in demo mode"
        );
        Self {
            valid: false,
            licensee: "DEMO".to_string(),
            max_simulations: DEMO_SIMULATION_QUOTA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_demo_mode() {
        let license = License::parse(None);
        assert!(!license.valid);
        assert_eq!(license.licensee, "DEMO");
        assert_eq!(license.max_simulations, DEMO_SIMULATION_QUOTA);
    }

    #[test]
    fn unrecognized_key_is_demo_mode() {
        assert!(!License::parse(Some("TRIAL-123")).valid);
        assert!(!License::parse(Some("WARDEN-")).valid);
    }

    #[test]
    fn prefixed_key_is_licensed_with_full_quota() {
        let license = License::parse(Some("WARDEN-acme-2026"));
        assert!(license.valid);
        assert_eq!(license.licensee, "acme");
        assert_eq!(license.max_simulations, LICENSED_SIMULATION_QUOTA);
    }
}
