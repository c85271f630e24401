//! Receipt-chain reconciliation.
//!
//! Thin on purpose: this is the seam where an external auditor or a
//! cross-instance process would attach additional consistency checks, such
//! as cross-referencing against an external ledger.

use crate::error::ChainError;
use crate::receipt::ReceiptChain;

/// On-demand integrity verification over a receipt chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Baseline reconciliation: the chain's link scan.
    #[must_use]
    pub fn reconcile(&self, chain: &ReceiptChain) -> bool {
        chain.verify()
    }

    /// Deep reconciliation: recompute every stored hash from payload.
    ///
    /// # Errors
    ///
    /// Propagates the first [`ChainError::IntegrityViolation`] found.
    pub fn audit(&self, chain: &ReceiptChain) -> Result<(), ChainError> {
        chain.audit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reconcile_tracks_chain_verification() {
        let reconciler = Reconciler::new();
        let chain = ReceiptChain::new();
        chain.append(json!({"event": "boot"})).unwrap();

        assert!(reconciler.reconcile(&chain));
        reconciler.audit(&chain).unwrap();
    }
}
