//! The append-only, hash-linked receipt ledger.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warden_crypto::{content_digest, Digest};

use crate::error::ChainError;

/// One immutable audit-log entry.
///
/// `previous_hash` of entry *i* equals the stored `hash` of entry *i − 1*;
/// `None` marks the genesis entry. Any mutation of a historical entry
/// invalidates verification of every subsequent link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub timestamp: DateTime<Utc>,
    pub record: Value,
    pub previous_hash: Option<Digest>,
    pub hash: Digest,
}

/// The hashed view of a receipt: every field except the hash itself.
#[derive(Serialize)]
struct ReceiptContent<'a> {
    timestamp: &'a DateTime<Utc>,
    record: &'a Value,
    previous_hash: Option<&'a Digest>,
}

/// An append-only sequence of hash-linked receipts.
///
/// Append is the only mutator and runs under a single write guard: reading
/// the head hash and pushing the new entry are one atomic step, so
/// concurrent appenders can never fork the chain. The sequence is never
/// truncated or edited for the runtime's lifetime.
#[derive(Debug, Default)]
pub struct ReceiptChain {
    entries: RwLock<Vec<Receipt>>,
}

impl ReceiptChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record`, linking it to the current head.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Serialization`] if the record cannot be
    /// canonically hashed, or [`ChainError::LockPoisoned`] if a previous
    /// writer panicked.
    pub fn append(&self, record: Value) -> Result<Receipt, ChainError> {
        let mut entries = self.entries.write().map_err(|_| ChainError::LockPoisoned)?;
        let previous_hash = entries.last().map(|receipt| receipt.hash.clone());
        let timestamp = Utc::now();
        let hash = content_digest(&ReceiptContent {
            timestamp: &timestamp,
            record: &record,
            previous_hash: previous_hash.as_ref(),
        })?;
        let receipt = Receipt {
            timestamp,
            record,
            previous_hash,
            hash,
        };
        entries.push(receipt.clone());
        Ok(receipt)
    }

    /// Link scan: every `previous_hash` equals its predecessor's stored
    /// `hash`. Stored hashes are not recomputed from payload; see
    /// [`Self::audit`] for the deeper check.
    #[must_use]
    pub fn verify(&self) -> bool {
        let Ok(entries) = self.entries.read() else {
            return false;
        };
        entries
            .windows(2)
            .all(|pair| pair[1].previous_hash.as_ref() == Some(&pair[0].hash))
    }

    /// Deep verification: recomputes every hash from its payload and checks
    /// each link, reporting the first break.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::IntegrityViolation`] naming the first entry
    /// whose link or stored hash fails.
    pub fn audit(&self) -> Result<(), ChainError> {
        let entries = self.entries.read().map_err(|_| ChainError::LockPoisoned)?;
        let mut expected_prev: Option<&Digest> = None;
        for (index, receipt) in entries.iter().enumerate() {
            if receipt.previous_hash.as_ref() != expected_prev {
                return Err(ChainError::IntegrityViolation {
                    index,
                    reason: "previous hash link mismatch".to_string(),
                });
            }
            let recomputed = content_digest(&ReceiptContent {
                timestamp: &receipt.timestamp,
                record: &receipt.record,
                previous_hash: receipt.previous_hash.as_ref(),
            })?;
            if recomputed != receipt.hash {
                return Err(ChainError::IntegrityViolation {
                    index,
                    reason: "receipt hash mismatch".to_string(),
                });
            }
            expected_prev = Some(&receipt.hash);
        }
        Ok(())
    }

    /// Number of receipts in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the chain holds no receipts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current head receipt.
    #[must_use]
    pub fn head(&self) -> Option<Receipt> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.last().cloned())
    }

    /// Ordered copy of the whole chain for external audit.
    #[must_use]
    pub fn export(&self) -> Vec<Receipt> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}
