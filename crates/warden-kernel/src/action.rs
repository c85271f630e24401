//! Opaque action payloads identified by canonical content digests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warden_crypto::{content_digest, Digest, DigestError};

/// An opaque mapping of named fields describing an actor's intent.
///
/// Keys are stored sorted, so two actions built in different orders with
/// the same content share one fingerprint. An action has no independent
/// lifecycle: it is consumed synchronously by token issuance and gate
/// validation, and is immutable once fingerprinted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action {
    fields: Map<String, Value>,
}

impl Action {
    /// Creates an empty action.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named field, replacing any previous value under the same key.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Wraps an existing JSON object as an action.
    #[must_use]
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Reads a field value.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The canonical digest of the action content: the fingerprint a token
    /// binds to.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Serialization`] for non-serializable content.
    pub fn fingerprint(&self) -> Result<Digest, DigestError> {
        content_digest(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_construction_order() {
        let forward = Action::new()
            .with_field("intent", "transfer")
            .with_field("amount", 10);
        let reversed = Action::new()
            .with_field("amount", 10)
            .with_field("intent", "transfer");

        assert_eq!(
            forward.fingerprint().unwrap(),
            reversed.fingerprint().unwrap()
        );
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let base = Action::new().with_field("amount", 10);
        let changed = Action::new().with_field("amount", 11);

        assert_ne!(base.fingerprint().unwrap(), changed.fingerprint().unwrap());
    }

    #[test]
    fn replacing_a_field_replaces_its_value() {
        let action = Action::new()
            .with_field("amount", 10)
            .with_field("amount", 20);

        assert_eq!(action.field("amount"), Some(&serde_json::json!(20)));
    }
}
