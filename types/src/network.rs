//! Business network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BnmsError;

/// Identifies the business network a membership or group belongs to.
///
/// Operators may choose the id when bootstrapping a network; otherwise a
/// random uuid string is used.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkId(String);

impl NetworkId {
    /// Build a network id, rejecting empty or whitespace-only strings.
    pub fn new(raw: impl Into<String>) -> Result<Self, BnmsError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(BnmsError::InvalidNetworkId("network id must not be blank".into()));
        }
        Ok(Self(s))
    }

    /// A fresh random network id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
